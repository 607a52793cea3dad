//! Event voting and event effects

use super::BridgeService;
use crate::domain::{
    parse_voucher_denom, AssetContractDeployed, AssetDeposited, AttestationKey, BatchExecuted,
    ContractCallExecuted, Duty, EthereumEvent, SignerSetExecuted, SignerSetTx, SubjectRef,
};
use crate::error::{BridgeError, BridgeResult};
use crate::events::BridgeEvent;
use crate::metrics;
use crate::ports::inbound::{EventVoteResult, MsgSubmitEthereumEvent};
use crate::ports::outbound::{AccountSequenceSource, TokenLedger, VotingPowerSource};
use crate::state::BridgeState;
use shared_types::{Coin, U256};
use tracing::{debug, info, warn};

impl<V, T, A> BridgeService<V, T, A>
where
    V: VotingPowerSource,
    T: TokenLedger,
    A: AccountSequenceSource,
{
    pub(super) fn handle_event_vote(
        &self,
        state: &mut BridgeState,
        msg: MsgSubmitEthereumEvent,
    ) -> BridgeResult<EventVoteResult> {
        let result = self.record_event_vote(state, msg);
        if let Err(err) = &result {
            debug!(error = %err, "[gravity] event vote rejected");
            metrics::record_vote_rejected(err.label());
        }
        result
    }

    fn record_event_vote(
        &self,
        state: &mut BridgeState,
        msg: MsgSubmitEthereumEvent,
    ) -> BridgeResult<EventVoteResult> {
        let validator = state
            .keys
            .validator_for_orchestrator(&msg.signer)
            .ok_or(BridgeError::NotAnOrchestrator(msg.signer))?;
        if self.staking.power(&validator).is_none() {
            return Err(BridgeError::NotBonded(validator));
        }

        msg.event.validate_basic()?;
        let key = AttestationKey {
            nonce: msg.event.nonce(),
            content_hash: msg.event.content_hash()?,
        };
        state.attestations.check_vote(&validator, &key)?;

        let height = state.block_height;
        let attestation = state
            .attestations
            .record_vote(validator, key, msg.event, height);
        let tally = attestation.tally(|v| self.power_of(v));
        let late = attestation.observed;
        if late {
            state
                .liveness
                .contribute(&Duty::Event { nonce: key.nonce }, validator);
        }
        debug!(
            validator = %validator,
            nonce = key.nonce,
            tally,
            late,
            "[gravity] event vote recorded"
        );

        let observed = self.observe_ready_events(state);
        Ok(EventVoteResult {
            nonce: key.nonce,
            tally,
            observed,
        })
    }

    /// Observe the next nonce while it has a supermajority, cascading.
    pub(super) fn observe_ready_events(&self, state: &mut BridgeState) -> Vec<u64> {
        let total = self.staking.total_power();
        let mut observed = Vec::new();

        while let Some(key) = state
            .attestations
            .next_observable(|v| self.power_of(v), total)
        {
            let height = state.block_height;
            let Some(attestation) = state.attestations.mark_observed(&key, height).cloned() else {
                break;
            };
            let event = attestation.event;
            info!(
                nonce = key.nonce,
                kind = event.kind(),
                votes = attestation.votes.len(),
                "[gravity] event observed"
            );
            state.emit(BridgeEvent::EventObserved {
                nonce: key.nonce,
                kind: event.kind().to_string(),
                content_hash: key.content_hash,
            });
            let required = self.bonded_set();
            state
                .liveness
                .register(Duty::Event { nonce: key.nonce }, height, required, attestation.votes);

            if let Err(err) = self.apply_event(state, &event) {
                warn!(
                    nonce = key.nonce,
                    error = %err,
                    "[gravity] event observed but effect failed"
                );
                state.emit(BridgeEvent::EventEffectFailed {
                    nonce: key.nonce,
                    reason: err.to_string(),
                });
            }
            metrics::record_event_observed(key.nonce);
            observed.push(key.nonce);
        }
        observed
    }

    fn apply_event(&self, state: &mut BridgeState, event: &EthereumEvent) -> BridgeResult<()> {
        match event {
            EthereumEvent::AssetDeposited(e) => self.apply_deposit(state, e),
            EthereumEvent::BatchExecuted(e) => self.apply_batch_executed(state, e),
            EthereumEvent::ContractCallExecuted(e) => {
                apply_contract_call(state, e);
                Ok(())
            }
            EthereumEvent::AssetContractDeployed(e) => self.apply_contract_deployed(state, e),
            EthereumEvent::SignerSetExecuted(e) => {
                apply_signer_set_executed(state, e);
                Ok(())
            }
        }
    }

    fn apply_deposit(&self, state: &mut BridgeState, event: &AssetDeposited) -> BridgeResult<()> {
        let origin = state.denoms.resolve_contract(&event.token_contract);
        let coin = Coin::new(origin.denom(), event.amount);
        if !origin.is_native() {
            self.ledger.mint(&coin)?;
        }
        self.ledger.send_from_module(&event.cosmos_receiver, &coin)?;
        info!(
            receiver = %event.cosmos_receiver,
            coin = %coin,
            "[gravity] deposit credited"
        );
        Ok(())
    }

    fn apply_batch_executed(
        &self,
        state: &mut BridgeState,
        event: &BatchExecuted,
    ) -> BridgeResult<()> {
        let contract = event.token_contract;
        let batch = state
            .batches
            .remove(&contract, event.batch_nonce)
            .ok_or_else(|| {
                BridgeError::InvalidEvent(format!(
                    "no batch {} for contract {}",
                    event.batch_nonce, contract
                ))
            })?;

        // a later batch executing makes earlier ones unexecutable
        for nonce in state.batches.earlier_than(&contract, event.batch_nonce) {
            self.cancel_batch(state, contract, nonce);
        }

        state.confirmations.remove_subject(&SubjectRef::Batch {
            token_contract: contract,
            nonce: event.batch_nonce,
        });
        state.emit(BridgeEvent::BatchExecuted {
            token_contract: contract,
            batch_nonce: event.batch_nonce,
        });
        info!(
            contract = %contract,
            batch_nonce = event.batch_nonce,
            transfers = batch.transactions.len(),
            "[gravity] batch executed"
        );

        let origin = state.denoms.resolve_contract(&contract);
        if origin.is_native() {
            return Ok(());
        }
        let total = batch
            .transactions
            .iter()
            .try_fold(U256::zero(), |acc, t| {
                acc.checked_add(t.amount.amount)?.checked_add(t.fee.amount)
            })
            .ok_or_else(|| BridgeError::InvalidAmount("batch total overflows".into()))?;
        self.ledger.burn(&Coin::new(origin.denom(), total))?;
        Ok(())
    }

    fn apply_contract_deployed(
        &self,
        state: &mut BridgeState,
        event: &AssetContractDeployed,
    ) -> BridgeResult<()> {
        if let Some(contract) = state.denoms.contract_for_native(&event.cosmos_denom) {
            return Err(BridgeError::DenomAlreadyMapped {
                denom: event.cosmos_denom.clone(),
                contract,
            });
        }
        if state.denoms.is_mapped(&event.cosmos_denom, &event.token_contract)
            || parse_voucher_denom(&event.cosmos_denom).is_some()
        {
            return Err(BridgeError::DenomAlreadyMapped {
                denom: event.cosmos_denom.clone(),
                contract: event.token_contract,
            });
        }
        if !self.ledger.has_denom(&event.cosmos_denom) {
            return Err(BridgeError::UnknownDenomMetadata(event.cosmos_denom.clone()));
        }

        state
            .denoms
            .insert(event.cosmos_denom.clone(), event.token_contract);
        info!(
            denom = %event.cosmos_denom,
            contract = %event.token_contract,
            "[gravity] asset contract mapped"
        );
        Ok(())
    }
}

fn apply_contract_call(state: &mut BridgeState, event: &ContractCallExecuted) {
    let last = state
        .contract_calls
        .entry(event.invalidation_scope.clone())
        .or_insert(0);
    *last = (*last).max(event.invalidation_nonce);
    debug!(
        invalidation_nonce = event.invalidation_nonce,
        "[gravity] contract call executed"
    );
}

fn apply_signer_set_executed(state: &mut BridgeState, event: &SignerSetExecuted) {
    let set = state
        .signer_sets
        .get(event.signer_set_nonce)
        .cloned()
        .unwrap_or_else(|| {
            SignerSetTx::new(event.signer_set_nonce, state.block_height, event.members.clone())
        });
    for nonce in state.signer_sets.observe(set) {
        state
            .confirmations
            .remove_subject(&SubjectRef::SignerSet { nonce });
    }
    info!(
        signer_set_nonce = event.signer_set_nonce,
        "[gravity] signer set executed"
    );
}
