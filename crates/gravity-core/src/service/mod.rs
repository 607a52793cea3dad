//! Bridge Service - core business logic
//!
//! # Execution model
//! - Every message handler takes the state write lock once and holds it
//!   until it returns, so one message applies fully before the next.
//! - Handlers validate everything before the first write; a failing
//!   message leaves state untouched.
//! - `end_block` runs the scheduled work: height consensus, batch
//!   timeouts, automatic batching, signer-set updates, liveness.

mod attestation;
mod confirmations;
mod delegate_keys;
mod end_block;
mod outgoing;
mod queries;


use crate::domain::{AttestationKey, BatchTx, NonceKey, Params};
use crate::error::BridgeResult;
use crate::events::BridgeEvent;
use crate::genesis::{BatchNonce, ContractCallNonce, GenesisState, ValidatorEventNonce};
use crate::ports::inbound::{
    BridgeApi, EventVoteResult, MsgCancelSendToEthereum, MsgDelegateKeys, MsgEthereumHeightVote,
    MsgRequestBatchTx, MsgSendToEthereum, MsgSubmitEthereumEvent, MsgSubmitEthereumTxConfirmation,
};
use crate::ports::outbound::{AccountSequenceSource, TokenLedger, VotingPowerSource};
use crate::state::BridgeState;
use parking_lot::RwLock;
use shared_types::ValidatorAddress;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

/// Collaborators and initial parameters for [`BridgeService`]
pub struct BridgeDependencies<V, T, A> {
    pub staking: Arc<V>,
    pub ledger: Arc<T>,
    pub accounts: Arc<A>,
    pub params: Params,
}

/// Bridge Service
pub struct BridgeService<V, T, A>
where
    V: VotingPowerSource,
    T: TokenLedger,
    A: AccountSequenceSource,
{
    staking: Arc<V>,
    ledger: Arc<T>,
    accounts: Arc<A>,
    state: RwLock<BridgeState>,
}

impl<V, T, A> BridgeService<V, T, A>
where
    V: VotingPowerSource,
    T: TokenLedger,
    A: AccountSequenceSource,
{
    pub fn new(deps: BridgeDependencies<V, T, A>) -> BridgeResult<Self> {
        deps.params.validate()?;
        Ok(Self {
            staking: deps.staking,
            ledger: deps.ledger,
            accounts: deps.accounts,
            state: RwLock::new(BridgeState::new(deps.params)),
        })
    }

    /// Replace all state with `genesis`.
    pub fn init_genesis(&self, genesis: GenesisState) -> BridgeResult<()> {
        genesis.validate()?;

        let mut state = BridgeState::new(genesis.params);
        state
            .attestations
            .set_last_observed_nonce(genesis.last_observed_event_nonce);
        for attestation in genesis.attestations {
            let key = AttestationKey {
                nonce: attestation.event.nonce(),
                content_hash: attestation.event.content_hash()?,
            };
            state.attestations.restore(key, attestation);
        }
        for entry in genesis.last_event_nonces {
            state
                .attestations
                .set_last_vote_nonce(entry.validator, entry.event_nonce);
        }
        for mapping in genesis.denom_mappings {
            state.denoms.insert(mapping.denom, mapping.contract);
        }
        for binding in genesis.delegate_keys {
            state.keys.bind(binding);
        }

        state.nonces.bump_to(NonceKey::Transfer, genesis.last_transfer_id);
        for transfer in genesis.unbatched_transfers {
            state.nonces.bump_to(NonceKey::Transfer, transfer.id);
            state.pool.insert(transfer);
        }
        for entry in genesis.batch_nonces {
            state
                .nonces
                .bump_to(NonceKey::Batch(entry.token_contract), entry.last_nonce);
        }
        for batch in genesis.batches {
            state
                .nonces
                .bump_to(NonceKey::Batch(batch.token_contract), batch.batch_nonce);
            for transfer in &batch.transactions {
                state.nonces.bump_to(NonceKey::Transfer, transfer.id);
            }
            state.batches.insert(batch);
        }

        state
            .nonces
            .bump_to(NonceKey::SignerSet, genesis.last_signer_set_nonce);
        for set in genesis.signer_sets {
            state.nonces.bump_to(NonceKey::SignerSet, set.nonce);
            state.signer_sets.insert(set);
        }
        if let Some(set) = genesis.last_observed_signer_set {
            state.nonces.bump_to(NonceKey::SignerSet, set.nonce);
            state.signer_sets.set_last_observed(set);
        }
        for confirmation in genesis.confirmations {
            state.confirmations.upsert(confirmation);
        }

        state.heights.set_observed(genesis.latest_ethereum_height);
        for call in genesis.contract_calls {
            state
                .contract_calls
                .insert(call.invalidation_scope, call.invalidation_nonce);
        }

        info!(
            last_observed_event_nonce = genesis.last_observed_event_nonce,
            bindings = state.keys.len(),
            pending = state.pool.len(),
            batches = state.batches.len(),
            signer_sets = state.signer_sets.len(),
            "[gravity] genesis loaded"
        );
        *self.state.write() = state;
        Ok(())
    }

    pub fn export_genesis(&self) -> GenesisState {
        let state = self.state.read();
        GenesisState {
            params: state.params.clone(),
            last_observed_event_nonce: state.attestations.last_observed_nonce(),
            last_transfer_id: state.nonces.last(NonceKey::Transfer),
            last_signer_set_nonce: state.nonces.last(NonceKey::SignerSet),
            batch_nonces: state
                .nonces
                .batch_nonces()
                .into_iter()
                .map(|(token_contract, last_nonce)| BatchNonce {
                    token_contract,
                    last_nonce,
                })
                .collect(),
            denom_mappings: state.denoms.mappings(),
            delegate_keys: state.keys.iter().cloned().collect(),
            unbatched_transfers: state.pool.iter().cloned().collect(),
            batches: state.batches.iter().cloned().collect(),
            signer_sets: state.signer_sets.iter().cloned().collect(),
            last_observed_signer_set: state.signer_sets.last_observed().cloned(),
            confirmations: state.confirmations.iter().cloned().collect(),
            attestations: state.attestations.iter().map(|(_, a)| a.clone()).collect(),
            last_event_nonces: state
                .attestations
                .last_vote_nonces()
                .map(|(validator, nonce)| ValidatorEventNonce {
                    validator: *validator,
                    event_nonce: *nonce,
                })
                .collect(),
            latest_ethereum_height: state.heights.observed(),
            contract_calls: state
                .contract_calls
                .iter()
                .map(|(scope, nonce)| ContractCallNonce {
                    invalidation_scope: scope.clone(),
                    invalidation_nonce: *nonce,
                })
                .collect(),
        }
    }

    /// Governance parameter change.
    pub fn set_params(&self, params: Params) -> BridgeResult<()> {
        params.validate()?;
        self.state.write().params = params;
        Ok(())
    }

    /// Set the height of the block about to execute.
    pub fn begin_block(&self, height: u64) {
        self.state.write().block_height = height;
    }

    /// Take the buffered module events.
    pub fn drain_events(&self) -> Vec<BridgeEvent> {
        std::mem::take(&mut self.state.write().events)
    }

    /// Current voting power, 0 for unbonded validators.
    fn power_of(&self, validator: &ValidatorAddress) -> u64 {
        self.staking.power(validator).unwrap_or(0)
    }

    fn bonded_set(&self) -> BTreeSet<ValidatorAddress> {
        self.staking
            .bonded_validators()
            .into_iter()
            .map(|(v, _)| v)
            .collect()
    }
}

impl<V, T, A> BridgeApi for BridgeService<V, T, A>
where
    V: VotingPowerSource,
    T: TokenLedger,
    A: AccountSequenceSource,
{
    fn delegate_keys(&self, msg: MsgDelegateKeys) -> BridgeResult<()> {
        let mut state = self.state.write();
        self.handle_delegate_keys(&mut state, msg)
    }

    fn submit_ethereum_event(&self, msg: MsgSubmitEthereumEvent) -> BridgeResult<EventVoteResult> {
        let mut state = self.state.write();
        self.handle_event_vote(&mut state, msg)
    }

    fn submit_ethereum_tx_confirmation(
        &self,
        msg: MsgSubmitEthereumTxConfirmation,
    ) -> BridgeResult<()> {
        let mut state = self.state.write();
        self.handle_confirmation(&mut state, msg)
    }

    fn send_to_ethereum(&self, msg: MsgSendToEthereum) -> BridgeResult<u64> {
        let mut state = self.state.write();
        self.handle_send_to_ethereum(&mut state, msg)
    }

    fn request_batch_tx(&self, msg: MsgRequestBatchTx) -> BridgeResult<BatchTx> {
        let mut state = self.state.write();
        self.handle_request_batch(&mut state, msg)
    }

    fn cancel_send_to_ethereum(&self, msg: MsgCancelSendToEthereum) -> BridgeResult<()> {
        let mut state = self.state.write();
        self.handle_cancel(&mut state, msg)
    }

    fn ethereum_height_vote(&self, msg: MsgEthereumHeightVote) -> BridgeResult<()> {
        let mut state = self.state.write();
        self.handle_height_vote(&mut state, msg)
    }
}
