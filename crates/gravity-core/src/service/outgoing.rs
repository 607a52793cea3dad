//! Outgoing transfers and batches

use super::BridgeService;
use crate::domain::{BatchTx, Duty, NonceKey, SendToEthereum, SubjectRef};
use crate::error::{BridgeError, BridgeResult};
use crate::events::BridgeEvent;
use crate::metrics;
use crate::ports::inbound::{MsgCancelSendToEthereum, MsgRequestBatchTx, MsgSendToEthereum};
use crate::ports::outbound::{AccountSequenceSource, TokenLedger, VotingPowerSource};
use crate::state::BridgeState;
use shared_types::EthAddress;
use std::collections::BTreeSet;
use tracing::{info, warn};

impl<V, T, A> BridgeService<V, T, A>
where
    V: VotingPowerSource,
    T: TokenLedger,
    A: AccountSequenceSource,
{
    pub(super) fn handle_send_to_ethereum(
        &self,
        state: &mut BridgeState,
        msg: MsgSendToEthereum,
    ) -> BridgeResult<u64> {
        if !state.params.bridge_active {
            return Err(BridgeError::BridgeInactive);
        }
        if msg.amount.denom != msg.bridge_fee.denom {
            return Err(BridgeError::DenomMismatch {
                amount: msg.amount.to_string(),
                fee: msg.bridge_fee.to_string(),
            });
        }
        if msg.amount.is_zero() {
            return Err(BridgeError::InvalidAmount("amount must be positive".into()));
        }
        let origin = state
            .denoms
            .resolve_denom(&msg.amount.denom)
            .ok_or_else(|| BridgeError::UnknownAsset(msg.amount.denom.clone()))?;
        let escrow = msg
            .amount
            .checked_add(&msg.bridge_fee)
            .ok_or_else(|| BridgeError::InvalidAmount("amount + fee overflows".into()))?;

        self.ledger.send_to_module(&msg.sender, &escrow)?;

        let id = state.nonces.next(NonceKey::Transfer);
        let contract = origin.contract();
        state.pool.insert(SendToEthereum {
            id,
            sender: msg.sender,
            ethereum_recipient: msg.ethereum_recipient,
            token_contract: contract,
            amount: msg.amount,
            fee: msg.bridge_fee,
        });
        info!(
            id,
            sender = %msg.sender,
            contract = %contract,
            "[gravity] transfer queued"
        );
        state.emit(BridgeEvent::TransferQueued {
            id,
            sender: msg.sender,
            token_contract: contract,
        });
        Ok(id)
    }

    pub(super) fn handle_request_batch(
        &self,
        state: &mut BridgeState,
        msg: MsgRequestBatchTx,
    ) -> BridgeResult<BatchTx> {
        if state.keys.validator_for_orchestrator(&msg.signer).is_none() {
            return Err(BridgeError::NotAnOrchestrator(msg.signer));
        }
        let origin = state
            .denoms
            .resolve_denom(&msg.denom)
            .ok_or_else(|| BridgeError::UnknownAsset(msg.denom.clone()))?;
        self.build_batch(state, origin.contract())
    }

    pub(super) fn handle_cancel(
        &self,
        state: &mut BridgeState,
        msg: MsgCancelSendToEthereum,
    ) -> BridgeResult<()> {
        if let Some(transfer) = state.pool.get(msg.id) {
            if transfer.sender != msg.sender {
                return Err(BridgeError::NotOwner {
                    id: msg.id,
                    sender: msg.sender,
                });
            }
            let refund = transfer
                .escrowed()
                .ok_or_else(|| BridgeError::InvalidAmount("escrow overflows".into()))?;
            self.ledger.send_from_module(&msg.sender, &refund)?;
            state.pool.remove(msg.id);

            info!(id = msg.id, sender = %msg.sender, "[gravity] transfer cancelled");
            state.emit(BridgeEvent::TransferCancelled {
                id: msg.id,
                sender: msg.sender,
            });
            return Ok(());
        }

        match state.batches.find_transfer(msg.id) {
            Some((_, transfer)) if transfer.sender != msg.sender => Err(BridgeError::NotOwner {
                id: msg.id,
                sender: msg.sender,
            }),
            Some((batch, _)) => Err(BridgeError::AlreadyBatched {
                id: msg.id,
                batch_nonce: batch.batch_nonce,
            }),
            None => Err(BridgeError::TransferNotFound(msg.id)),
        }
    }

    /// Select the best pending transfers for `contract` into a new batch.
    pub(super) fn build_batch(
        &self,
        state: &mut BridgeState,
        contract: EthAddress,
    ) -> BridgeResult<BatchTx> {
        let ids = state
            .pool
            .select_for_batch(&contract, state.params.batch_max_element);
        if ids.is_empty() {
            return Err(BridgeError::NothingToBatch(contract));
        }

        let transactions: Vec<SendToEthereum> = ids
            .into_iter()
            .filter_map(|id| state.pool.remove(id))
            .collect();
        let batch_nonce = state.nonces.next(NonceKey::Batch(contract));
        let timeout = state
            .heights
            .observed()
            .ethereum_height
            .saturating_add(state.params.batch_timeout_blocks());

        let batch = BatchTx {
            batch_nonce,
            timeout,
            transactions,
            token_contract: contract,
            height: state.block_height,
        };
        let checkpoint = batch.checkpoint(&state.params.gravity_id);

        let required: BTreeSet<_> = self.bonded_set();
        state.liveness.register(
            Duty::Batch {
                token_contract: contract,
                nonce: batch_nonce,
            },
            state.block_height,
            required,
            BTreeSet::new(),
        );
        state.batches.insert(batch.clone());

        info!(
            contract = %contract,
            batch_nonce,
            transfers = batch.transactions.len(),
            timeout,
            checkpoint = %hex::encode(checkpoint),
            "[gravity] batch created"
        );
        state.emit(BridgeEvent::BatchCreated {
            token_contract: contract,
            batch_nonce,
            transfers: batch.transactions.len(),
        });
        metrics::record_batch_created();
        Ok(batch)
    }

    /// Dissolve a batch, returning its transfers to the pool.
    pub(super) fn cancel_batch(
        &self,
        state: &mut BridgeState,
        contract: EthAddress,
        nonce: u64,
    ) -> bool {
        let Some(batch) = state.batches.remove(&contract, nonce) else {
            return false;
        };
        let count = batch.transactions.len();
        for transfer in batch.transactions {
            state.pool.insert(transfer);
        }
        state.confirmations.remove_subject(&SubjectRef::Batch {
            token_contract: contract,
            nonce,
        });
        warn!(
            contract = %contract,
            batch_nonce = nonce,
            returned = count,
            "[gravity] batch cancelled"
        );
        state.emit(BridgeEvent::BatchCancelled {
            token_contract: contract,
            batch_nonce: nonce,
        });
        true
    }
}
