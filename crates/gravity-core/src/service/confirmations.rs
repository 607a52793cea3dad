//! Checkpoint confirmations and height votes

use super::BridgeService;
use crate::domain::{Confirmation, Duty, SubjectRef};
use crate::error::{BridgeError, BridgeResult};
use crate::events::BridgeEvent;
use crate::metrics;
use crate::ports::inbound::{MsgEthereumHeightVote, MsgSubmitEthereumTxConfirmation};
use crate::ports::outbound::{AccountSequenceSource, TokenLedger, VotingPowerSource};
use crate::state::BridgeState;
use shared_crypto::verify_eth_signature;
use shared_types::Hash;
use tracing::debug;

/// Liveness duty a confirmation discharges.
fn duty_for(subject: &SubjectRef) -> Duty {
    match *subject {
        SubjectRef::SignerSet { nonce } => Duty::SignerSet { nonce },
        SubjectRef::Batch {
            token_contract,
            nonce,
        } => Duty::Batch {
            token_contract,
            nonce,
        },
    }
}

/// Checkpoint of a stored subject.
pub(super) fn subject_checkpoint(state: &BridgeState, subject: &SubjectRef) -> Option<Hash> {
    let gravity_id = &state.params.gravity_id;
    match subject {
        SubjectRef::SignerSet { nonce } => state
            .signer_sets
            .get(*nonce)
            .map(|set| set.checkpoint(gravity_id)),
        SubjectRef::Batch {
            token_contract,
            nonce,
        } => state
            .batches
            .get(token_contract, *nonce)
            .map(|batch| batch.checkpoint(gravity_id)),
    }
}

impl<V, T, A> BridgeService<V, T, A>
where
    V: VotingPowerSource,
    T: TokenLedger,
    A: AccountSequenceSource,
{
    pub(super) fn handle_confirmation(
        &self,
        state: &mut BridgeState,
        msg: MsgSubmitEthereumTxConfirmation,
    ) -> BridgeResult<()> {
        let validator = state
            .keys
            .validator_for_orchestrator(&msg.signer)
            .ok_or(BridgeError::NotAnOrchestrator(msg.signer))?;
        let ethereum_signer = state
            .keys
            .ethereum_address(&validator)
            .ok_or(BridgeError::NotAnOrchestrator(msg.signer))?;

        let checkpoint = subject_checkpoint(state, &msg.subject)
            .ok_or(BridgeError::UnknownSubject(msg.subject))?;
        verify_eth_signature(&checkpoint, &msg.signature, ethereum_signer)?;

        let replaced = state.confirmations.upsert(Confirmation {
            subject: msg.subject,
            ethereum_signer,
            signature: msg.signature,
        });
        state.liveness.contribute(&duty_for(&msg.subject), validator);

        debug!(
            subject = %msg.subject,
            validator = %validator,
            replaced = replaced.is_some(),
            "[gravity] confirmation stored"
        );
        state.emit(BridgeEvent::ConfirmationStored {
            subject: msg.subject,
            ethereum_signer,
        });
        metrics::record_confirmation_stored(msg.subject.kind());
        Ok(())
    }

    pub(super) fn handle_height_vote(
        &self,
        state: &mut BridgeState,
        msg: MsgEthereumHeightVote,
    ) -> BridgeResult<()> {
        let validator = state
            .keys
            .validator_for_orchestrator(&msg.signer)
            .ok_or(BridgeError::NotAnOrchestrator(msg.signer))?;
        state.heights.record(validator, msg.ethereum_height);
        debug!(
            validator = %validator,
            ethereum_height = msg.ethereum_height,
            "[gravity] ethereum height vote"
        );
        Ok(())
    }
}
