//! Delegate key registration

use super::BridgeService;
use crate::domain::{DelegateKeysSignMsg, OrchestratorBinding};
use crate::error::{BridgeError, BridgeResult};
use crate::events::BridgeEvent;
use crate::ports::inbound::MsgDelegateKeys;
use crate::ports::outbound::{AccountSequenceSource, TokenLedger, VotingPowerSource};
use crate::state::BridgeState;
use shared_crypto::verify_eth_signature;
use tracing::info;

impl<V, T, A> BridgeService<V, T, A>
where
    V: VotingPowerSource,
    T: TokenLedger,
    A: AccountSequenceSource,
{
    pub(super) fn handle_delegate_keys(
        &self,
        state: &mut BridgeState,
        msg: MsgDelegateKeys,
    ) -> BridgeResult<()> {
        if self.staking.power(&msg.validator).is_none() {
            return Err(BridgeError::NotBonded(msg.validator));
        }

        let sequence = self.accounts.sequence(&msg.validator.account());
        let challenge = DelegateKeysSignMsg::new(msg.validator, sequence).challenge_hash()?;
        verify_eth_signature(&challenge, &msg.eth_signature, msg.ethereum_address)?;

        let binding = OrchestratorBinding {
            validator: msg.validator,
            orchestrator: msg.orchestrator,
            ethereum_address: msg.ethereum_address,
        };
        state.keys.check_conflicts(&binding)?;

        let previous = state.keys.bind(binding);
        info!(
            validator = %msg.validator,
            orchestrator = %msg.orchestrator,
            ethereum_address = %msg.ethereum_address,
            rebind = previous.is_some(),
            "[gravity] delegate keys set"
        );
        state.emit(BridgeEvent::KeysDelegated {
            validator: msg.validator,
            orchestrator: msg.orchestrator,
            ethereum_address: msg.ethereum_address,
        });
        Ok(())
    }
}
