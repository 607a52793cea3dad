//! Driving ports: the message catalogue and query surface

use crate::domain::{
    Attestation, BatchTx, Confirmation, EthereumEvent, LatestEthereumHeight, OrchestratorBinding,
    Page, Pagination, Params, SendToEthereum, SignerSetTx, SubjectRef,
};
use crate::error::BridgeResult;
use serde::{Deserialize, Serialize};
use shared_crypto::EthSignature;
use shared_types::{AccountAddress, Coin, EthAddress, ValidatorAddress};

/// Bind orchestrator and external keys to a validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgDelegateKeys {
    pub validator: ValidatorAddress,
    pub orchestrator: AccountAddress,
    pub ethereum_address: EthAddress,
    /// Personal-sign of the delegate-keys challenge by `ethereum_address`
    pub eth_signature: EthSignature,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSubmitEthereumEvent {
    pub signer: AccountAddress,
    pub event: EthereumEvent,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSubmitEthereumTxConfirmation {
    pub signer: AccountAddress,
    pub subject: SubjectRef,
    pub signature: EthSignature,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgSendToEthereum {
    pub sender: AccountAddress,
    pub ethereum_recipient: EthAddress,
    pub amount: Coin,
    pub bridge_fee: Coin,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgRequestBatchTx {
    pub signer: AccountAddress,
    pub denom: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgCancelSendToEthereum {
    pub sender: AccountAddress,
    pub id: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgEthereumHeightVote {
    pub signer: AccountAddress,
    pub ethereum_height: u64,
}

/// Every inbound action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeMsg {
    DelegateKeys(MsgDelegateKeys),
    SubmitEthereumEvent(MsgSubmitEthereumEvent),
    SubmitEthereumTxConfirmation(MsgSubmitEthereumTxConfirmation),
    SendToEthereum(MsgSendToEthereum),
    RequestBatchTx(MsgRequestBatchTx),
    CancelSendToEthereum(MsgCancelSendToEthereum),
    EthereumHeightVote(MsgEthereumHeightVote),
}

/// Outcome of a successful event vote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventVoteResult {
    pub nonce: u64,
    /// Voting power behind this attestation after the vote
    pub tally: u64,
    /// Nonces observed by this vote, including cascaded ones
    pub observed: Vec<u64>,
}

/// Per-message response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MsgResponse {
    Empty,
    EventVote(EventVoteResult),
    TransferQueued { id: u64 },
    BatchCreated { token_contract: EthAddress, batch_nonce: u64 },
}

/// What one `end_block` did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EndBlockReport {
    /// Event nonces that reached the threshold after a power change
    pub observed_events: Vec<u64>,
    pub observed_ethereum_height: Option<u64>,
    pub timed_out_batches: Vec<(EthAddress, u64)>,
    pub created_batches: Vec<(EthAddress, u64)>,
    pub signer_set_created: Option<u64>,
    pub slashed: Vec<ValidatorAddress>,
}

/// Inbound API of the bridge core.
pub trait BridgeApi {
    fn delegate_keys(&self, msg: MsgDelegateKeys) -> BridgeResult<()>;

    fn submit_ethereum_event(&self, msg: MsgSubmitEthereumEvent) -> BridgeResult<EventVoteResult>;

    fn submit_ethereum_tx_confirmation(
        &self,
        msg: MsgSubmitEthereumTxConfirmation,
    ) -> BridgeResult<()>;

    /// Returns the new transfer id.
    fn send_to_ethereum(&self, msg: MsgSendToEthereum) -> BridgeResult<u64>;

    fn request_batch_tx(&self, msg: MsgRequestBatchTx) -> BridgeResult<BatchTx>;

    fn cancel_send_to_ethereum(&self, msg: MsgCancelSendToEthereum) -> BridgeResult<()>;

    fn ethereum_height_vote(&self, msg: MsgEthereumHeightVote) -> BridgeResult<()>;

    /// Dispatch any message to its handler.
    fn deliver(&self, msg: BridgeMsg) -> BridgeResult<MsgResponse> {
        match msg {
            BridgeMsg::DelegateKeys(m) => self.delegate_keys(m).map(|_| MsgResponse::Empty),
            BridgeMsg::SubmitEthereumEvent(m) => {
                self.submit_ethereum_event(m).map(MsgResponse::EventVote)
            }
            BridgeMsg::SubmitEthereumTxConfirmation(m) => {
                self.submit_ethereum_tx_confirmation(m).map(|_| MsgResponse::Empty)
            }
            BridgeMsg::SendToEthereum(m) => self
                .send_to_ethereum(m)
                .map(|id| MsgResponse::TransferQueued { id }),
            BridgeMsg::RequestBatchTx(m) => {
                self.request_batch_tx(m)
                    .map(|b| MsgResponse::BatchCreated {
                        token_contract: b.token_contract,
                        batch_nonce: b.batch_nonce,
                    })
            }
            BridgeMsg::CancelSendToEthereum(m) => {
                self.cancel_send_to_ethereum(m).map(|_| MsgResponse::Empty)
            }
            BridgeMsg::EthereumHeightVote(m) => {
                self.ethereum_height_vote(m).map(|_| MsgResponse::Empty)
            }
        }
    }
}

/// Read-only query surface.
pub trait BridgeQuery {
    fn params(&self) -> Params;

    fn denom_to_contract(&self, denom: &str) -> BridgeResult<EthAddress>;

    /// Denom for a contract and whether it is chain-native.
    fn contract_to_denom(&self, contract: &EthAddress) -> (String, bool);

    fn latest_signer_set_tx(&self) -> Option<SignerSetTx>;

    fn signer_set_tx(&self, nonce: u64) -> Option<SignerSetTx>;

    fn last_observed_signer_set_tx(&self) -> Option<SignerSetTx>;

    fn last_batch_tx(&self, contract: &EthAddress) -> Option<BatchTx>;

    fn batch_tx(&self, contract: &EthAddress, nonce: u64) -> Option<BatchTx>;

    fn batch_txs(&self, contract: &EthAddress) -> Vec<BatchTx>;

    fn confirmations(&self, subject: &SubjectRef) -> Vec<Confirmation>;

    fn unbatched_transfers(
        &self,
        sender: &AccountAddress,
        page: Pagination,
    ) -> Page<SendToEthereum>;

    fn last_observed_event_nonce(&self) -> u64;

    fn last_event_nonce_by_validator(&self, validator: &ValidatorAddress) -> u64;

    fn attestations_at(&self, nonce: u64) -> Vec<Attestation>;

    fn delegate_keys_by_validator(
        &self,
        validator: &ValidatorAddress,
    ) -> Option<OrchestratorBinding>;

    fn validator_by_orchestrator(&self, orchestrator: &AccountAddress) -> Option<ValidatorAddress>;

    fn validator_by_ethereum_address(&self, address: &EthAddress) -> Option<ValidatorAddress>;

    fn latest_ethereum_height(&self) -> LatestEthereumHeight;
}
