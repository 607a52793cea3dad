//! Module events emitted for the host to index

use crate::domain::{LivenessCategory, SubjectRef};
use serde::{Deserialize, Serialize};
use shared_types::{AccountAddress, EthAddress, Hash, ValidatorAddress};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeEvent {
    KeysDelegated {
        validator: ValidatorAddress,
        orchestrator: AccountAddress,
        ethereum_address: EthAddress,
    },
    EventObserved {
        nonce: u64,
        kind: String,
        content_hash: Hash,
    },
    /// Observed but the effect could not be applied
    EventEffectFailed {
        nonce: u64,
        reason: String,
    },
    TransferQueued {
        id: u64,
        sender: AccountAddress,
        token_contract: EthAddress,
    },
    TransferCancelled {
        id: u64,
        sender: AccountAddress,
    },
    BatchCreated {
        token_contract: EthAddress,
        batch_nonce: u64,
        transfers: usize,
    },
    BatchExecuted {
        token_contract: EthAddress,
        batch_nonce: u64,
    },
    /// Dissolved by timeout or by a later batch executing
    BatchCancelled {
        token_contract: EthAddress,
        batch_nonce: u64,
    },
    SignerSetCreated {
        nonce: u64,
        members: usize,
    },
    ConfirmationStored {
        subject: SubjectRef,
        ethereum_signer: EthAddress,
    },
    EthereumHeightObserved {
        ethereum_height: u64,
    },
    ValidatorSlashed {
        validator: ValidatorAddress,
        category: LivenessCategory,
        fraction_bps: u32,
    },
}
