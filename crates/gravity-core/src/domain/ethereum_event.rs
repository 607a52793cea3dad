//! Claimed external-chain events
//!
//! Events are reported by orchestrators, never generated here. Every
//! event carries the external contract's global event nonce, shared by
//! all kinds.

use crate::domain::signer_set::EthereumSigner;
use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use shared_crypto::keccak256;
use shared_types::{AccountAddress, EthAddress, Hash, U256};

/// Deposit locked on the external chain for a recipient here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDeposited {
    pub event_nonce: u64,
    pub token_contract: EthAddress,
    pub amount: U256,
    pub ethereum_sender: EthAddress,
    pub cosmos_receiver: AccountAddress,
    pub ethereum_height: u64,
}

/// Outgoing batch executed by the external contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchExecuted {
    pub event_nonce: u64,
    pub token_contract: EthAddress,
    pub batch_nonce: u64,
    pub ethereum_height: u64,
}

/// Arbitrary contract call executed; the nonce invalidates replays.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCallExecuted {
    pub event_nonce: u64,
    pub invalidation_scope: Vec<u8>,
    pub invalidation_nonce: u64,
    pub ethereum_height: u64,
}

/// Representation contract deployed for a chain-native denom.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetContractDeployed {
    pub event_nonce: u64,
    pub cosmos_denom: String,
    pub token_contract: EthAddress,
    pub erc20_name: String,
    pub erc20_symbol: String,
    pub erc20_decimals: u8,
    pub ethereum_height: u64,
}

/// Signer set accepted by the external contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerSetExecuted {
    pub event_nonce: u64,
    pub signer_set_nonce: u64,
    pub members: Vec<EthereumSigner>,
    pub ethereum_height: u64,
}

/// Closed set of claimable events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EthereumEvent {
    AssetDeposited(AssetDeposited),
    BatchExecuted(BatchExecuted),
    ContractCallExecuted(ContractCallExecuted),
    AssetContractDeployed(AssetContractDeployed),
    SignerSetExecuted(SignerSetExecuted),
}

impl EthereumEvent {
    pub fn nonce(&self) -> u64 {
        match self {
            Self::AssetDeposited(e) => e.event_nonce,
            Self::BatchExecuted(e) => e.event_nonce,
            Self::ContractCallExecuted(e) => e.event_nonce,
            Self::AssetContractDeployed(e) => e.event_nonce,
            Self::SignerSetExecuted(e) => e.event_nonce,
        }
    }

    pub fn ethereum_height(&self) -> u64 {
        match self {
            Self::AssetDeposited(e) => e.ethereum_height,
            Self::BatchExecuted(e) => e.ethereum_height,
            Self::ContractCallExecuted(e) => e.ethereum_height,
            Self::AssetContractDeployed(e) => e.ethereum_height,
            Self::SignerSetExecuted(e) => e.ethereum_height,
        }
    }

    /// Stable discriminant, used as the envelope kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AssetDeposited(_) => AssetDeposited::KIND,
            Self::BatchExecuted(_) => BatchExecuted::KIND,
            Self::ContractCallExecuted(_) => ContractCallExecuted::KIND,
            Self::AssetContractDeployed(_) => AssetContractDeployed::KIND,
            Self::SignerSetExecuted(_) => SignerSetExecuted::KIND,
        }
    }

    /// Keccak-256 over the bincode image. Two reports of the same nonce
    /// with any differing field hash differently.
    pub fn content_hash(&self) -> BridgeResult<Hash> {
        let bytes = bincode::serialize(self)?;
        Ok(keccak256(&bytes))
    }

    /// Stateless checks.
    pub fn validate_basic(&self) -> BridgeResult<()> {
        if self.nonce() == 0 {
            return Err(BridgeError::InvalidEvent("event nonce must be positive".into()));
        }
        match self {
            Self::AssetDeposited(e) => {
                if e.amount.is_zero() {
                    return Err(BridgeError::InvalidEvent("zero deposit".into()));
                }
            }
            Self::AssetContractDeployed(e) => {
                if e.cosmos_denom.is_empty() {
                    return Err(BridgeError::InvalidEvent("empty denom".into()));
                }
            }
            Self::SignerSetExecuted(e) => {
                if e.members.is_empty() {
                    return Err(BridgeError::InvalidEvent("empty signer set".into()));
                }
            }
            Self::BatchExecuted(_) | Self::ContractCallExecuted(_) => {}
        }
        Ok(())
    }
}

impl AssetDeposited {
    pub const KIND: &'static str = "gravity.v1.SendToCosmosEvent";
}

impl BatchExecuted {
    pub const KIND: &'static str = "gravity.v1.BatchExecutedEvent";
}

impl ContractCallExecuted {
    pub const KIND: &'static str = "gravity.v1.ContractCallExecutedEvent";
}

impl AssetContractDeployed {
    pub const KIND: &'static str = "gravity.v1.ERC20DeployedEvent";
}

impl SignerSetExecuted {
    pub const KIND: &'static str = "gravity.v1.SignerSetTxExecutedEvent";
}
