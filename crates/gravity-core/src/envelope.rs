//! Self-describing envelope for events and confirmations
//!
//! `{"kind": "...", "payload": {...}}` with payload object keys sorted,
//! so decode then encode reproduces the input bytes.

use crate::domain::{
    AssetContractDeployed, AssetDeposited, BatchExecuted, Confirmation, ContractCallExecuted,
    EthereumEvent, SignerSetExecuted,
};
use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub kind: String,
    pub payload: Value,
}

/// Types that travel inside an [`Envelope`].
pub trait Packable: Sized {
    fn kind(&self) -> &'static str;

    fn to_payload(&self) -> BridgeResult<Value>;

    fn from_envelope(envelope: Envelope) -> BridgeResult<Self>;
}

pub fn pack<T: Packable>(item: &T) -> BridgeResult<Vec<u8>> {
    let envelope = Envelope {
        kind: item.kind().to_string(),
        payload: item.to_payload()?,
    };
    Ok(serde_json::to_vec(&envelope)?)
}

pub fn unpack<T: Packable>(bytes: &[u8]) -> BridgeResult<T> {
    let envelope: Envelope = serde_json::from_slice(bytes)?;
    T::from_envelope(envelope)
}

fn unknown_kind(kind: &str) -> BridgeError {
    BridgeError::Codec(format!("unknown envelope kind {}", kind))
}

impl Packable for EthereumEvent {
    fn kind(&self) -> &'static str {
        EthereumEvent::kind(self)
    }

    fn to_payload(&self) -> BridgeResult<Value> {
        let value = match self {
            Self::AssetDeposited(e) => serde_json::to_value(e)?,
            Self::BatchExecuted(e) => serde_json::to_value(e)?,
            Self::ContractCallExecuted(e) => serde_json::to_value(e)?,
            Self::AssetContractDeployed(e) => serde_json::to_value(e)?,
            Self::SignerSetExecuted(e) => serde_json::to_value(e)?,
        };
        Ok(value)
    }

    fn from_envelope(envelope: Envelope) -> BridgeResult<Self> {
        let Envelope { kind, payload } = envelope;
        let event = match kind.as_str() {
            AssetDeposited::KIND => Self::AssetDeposited(serde_json::from_value(payload)?),
            BatchExecuted::KIND => Self::BatchExecuted(serde_json::from_value(payload)?),
            ContractCallExecuted::KIND => {
                Self::ContractCallExecuted(serde_json::from_value(payload)?)
            }
            AssetContractDeployed::KIND => {
                Self::AssetContractDeployed(serde_json::from_value(payload)?)
            }
            SignerSetExecuted::KIND => Self::SignerSetExecuted(serde_json::from_value(payload)?),
            other => return Err(unknown_kind(other)),
        };
        Ok(event)
    }
}

impl Packable for Confirmation {
    fn kind(&self) -> &'static str {
        self.subject.kind()
    }

    fn to_payload(&self) -> BridgeResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn from_envelope(envelope: Envelope) -> BridgeResult<Self> {
        let confirmation: Confirmation = serde_json::from_value(envelope.payload)?;
        if confirmation.subject.kind() != envelope.kind {
            return Err(unknown_kind(&envelope.kind));
        }
        Ok(confirmation)
    }
}
