//! Error types for the bridge core
//!
//! Every inbound message either applies completely or fails with one of
//! these before any state is written.

use crate::domain::SubjectRef;
use crate::ports::outbound::LedgerError;
use shared_crypto::CryptoError;
use shared_types::{AccountAddress, EthAddress, ValidatorAddress};
use thiserror::Error;

/// Bridge core errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// Submitter has no orchestrator binding
    #[error("Not an orchestrator: {0}")]
    NotAnOrchestrator(AccountAddress),

    /// Orchestrator or external address already bound to another validator
    #[error("Address conflict: {address} is already bound to validator {owner}")]
    AddressConflict {
        address: String,
        owner: ValidatorAddress,
    },

    /// Signature does not recover to the expected external address
    #[error("Invalid signature: {0}")]
    InvalidSignature(#[from] CryptoError),

    /// Event nonce already finalized or already passed by this validator
    #[error("Stale event: nonce {nonce} <= last {last}")]
    StaleEvent { nonce: u64, last: u64 },

    /// Validator already voted for this exact attestation
    #[error("Duplicate vote from validator {validator} for event nonce {nonce}")]
    DuplicateVote {
        validator: ValidatorAddress,
        nonce: u64,
    },

    /// Denom has no asset contract
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    /// No pending transfers for the asset contract
    #[error("Nothing to batch for contract {0}")]
    NothingToBatch(EthAddress),

    /// Transfer belongs to another sender
    #[error("Transfer {id} is not owned by {sender}")]
    NotOwner { id: u64, sender: AccountAddress },

    /// Transfer has already been selected into a batch
    #[error("Transfer {id} already batched in batch {batch_nonce}")]
    AlreadyBatched { id: u64, batch_nonce: u64 },

    /// Confirmation subject does not exist
    #[error("Unknown subject: {0:?}")]
    UnknownSubject(SubjectRef),

    /// Account cannot cover the requested amount
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(LedgerError),

    /// Caller is not a bonded validator
    #[error("Validator {0} is not bonded")]
    NotBonded(ValidatorAddress),

    /// Transfer id does not exist
    #[error("Transfer {0} not found")]
    TransferNotFound(u64),

    /// Outgoing transfers are disabled by parameter
    #[error("Bridge is not active")]
    BridgeInactive,

    /// Amount and fee use different denoms
    #[error("Denom mismatch: amount {amount}, fee {fee}")]
    DenomMismatch { amount: String, fee: String },

    /// Zero amount or arithmetic overflow
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Malformed event payload
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// Denom already has an asset contract
    #[error("Denom {denom} already mapped to {contract}")]
    DenomAlreadyMapped { denom: String, contract: EthAddress },

    /// Token ledger has no metadata for the denom
    #[error("Unknown denom metadata: {0}")]
    UnknownDenomMetadata(String),

    /// Parameter validation failed
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Encoding or decoding failed
    #[error("Codec error: {0}")]
    Codec(String),

    /// Token ledger rejected an operation
    #[error("Ledger error: {0}")]
    Ledger(LedgerError),
}

impl From<LedgerError> for BridgeError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientFunds { .. } => BridgeError::InsufficientFunds(err),
            other => BridgeError::Ledger(other),
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Codec(err.to_string())
    }
}

impl From<bincode::Error> for BridgeError {
    fn from(err: bincode::Error) -> Self {
        BridgeError::Codec(err.to_string())
    }
}

impl BridgeError {
    /// Short stable label, used as a metrics dimension.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotAnOrchestrator(_) => "not_an_orchestrator",
            Self::AddressConflict { .. } => "address_conflict",
            Self::InvalidSignature(_) => "invalid_signature",
            Self::StaleEvent { .. } => "stale_event",
            Self::DuplicateVote { .. } => "duplicate_vote",
            Self::UnknownAsset(_) => "unknown_asset",
            Self::NothingToBatch(_) => "nothing_to_batch",
            Self::NotOwner { .. } => "not_owner",
            Self::AlreadyBatched { .. } => "already_batched",
            Self::UnknownSubject(_) => "unknown_subject",
            Self::InsufficientFunds(_) => "insufficient_funds",
            Self::NotBonded(_) => "not_bonded",
            Self::TransferNotFound(_) => "transfer_not_found",
            Self::BridgeInactive => "bridge_inactive",
            Self::DenomMismatch { .. } => "denom_mismatch",
            Self::InvalidAmount(_) => "invalid_amount",
            Self::InvalidEvent(_) => "invalid_event",
            Self::DenomAlreadyMapped { .. } => "denom_already_mapped",
            Self::UnknownDenomMetadata(_) => "unknown_denom_metadata",
            Self::InvalidParams(_) => "invalid_params",
            Self::Codec(_) => "codec",
            Self::Ledger(_) => "ledger",
        }
    }
}

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;
