//! Crypto error types.

use shared_types::EthAddress;
use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Signature bytes are not a 65-byte `r || s || v` encoding
    #[error("Invalid signature length: expected 65, got {0}")]
    InvalidSignatureLength(usize),

    /// Invalid signature format (scalar out of range, not on curve)
    #[error("Invalid signature format")]
    InvalidSignatureFormat,

    /// High-S signature (EIP-2)
    #[error("Malleable signature: S is in the upper half of the curve order")]
    MalleableSignature,

    /// Recovery id byte not in {0, 1, 27, 28}
    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    /// Public key recovery failed
    #[error("Public key recovery failed")]
    RecoveryFailed,

    /// Recovered signer differs from the claimed one
    #[error("Signer mismatch: expected {expected}, recovered {actual}")]
    SignerMismatch {
        /// Address the caller claimed
        expected: EthAddress,
        /// Address the signature recovers to
        actual: EthAddress,
    },

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Signing failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}
