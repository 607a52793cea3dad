//! # ECDSA Signatures (secp256k1)
//!
//! External-chain signatures in the 65-byte `r || s || v` layout.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalization on signing, high-S rejected on recovery (EIP-2)
//! - Signatures are always over the personal-sign digest of a 32-byte hash
//!
//! ## Use Cases
//!
//! - Delegate-key proofs (validator binds an external signing address)
//! - Checkpoint confirmations over signer sets and batches

use crate::errors::CryptoError;
use crate::hashing::{eth_signed_message_hash, keccak256};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use shared_types::{EthAddress, Hash};
use std::fmt;
use zeroize::Zeroize;

/// Recoverable ECDSA signature (65 bytes, `r || s || v`).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EthSignature(pub [u8; 65]);

impl EthSignature {
    /// Parse from a byte slice of exactly 65 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 65 {
            return Err(CryptoError::InvalidSignatureLength(bytes.len()));
        }
        let mut out = [0u8; 65];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    /// Recovery byte as transmitted (27/28 or 0/1).
    pub fn v(&self) -> u8 {
        self.0[64]
    }
}

impl fmt::Debug for EthSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EthSignature(0x{})", hex::encode(self.0))
    }
}

impl Serialize for EthSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("0x{}", hex::encode(self.0)))
    }
}

impl<'de> Deserialize<'de> for EthSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(&s))
            .map_err(serde::de::Error::custom)?;
        Self::from_slice(&bytes).map_err(serde::de::Error::custom)
    }
}

/// Recover the external-chain address that personal-signed `hash`.
pub fn recover_eth_address(
    hash: &Hash,
    signature: &EthSignature,
) -> Result<EthAddress, CryptoError> {
    let recovery_id = parse_recovery_id(signature.v())?;

    let sig = Signature::from_slice(&signature.0[..64])
        .map_err(|_| CryptoError::InvalidSignatureFormat)?;

    // normalize_s() returns Some only for high-S input
    if sig.normalize_s().is_some() {
        return Err(CryptoError::MalleableSignature);
    }

    let digest = eth_signed_message_hash(hash);
    let recovered = VerifyingKey::recover_from_prehash(&digest, &sig, recovery_id)
        .map_err(|_| CryptoError::RecoveryFailed)?;

    Ok(address_from_verifying_key(&recovered))
}

/// Check that `signature` over `hash` recovers to `expected`.
pub fn verify_eth_signature(
    hash: &Hash,
    signature: &EthSignature,
    expected: EthAddress,
) -> Result<(), CryptoError> {
    let actual = recover_eth_address(hash, signature)?;
    if actual != expected {
        return Err(CryptoError::SignerMismatch { expected, actual });
    }
    Ok(())
}

/// Derive the external-chain address of a public key.
pub fn address_from_verifying_key(key: &VerifyingKey) -> EthAddress {
    let encoded = key.to_encoded_point(false);
    // Keccak256 of the uncompressed key without the 0x04 tag, last 20 bytes
    let hash = keccak256(&encoded.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    EthAddress(address)
}

/// Parse recovery ID from v value. Valid v values: 0, 1, 27, 28.
fn parse_recovery_id(v: u8) -> Result<RecoveryId, CryptoError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(CryptoError::InvalidRecoveryId(v)),
    };
    RecoveryId::from_byte(id).ok_or(CryptoError::InvalidRecoveryId(v))
}

/// External-chain signing key held by an orchestrator.
pub struct EthSigner {
    signing_key: SigningKey,
}

impl EthSigner {
    /// Generate random key.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut rand::thread_rng()),
        }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// This key's external-chain address.
    pub fn address(&self) -> EthAddress {
        address_from_verifying_key(self.signing_key.verifying_key())
    }

    /// Personal-sign a 32-byte hash. Output is low-S with `v` in {27, 28}.
    pub fn sign_hash(&self, hash: &Hash) -> Result<EthSignature, CryptoError> {
        let digest = eth_signed_message_hash(hash);
        let (sig, recid) = self
            .signing_key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

        // Flipping S mirrors R's y-parity
        let (sig, recid) = match sig.normalize_s() {
            Some(normalized) => (normalized, recid.to_byte() ^ 1),
            None => (sig, recid.to_byte()),
        };

        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&sig.to_bytes());
        out[64] = recid + 27;
        Ok(EthSignature(out))
    }
}

impl Drop for EthSigner {
    fn drop(&mut self) {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}
