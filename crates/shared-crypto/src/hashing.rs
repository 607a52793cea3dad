//! # Keccak-256 Hashing
//!
//! The external chain's native hash. Everything the external contract must
//! recompute (checkpoints, signed digests) goes through here.

use sha3::{Digest, Keccak256};
use shared_types::Hash;

/// Prefix the external chain prepends to a 32-byte digest before signing.
const PERSONAL_SIGN_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Keccak-256 of `data` (one-shot).
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Keccak-256 over the concatenation of `inputs`.
pub fn keccak256_many(inputs: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize().into()
}

/// The digest actually signed for `hash` under personal-sign.
pub fn eth_signed_message_hash(hash: &Hash) -> Hash {
    keccak256_many(&[PERSONAL_SIGN_PREFIX, hash])
}
