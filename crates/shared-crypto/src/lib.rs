//! # Shared Crypto - Ethereum-Compatible Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Keccak-256 | Content hashes, checkpoints, personal-sign digests |
//! | `ecdsa` | secp256k1 | Recovering the external-chain signer of a checkpoint or key proof |
//! | `abi` | Solidity ABI | Byte-exact checkpoint preimages the external contract recomputes |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic signing, high-S signatures rejected (EIP-2)
//! - **Personal-sign**: every signed digest is wrapped in the
//!   `"\x19Ethereum Signed Message:\n32"` prefix before signing and recovery

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abi;
pub mod ecdsa;
pub mod errors;
pub mod hashing;

// Re-exports
pub use abi::{encode, Token};
pub use ecdsa::{
    address_from_verifying_key, recover_eth_address, verify_eth_signature, EthSignature,
    EthSigner,
};
pub use errors::CryptoError;
pub use hashing::{eth_signed_message_hash, keccak256, keccak256_many};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
