//! # Solidity ABI Encoding
//!
//! Token constructors for checkpoint preimages on top of `ethabi`.
//! Output must match the external contract's `abi.encode` byte for byte.

use primitive_types::U256;
use shared_types::EthAddress;

pub use ethabi::{encode, Token};

/// `address`
pub fn address(addr: EthAddress) -> Token {
    Token::Address(ethabi::Address::from(*addr.as_bytes()))
}

/// `uint256`
pub fn uint(value: U256) -> Token {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    Token::Uint(ethabi::Uint::from_big_endian(&word))
}

/// `uint256` from a `u64`.
pub fn uint64(value: u64) -> Token {
    Token::Uint(ethabi::Uint::from(value))
}

/// `bytes32` from a short string, right-padded with zeros.
///
/// Input must be at most 32 bytes; callers validate the bound (see the
/// bridge `Params`). Anything longer is cut to its first 32 bytes, so two
/// inputs sharing that prefix encode identically.
pub fn fixed_str(s: &str) -> Token {
    let mut word = [0u8; 32];
    let bytes = s.as_bytes();
    let len = bytes.len().min(32);
    word[..len].copy_from_slice(&bytes[..len]);
    Token::FixedBytes(word.to_vec())
}
