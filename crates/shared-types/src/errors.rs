//! # Error Types
//!
//! Parse errors for the textual forms of shared identities.

use thiserror::Error;

/// Errors produced while parsing an address or coin from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input was not valid hex.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded bytes had the wrong length.
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Coin text was not `<amount><denom>`.
    #[error("Invalid coin: {0}")]
    InvalidCoin(String),
}
