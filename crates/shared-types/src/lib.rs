//! # Shared Types Crate
//!
//! Identities and value types used across the bridge workspace.
//!
//! ## Design Principles
//!
//! - **Distinct identities**: external-chain signing addresses, chain-side
//!   accounts and validator operators are separate newtypes even though all
//!   three are 20 bytes wide. Mixing them up is a compile error.
//! - **Stable text form**: every address renders as lowercase `0x`-prefixed
//!   hex and (de)serializes through that form.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
