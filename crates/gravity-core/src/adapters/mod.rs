//! # Adapters Layer
//!
//! In-memory implementations of the outbound ports. Hosts wire their own
//! staking and bank modules; these back tests, simulations and genesis
//! tooling.

mod accounts;
mod bank;
mod staking;

pub use accounts::InMemoryAccounts;
pub use bank::InMemoryBank;
pub use staking::{InMemoryStaking, SlashRecord};
