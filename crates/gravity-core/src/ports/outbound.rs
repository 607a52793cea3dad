//! Driven ports: collaborators the bridge core calls into
//!
//! All calls are synchronous and deterministic. They run inside a single
//! state-machine step while the service holds its write lock.

use serde::{Deserialize, Serialize};
use shared_types::{AccountAddress, Coin, U256, ValidatorAddress};
use thiserror::Error;

/// Staking ledger view: bonded set, voting power, penalties.
///
/// Power is whatever unit the staking ledger uses; only ratios matter here.
pub trait VotingPowerSource: Send + Sync {
    /// Bonded validators with their current power.
    fn bonded_validators(&self) -> Vec<(ValidatorAddress, u64)>;

    /// Power of a bonded validator, `None` if not bonded.
    fn power(&self, validator: &ValidatorAddress) -> Option<u64>;

    /// Sum of bonded power.
    fn total_power(&self) -> u64 {
        self.bonded_validators()
            .iter()
            .fold(0u64, |acc, (_, p)| acc.saturating_add(*p))
    }

    fn is_jailed(&self, validator: &ValidatorAddress) -> bool;

    /// Slash `fraction_bps` of the validator's stake for an infraction at
    /// `infraction_height`. Returns the amount removed.
    fn slash(&self, validator: &ValidatorAddress, infraction_height: u64, fraction_bps: u32) -> u64;

    /// Remove from the bonded set until unjailed.
    fn jail(&self, validator: &ValidatorAddress);
}

/// Balances and supply. Coins held by the bridge sit in its module account.
pub trait TokenLedger: Send + Sync {
    /// Move coins from an account into the module account.
    fn send_to_module(&self, from: &AccountAddress, coin: &Coin) -> Result<(), LedgerError>;

    /// Move coins from the module account to an account.
    fn send_from_module(&self, to: &AccountAddress, coin: &Coin) -> Result<(), LedgerError>;

    /// Create coins in the module account.
    fn mint(&self, coin: &Coin) -> Result<(), LedgerError>;

    /// Destroy coins held by the module account.
    fn burn(&self, coin: &Coin) -> Result<(), LedgerError>;

    /// True when the ledger has metadata for `denom`.
    fn has_denom(&self, denom: &str) -> bool;
}

/// Account sequence numbers, used for delegate-key replay protection.
pub trait AccountSequenceSource: Send + Sync {
    fn sequence(&self, account: &AccountAddress) -> u64;
}

/// Token ledger failure
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum LedgerError {
    #[error("account {account} has {available}{denom}, needs {required}{denom}")]
    InsufficientFunds {
        account: AccountAddress,
        denom: String,
        required: U256,
        available: U256,
    },

    #[error("module account has {available}{denom}, needs {required}{denom}")]
    ModuleUnderfunded {
        denom: String,
        required: U256,
        available: U256,
    },

    #[error("supply overflow for {0}")]
    Overflow(String),
}
