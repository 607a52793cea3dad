//! In-memory staking ledger

use crate::domain::BPS_DENOMINATOR;
use crate::ports::outbound::VotingPowerSource;
use parking_lot::RwLock;
use shared_types::ValidatorAddress;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// One applied penalty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlashRecord {
    pub validator: ValidatorAddress,
    pub infraction_height: u64,
    pub fraction_bps: u32,
    pub amount: u64,
}

#[derive(Clone, Debug)]
struct ValidatorEntry {
    tokens: u64,
    jailed: bool,
}

/// Validators with power equal to their bonded tokens.
#[derive(Default)]
pub struct InMemoryStaking {
    validators: RwLock<BTreeMap<ValidatorAddress, ValidatorEntry>>,
    slashes: RwLock<Vec<SlashRecord>>,
}

impl InMemoryStaking {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validators(validators: &[(ValidatorAddress, u64)]) -> Self {
        let staking = Self::new();
        for (validator, tokens) in validators {
            staking.set_power(*validator, *tokens);
        }
        staking
    }

    /// Bond or re-weight a validator.
    pub fn set_power(&self, validator: ValidatorAddress, tokens: u64) {
        let mut validators = self.validators.write();
        let entry = validators.entry(validator).or_insert(ValidatorEntry {
            tokens: 0,
            jailed: false,
        });
        entry.tokens = tokens;
    }

    pub fn unjail(&self, validator: &ValidatorAddress) {
        if let Some(entry) = self.validators.write().get_mut(validator) {
            entry.jailed = false;
        }
    }

    pub fn tokens(&self, validator: &ValidatorAddress) -> u64 {
        self.validators
            .read()
            .get(validator)
            .map(|e| e.tokens)
            .unwrap_or(0)
    }

    pub fn slashes(&self) -> Vec<SlashRecord> {
        self.slashes.read().clone()
    }
}

impl VotingPowerSource for InMemoryStaking {
    fn bonded_validators(&self) -> Vec<(ValidatorAddress, u64)> {
        self.validators
            .read()
            .iter()
            .filter(|(_, e)| !e.jailed && e.tokens > 0)
            .map(|(v, e)| (*v, e.tokens))
            .collect()
    }

    fn power(&self, validator: &ValidatorAddress) -> Option<u64> {
        self.validators
            .read()
            .get(validator)
            .filter(|e| !e.jailed && e.tokens > 0)
            .map(|e| e.tokens)
    }

    fn is_jailed(&self, validator: &ValidatorAddress) -> bool {
        self.validators
            .read()
            .get(validator)
            .map_or(false, |e| e.jailed)
    }

    fn slash(
        &self,
        validator: &ValidatorAddress,
        infraction_height: u64,
        fraction_bps: u32,
    ) -> u64 {
        let mut validators = self.validators.write();
        let Some(entry) = validators.get_mut(validator) else {
            warn!("[gravity] slash requested for unknown validator {}", validator);
            return 0;
        };
        let amount =
            ((entry.tokens as u128) * (fraction_bps as u128) / BPS_DENOMINATOR as u128) as u64;
        entry.tokens -= amount;
        self.slashes.write().push(SlashRecord {
            validator: *validator,
            infraction_height,
            fraction_bps,
            amount,
        });
        info!(
            validator = %validator,
            amount,
            fraction_bps,
            "[gravity] validator slashed"
        );
        amount
    }

    fn jail(&self, validator: &ValidatorAddress) {
        if let Some(entry) = self.validators.write().get_mut(validator) {
            entry.jailed = true;
            warn!(validator = %validator, "[gravity] validator jailed");
        }
    }
}
