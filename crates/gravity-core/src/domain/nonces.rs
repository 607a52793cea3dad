//! Monotonic id/nonce counters keyed by scope

use shared_types::EthAddress;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NonceKey {
    /// Outgoing transfer ids
    Transfer,
    /// Signer-set nonces
    SignerSet,
    /// Batch nonces, independent per asset contract
    Batch(EthAddress),
}

#[derive(Clone, Debug, Default)]
pub struct NonceArena {
    counters: BTreeMap<NonceKey, u64>,
}

impl NonceArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last issued value, 0 if none.
    pub fn last(&self, key: NonceKey) -> u64 {
        self.counters.get(&key).copied().unwrap_or(0)
    }

    /// The value [`next`](Self::next) would issue.
    pub fn peek(&self, key: NonceKey) -> u64 {
        self.last(key) + 1
    }

    /// Issue the next value.
    pub fn next(&mut self, key: NonceKey) -> u64 {
        let counter = self.counters.entry(key).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Last issued batch nonce of every contract that has one.
    pub fn batch_nonces(&self) -> Vec<(EthAddress, u64)> {
        self.counters
            .iter()
            .filter_map(|(key, last)| match key {
                NonceKey::Batch(contract) => Some((*contract, *last)),
                _ => None,
            })
            .collect()
    }

    /// Raise the counter to at least `value`. Used by genesis import.
    pub fn bump_to(&mut self, key: NonceKey, value: u64) {
        let counter = self.counters.entry(key).or_insert(0);
        *counter = (*counter).max(value);
    }
}
