//! In-memory account sequences

use crate::ports::outbound::AccountSequenceSource;
use parking_lot::RwLock;
use shared_types::AccountAddress;
use std::collections::BTreeMap;

#[derive(Default)]
pub struct InMemoryAccounts {
    sequences: RwLock<BTreeMap<AccountAddress, u64>>,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_sequence(&self, account: AccountAddress, sequence: u64) {
        self.sequences.write().insert(account, sequence);
    }

    /// Bump after the account signs a transaction.
    pub fn increment(&self, account: AccountAddress) -> u64 {
        let mut sequences = self.sequences.write();
        let sequence = sequences.entry(account).or_insert(0);
        *sequence += 1;
        *sequence
    }
}

impl AccountSequenceSource for InMemoryAccounts {
    fn sequence(&self, account: &AccountAddress) -> u64 {
        self.sequences.read().get(account).copied().unwrap_or(0)
    }
}
