//! Pending outgoing transfers

use serde::{Deserialize, Serialize};
use shared_types::{AccountAddress, Coin, EthAddress};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Transfer waiting to be batched. Amount and fee are escrowed in the
/// module account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendToEthereum {
    pub id: u64,
    pub sender: AccountAddress,
    pub ethereum_recipient: EthAddress,
    pub token_contract: EthAddress,
    pub amount: Coin,
    pub fee: Coin,
}

impl SendToEthereum {
    /// Fee descending, then id ascending.
    pub fn batch_priority(&self, other: &Self) -> Ordering {
        other
            .fee
            .amount
            .cmp(&self.fee.amount)
            .then_with(|| self.id.cmp(&other.id))
    }

    /// Amount plus fee, the escrowed total.
    pub fn escrowed(&self) -> Option<Coin> {
        self.amount.checked_add(&self.fee)
    }
}

/// Offset/limit page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub offset: usize,
    pub limit: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// Unbatched transfers by id.
#[derive(Clone, Debug, Default)]
pub struct TransferPool {
    transfers: BTreeMap<u64, SendToEthereum>,
}

impl TransferPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, transfer: SendToEthereum) {
        self.transfers.insert(transfer.id, transfer);
    }

    pub fn get(&self, id: u64) -> Option<&SendToEthereum> {
        self.transfers.get(&id)
    }

    pub fn remove(&mut self, id: u64) -> Option<SendToEthereum> {
        self.transfers.remove(&id)
    }

    /// Best `max` transfers for `contract`, highest fee first.
    pub fn select_for_batch(&self, contract: &EthAddress, max: usize) -> Vec<u64> {
        let mut candidates: Vec<&SendToEthereum> = self
            .transfers
            .values()
            .filter(|t| t.token_contract == *contract)
            .collect();
        candidates.sort_by(|a, b| a.batch_priority(b));
        candidates.into_iter().take(max).map(|t| t.id).collect()
    }

    /// Contracts with at least one pending transfer.
    pub fn contracts(&self) -> BTreeSet<EthAddress> {
        self.transfers.values().map(|t| t.token_contract).collect()
    }

    pub fn by_sender(&self, sender: &AccountAddress, page: Pagination) -> Page<SendToEthereum> {
        let all: Vec<&SendToEthereum> = self
            .transfers
            .values()
            .filter(|t| t.sender == *sender)
            .collect();
        Page {
            total: all.len(),
            items: all
                .into_iter()
                .skip(page.offset)
                .take(page.limit)
                .cloned()
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SendToEthereum> {
        self.transfers.values()
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }
}
