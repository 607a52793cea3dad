//! Outgoing batches
//!
//! A batch is immutable once built. It leaves the store when executed on
//! the external chain, when a later batch for the same contract executes,
//! or when it times out.

use crate::domain::transfer::SendToEthereum;
use serde::{Deserialize, Serialize};
use shared_crypto::{abi, keccak256, Token};
use shared_types::{EthAddress, Hash};
use std::collections::BTreeMap;

/// Second checkpoint word for batches.
pub const BATCH_METHOD_NAME: &str = "transactionBatch";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTx {
    pub batch_nonce: u64,
    /// External-chain height after which the batch is void
    pub timeout: u64,
    pub transactions: Vec<SendToEthereum>,
    pub token_contract: EthAddress,
    /// Block height at creation
    pub height: u64,
}

impl BatchTx {
    /// `keccak256(abi.encode(gravity_id, "transactionBatch", amounts,
    /// destinations, fees, batch_nonce, token_contract, timeout))`
    pub fn checkpoint(&self, gravity_id: &str) -> Hash {
        let amounts = self
            .transactions
            .iter()
            .map(|t| abi::uint(t.amount.amount))
            .collect();
        let destinations = self
            .transactions
            .iter()
            .map(|t| abi::address(t.ethereum_recipient))
            .collect();
        let fees = self
            .transactions
            .iter()
            .map(|t| abi::uint(t.fee.amount))
            .collect();

        let encoded = abi::encode(&[
            abi::fixed_str(gravity_id),
            abi::fixed_str(BATCH_METHOD_NAME),
            Token::Array(amounts),
            Token::Array(destinations),
            Token::Array(fees),
            abi::uint64(self.batch_nonce),
            abi::address(self.token_contract),
            abi::uint64(self.timeout),
        ]);
        keccak256(&encoded)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.transactions.iter().any(|t| t.id == id)
    }
}

/// Batches keyed by (contract, nonce).
#[derive(Clone, Debug, Default)]
pub struct BatchStore {
    batches: BTreeMap<(EthAddress, u64), BatchTx>,
}

impl BatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, batch: BatchTx) {
        self.batches
            .insert((batch.token_contract, batch.batch_nonce), batch);
    }

    pub fn get(&self, contract: &EthAddress, nonce: u64) -> Option<&BatchTx> {
        self.batches.get(&(*contract, nonce))
    }

    pub fn remove(&mut self, contract: &EthAddress, nonce: u64) -> Option<BatchTx> {
        self.batches.remove(&(*contract, nonce))
    }

    /// Highest-nonce batch for a contract.
    pub fn last_for(&self, contract: &EthAddress) -> Option<&BatchTx> {
        self.for_contract(contract).next_back()
    }

    /// Batches for a contract, ascending nonce.
    pub fn for_contract<'a>(
        &'a self,
        contract: &EthAddress,
    ) -> impl DoubleEndedIterator<Item = &'a BatchTx> + 'a {
        self.batches
            .range((*contract, 0)..=(*contract, u64::MAX))
            .map(|(_, b)| b)
    }

    /// Nonces of batches for `contract` below `nonce`.
    pub fn earlier_than(&self, contract: &EthAddress, nonce: u64) -> Vec<u64> {
        self.for_contract(contract)
            .map(|b| b.batch_nonce)
            .filter(|n| *n < nonce)
            .collect()
    }

    /// The batch holding transfer `id`.
    pub fn find_transfer(&self, id: u64) -> Option<(&BatchTx, &SendToEthereum)> {
        self.batches.values().find_map(|batch| {
            batch
                .transactions
                .iter()
                .find(|t| t.id == id)
                .map(|t| (batch, t))
        })
    }

    /// Keys of batches whose timeout is at or below `ethereum_height`.
    pub fn timed_out(&self, ethereum_height: u64) -> Vec<(EthAddress, u64)> {
        self.batches
            .iter()
            .filter(|(_, b)| b.timeout <= ethereum_height)
            .map(|(key, _)| *key)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BatchTx> {
        self.batches.values()
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}
