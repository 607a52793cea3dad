//! Signer sets
//!
//! Powers are normalized to `u32::MAX` so the external contract can
//! compare them against a fixed threshold.

use crate::domain::params::BPS_DENOMINATOR;
use serde::{Deserialize, Serialize};
use shared_crypto::{abi, keccak256, Token};
use shared_types::{EthAddress, Hash};
use std::collections::BTreeMap;

/// Second checkpoint word for signer sets.
pub const SIGNER_SET_METHOD_NAME: &str = "checkpoint";

/// Total normalized power of a full signer set.
pub const NORMALIZED_POWER: u64 = u32::MAX as u64;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EthereumSigner {
    pub ethereum_address: EthAddress,
    pub power: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerSetTx {
    pub nonce: u64,
    /// Block height at creation
    pub height: u64,
    pub signers: Vec<EthereumSigner>,
}

/// Normalize raw powers and order by power desc, address asc.
pub fn normalize_signers(raw: &[(EthAddress, u64)]) -> Vec<EthereumSigner> {
    let total: u128 = raw.iter().map(|(_, p)| *p as u128).sum();
    if total == 0 {
        return Vec::new();
    }
    let mut signers: Vec<EthereumSigner> = raw
        .iter()
        .filter(|(_, p)| *p > 0)
        .map(|(address, power)| EthereumSigner {
            ethereum_address: *address,
            power: ((*power as u128) * (NORMALIZED_POWER as u128) / total) as u64,
        })
        .collect();
    signers.sort_by(|a, b| {
        b.power
            .cmp(&a.power)
            .then_with(|| a.ethereum_address.cmp(&b.ethereum_address))
    });
    signers
}

impl SignerSetTx {
    pub fn new(nonce: u64, height: u64, signers: Vec<EthereumSigner>) -> Self {
        Self {
            nonce,
            height,
            signers,
        }
    }

    /// `keccak256(abi.encode(gravity_id, "checkpoint", nonce, addresses, powers))`
    pub fn checkpoint(&self, gravity_id: &str) -> Hash {
        let addresses = self
            .signers
            .iter()
            .map(|s| abi::address(s.ethereum_address))
            .collect();
        let powers = self
            .signers
            .iter()
            .map(|s| abi::uint64(s.power))
            .collect();

        let encoded = abi::encode(&[
            abi::fixed_str(gravity_id),
            abi::fixed_str(SIGNER_SET_METHOD_NAME),
            abi::uint64(self.nonce),
            Token::Array(addresses),
            Token::Array(powers),
        ]);
        keccak256(&encoded)
    }

    pub fn contains(&self, address: &EthAddress) -> bool {
        self.signers.iter().any(|s| s.ethereum_address == *address)
    }

    /// Summed absolute per-address power change against `signers`, in
    /// basis points of the normalized total. Can reach 20000 for disjoint
    /// sets.
    pub fn power_diff_bps(&self, signers: &[EthereumSigner]) -> u64 {
        let mut delta: BTreeMap<EthAddress, i128> = BTreeMap::new();
        for s in &self.signers {
            *delta.entry(s.ethereum_address).or_default() += s.power as i128;
        }
        for s in signers {
            *delta.entry(s.ethereum_address).or_default() -= s.power as i128;
        }
        let moved: u128 = delta.values().map(|d| d.unsigned_abs()).sum();
        (moved * BPS_DENOMINATOR as u128 / NORMALIZED_POWER as u128) as u64
    }
}

/// Signer-set history plus the last one the external chain accepted.
#[derive(Clone, Debug, Default)]
pub struct SignerSetStore {
    sets: BTreeMap<u64, SignerSetTx>,
    last_observed: Option<SignerSetTx>,
}

impl SignerSetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, set: SignerSetTx) {
        self.sets.insert(set.nonce, set);
    }

    pub fn get(&self, nonce: u64) -> Option<&SignerSetTx> {
        self.sets.get(&nonce)
    }

    pub fn latest(&self) -> Option<&SignerSetTx> {
        self.sets.values().next_back()
    }

    pub fn last_observed(&self) -> Option<&SignerSetTx> {
        self.last_observed.as_ref()
    }

    /// Record the executed set and drop older stored sets. Returns the
    /// pruned nonces.
    pub fn observe(&mut self, set: SignerSetTx) -> Vec<u64> {
        let pruned: Vec<u64> = self.sets.range(..set.nonce).map(|(n, _)| *n).collect();
        for nonce in &pruned {
            self.sets.remove(nonce);
        }
        self.last_observed = Some(set);
        pruned
    }

    pub fn iter(&self) -> impl Iterator<Item = &SignerSetTx> {
        self.sets.values()
    }

    /// Genesis only.
    pub fn set_last_observed(&mut self, set: SignerSetTx) {
        self.last_observed = Some(set);
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
