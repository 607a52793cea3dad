//! External chain height consensus

use crate::domain::attestation::meets_threshold;
use serde::{Deserialize, Serialize};
use shared_types::ValidatorAddress;
use std::collections::BTreeMap;

/// Agreed external height and the block height it was recorded at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestEthereumHeight {
    pub ethereum_height: u64,
    pub cosmos_height: u64,
}

#[derive(Clone, Debug, Default)]
pub struct HeightVotes {
    votes: BTreeMap<ValidatorAddress, u64>,
    observed: LatestEthereumHeight,
}

impl HeightVotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a validator's latest report, replacing the previous one.
    pub fn record(&mut self, validator: ValidatorAddress, ethereum_height: u64) {
        self.votes.insert(validator, ethereum_height);
    }

    pub fn vote(&self, validator: &ValidatorAddress) -> Option<u64> {
        self.votes.get(validator).copied()
    }

    /// Greatest height reached by validators holding 2/3 of `total_power`.
    pub fn consensus_height<F>(&self, power_of: F, total_power: u64) -> Option<u64>
    where
        F: Fn(&ValidatorAddress) -> u64,
    {
        let mut reports: Vec<(u64, u64)> = self
            .votes
            .iter()
            .map(|(v, h)| (*h, power_of(v)))
            .filter(|(_, p)| *p > 0)
            .collect();
        reports.sort_by(|a, b| b.0.cmp(&a.0));

        let mut accumulated = 0u64;
        for (height, power) in reports {
            accumulated = accumulated.saturating_add(power);
            if meets_threshold(accumulated, total_power) {
                return Some(height);
            }
        }
        None
    }

    /// Recompute and record the agreed height if it moved forward.
    pub fn observe<F>(&mut self, power_of: F, total_power: u64, cosmos_height: u64) -> Option<u64>
    where
        F: Fn(&ValidatorAddress) -> u64,
    {
        let height = self.consensus_height(power_of, total_power)?;
        if height <= self.observed.ethereum_height {
            return None;
        }
        self.observed = LatestEthereumHeight {
            ethereum_height: height,
            cosmos_height,
        };
        Some(height)
    }

    pub fn observed(&self) -> LatestEthereumHeight {
        self.observed
    }

    /// Genesis only.
    pub fn set_observed(&mut self, observed: LatestEthereumHeight) {
        self.observed = observed;
    }
}
