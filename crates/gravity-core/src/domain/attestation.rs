//! Attestation tallies
//!
//! Votes are keyed by (event nonce, content hash), so conflicting reports
//! at one nonce are tallied separately. An attestation becomes observed
//! only when its nonce is exactly `last_observed_nonce + 1`.

use crate::domain::ethereum_event::EthereumEvent;
use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use shared_types::{Hash, ValidatorAddress};
use std::collections::{BTreeMap, BTreeSet};

/// `tally >= ceil(2/3 * total)`, in integer arithmetic.
pub fn meets_threshold(tally: u64, total: u64) -> bool {
    total > 0 && (tally as u128) * 3 >= (total as u128) * 2
}

/// Key of one attestation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttestationKey {
    pub nonce: u64,
    pub content_hash: Hash,
}

/// Validator votes for one claimed event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub event: EthereumEvent,
    pub votes: BTreeSet<ValidatorAddress>,
    pub observed: bool,
    /// Block height of the first vote
    pub height: u64,
    /// Block height at which the attestation was observed
    #[serde(default)]
    pub observed_height: Option<u64>,
}

impl Attestation {
    pub fn new(event: EthereumEvent, height: u64) -> Self {
        Self {
            event,
            votes: BTreeSet::new(),
            observed: false,
            height,
            observed_height: None,
        }
    }

    /// Sum of current voting power behind this attestation.
    pub fn tally<F>(&self, power_of: F) -> u64
    where
        F: Fn(&ValidatorAddress) -> u64,
    {
        self.votes
            .iter()
            .fold(0u64, |acc, v| acc.saturating_add(power_of(v)))
    }
}

/// All attestations plus the nonce counters guarding them.
#[derive(Clone, Debug, Default)]
pub struct AttestationStore {
    attestations: BTreeMap<AttestationKey, Attestation>,
    last_observed_nonce: u64,
    last_vote_nonce: BTreeMap<ValidatorAddress, u64>,
}

impl AttestationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a vote without recording it.
    ///
    /// Order: duplicate first, then per-validator staleness, then global
    /// staleness. A late vote matching the observed attestation passes.
    pub fn check_vote(
        &self,
        validator: &ValidatorAddress,
        key: &AttestationKey,
    ) -> BridgeResult<()> {
        let existing = self.attestations.get(key);
        if existing.map_or(false, |a| a.votes.contains(validator)) {
            return Err(BridgeError::DuplicateVote {
                validator: *validator,
                nonce: key.nonce,
            });
        }

        let own_last = self.last_vote_nonce(validator);
        if key.nonce <= own_last {
            return Err(BridgeError::StaleEvent {
                nonce: key.nonce,
                last: own_last,
            });
        }

        let late_match = existing.map_or(false, |a| a.observed);
        if key.nonce <= self.last_observed_nonce && !late_match {
            return Err(BridgeError::StaleEvent {
                nonce: key.nonce,
                last: self.last_observed_nonce,
            });
        }
        Ok(())
    }

    /// Record a vote checked by [`check_vote`](Self::check_vote).
    pub fn record_vote(
        &mut self,
        validator: ValidatorAddress,
        key: AttestationKey,
        event: EthereumEvent,
        height: u64,
    ) -> &Attestation {
        let entry = self
            .attestations
            .entry(key)
            .or_insert_with(|| Attestation::new(event, height));
        entry.votes.insert(validator);

        let last = self.last_vote_nonce.entry(validator).or_insert(0);
        *last = (*last).max(key.nonce);
        entry
    }

    /// The unobserved attestation at `last_observed_nonce + 1` that
    /// currently meets the threshold, if any. Lowest content hash wins if
    /// two competing reports both qualify.
    pub fn next_observable<F>(&self, power_of: F, total_power: u64) -> Option<AttestationKey>
    where
        F: Fn(&ValidatorAddress) -> u64,
    {
        let nonce = self.last_observed_nonce.checked_add(1)?;
        self.at_nonce(nonce)
            .filter(|(_, a)| !a.observed)
            .find(|(_, a)| meets_threshold(a.tally(&power_of), total_power))
            .map(|(key, _)| *key)
    }

    /// Mark observed at `height` and advance the global counter.
    pub fn mark_observed(&mut self, key: &AttestationKey, height: u64) -> Option<&Attestation> {
        let attestation = self.attestations.get_mut(key)?;
        if attestation.observed || key.nonce != self.last_observed_nonce + 1 {
            return None;
        }
        attestation.observed = true;
        attestation.observed_height = Some(height);
        self.last_observed_nonce = key.nonce;
        Some(attestation)
    }

    pub fn get(&self, key: &AttestationKey) -> Option<&Attestation> {
        self.attestations.get(key)
    }

    /// Every attestation reported at `nonce`.
    pub fn at_nonce(&self, nonce: u64) -> impl Iterator<Item = (&AttestationKey, &Attestation)> {
        let start = AttestationKey {
            nonce,
            content_hash: [0u8; 32],
        };
        let end = AttestationKey {
            nonce,
            content_hash: [0xFF; 32],
        };
        self.attestations.range(start..=end)
    }

    pub fn observed_at(&self, nonce: u64) -> Option<&Attestation> {
        self.at_nonce(nonce).map(|(_, a)| a).find(|a| a.observed)
    }

    pub fn last_observed_nonce(&self) -> u64 {
        self.last_observed_nonce
    }

    /// Genesis only.
    pub fn set_last_observed_nonce(&mut self, nonce: u64) {
        self.last_observed_nonce = nonce;
    }

    /// Genesis only.
    pub fn restore(&mut self, key: AttestationKey, attestation: Attestation) {
        self.attestations.insert(key, attestation);
    }

    /// Genesis only.
    pub fn set_last_vote_nonce(&mut self, validator: ValidatorAddress, nonce: u64) {
        self.last_vote_nonce.insert(validator, nonce);
    }

    /// Every validator's highest voted nonce.
    pub fn last_vote_nonces(&self) -> impl Iterator<Item = (&ValidatorAddress, &u64)> {
        self.last_vote_nonce.iter()
    }

    pub fn last_vote_nonce(&self, validator: &ValidatorAddress) -> u64 {
        self.last_vote_nonce.get(validator).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.attestations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attestations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AttestationKey, &Attestation)> {
        self.attestations.iter()
    }

    /// Drop attestations that can no longer change anything: observed ones
    /// whose observation height is at or before `settled_through`, and
    /// losing reports at nonces that are already observed.
    pub fn prune_settled(&mut self, settled_through: u64) -> usize {
        let last_observed = self.last_observed_nonce;
        let before = self.attestations.len();
        self.attestations.retain(|key, a| {
            if a.observed {
                a.observed_height.map_or(true, |h| h > settled_through)
            } else {
                key.nonce > last_observed
            }
        });
        before - self.attestations.len()
    }
}
