//! Participation tracking for the liveness monitor
//!
//! Each duty records the height it became due, who was required and who
//! contributed. A duty stays open for contributions until it is a full
//! window old; at the next boundary after that, a validator that was
//! required for at least one settled duty and contributed to none of them
//! is delinquent, and the settled duties are dropped.

use serde::{Deserialize, Serialize};
use shared_types::{EthAddress, ValidatorAddress};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LivenessCategory {
    EventVote,
    SignerSetConfirmation,
    BatchConfirmation,
}

impl LivenessCategory {
    pub const ALL: [LivenessCategory; 3] = [
        LivenessCategory::EventVote,
        LivenessCategory::SignerSetConfirmation,
        LivenessCategory::BatchConfirmation,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::EventVote => "event_vote",
            Self::SignerSetConfirmation => "signer_set_confirmation",
            Self::BatchConfirmation => "batch_confirmation",
        }
    }
}

/// Thing a validator is expected to act on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Duty {
    Event { nonce: u64 },
    SignerSet { nonce: u64 },
    Batch { token_contract: EthAddress, nonce: u64 },
}

impl Duty {
    pub fn category(&self) -> LivenessCategory {
        match self {
            Self::Event { .. } => LivenessCategory::EventVote,
            Self::SignerSet { .. } => LivenessCategory::SignerSetConfirmation,
            Self::Batch { .. } => LivenessCategory::BatchConfirmation,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DutyRecord {
    pub due_height: u64,
    pub required: BTreeSet<ValidatorAddress>,
    pub contributed: BTreeSet<ValidatorAddress>,
}

#[derive(Clone, Debug, Default)]
pub struct LivenessMonitor {
    duties: BTreeMap<Duty, DutyRecord>,
}

impl LivenessMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a duty. Re-registering keeps existing contributions.
    pub fn register(
        &mut self,
        duty: Duty,
        due_height: u64,
        required: BTreeSet<ValidatorAddress>,
        contributed: BTreeSet<ValidatorAddress>,
    ) {
        let record = self.duties.entry(duty).or_insert_with(|| DutyRecord {
            due_height,
            required: BTreeSet::new(),
            contributed: BTreeSet::new(),
        });
        record.required.extend(required);
        record.contributed.extend(contributed);
    }

    /// Credit a contribution. Untracked duties are ignored.
    pub fn contribute(&mut self, duty: &Duty, validator: ValidatorAddress) -> bool {
        match self.duties.get_mut(duty) {
            Some(record) => record.contributed.insert(validator),
            None => false,
        }
    }

    pub fn record(&self, duty: &Duty) -> Option<&DutyRecord> {
        self.duties.get(duty)
    }

    fn settled(
        &self,
        category: LivenessCategory,
        settled_through: u64,
    ) -> impl Iterator<Item = &DutyRecord> {
        self.duties
            .iter()
            .filter(move |(duty, r)| {
                duty.category() == category && r.due_height <= settled_through
            })
            .map(|(_, r)| r)
    }

    /// Validators required for some duty of `category` due at or before
    /// `settled_through` that contributed to none of them.
    pub fn delinquent(
        &self,
        category: LivenessCategory,
        settled_through: u64,
    ) -> BTreeSet<ValidatorAddress> {
        let mut required = BTreeSet::new();
        let mut active = BTreeSet::new();
        for record in self.settled(category, settled_through) {
            required.extend(record.required.iter().copied());
            active.extend(record.contributed.iter().copied());
        }
        required.difference(&active).copied().collect()
    }

    /// Forget duties of `category` due at or before `settled_through`.
    pub fn prune(&mut self, category: LivenessCategory, settled_through: u64) -> usize {
        let before = self.duties.len();
        self.duties
            .retain(|duty, r| duty.category() != category || r.due_height > settled_through);
        before - self.duties.len()
    }

    pub fn len(&self) -> usize {
        self.duties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.duties.is_empty()
    }
}
