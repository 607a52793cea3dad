//! Checkpoint confirmations
//!
//! One external-chain signature per (subject, signer). Re-submission
//! replaces the stored signature; enough-signatures is judged by relayers.

use serde::{Deserialize, Serialize};
use shared_crypto::EthSignature;
use shared_types::EthAddress;
use std::collections::BTreeMap;
use std::fmt;

/// What a confirmation signs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SubjectRef {
    SignerSet { nonce: u64 },
    Batch { token_contract: EthAddress, nonce: u64 },
}

impl SubjectRef {
    /// Stable discriminant, used as the envelope kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SignerSet { .. } => "gravity.v1.SignerSetTxConfirmation",
            Self::Batch { .. } => "gravity.v1.BatchTxConfirmation",
        }
    }
}

impl fmt::Display for SubjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SignerSet { nonce } => write!(f, "signer_set/{}", nonce),
            Self::Batch {
                token_contract,
                nonce,
            } => write!(f, "batch/{}/{}", token_contract, nonce),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub subject: SubjectRef,
    pub ethereum_signer: EthAddress,
    pub signature: EthSignature,
}

#[derive(Clone, Debug, Default)]
pub struct ConfirmationStore {
    confirmations: BTreeMap<(SubjectRef, EthAddress), Confirmation>,
}

impl ConfirmationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. Returns the replaced confirmation.
    pub fn upsert(&mut self, confirmation: Confirmation) -> Option<Confirmation> {
        self.confirmations.insert(
            (confirmation.subject, confirmation.ethereum_signer),
            confirmation,
        )
    }

    pub fn get(&self, subject: &SubjectRef, signer: &EthAddress) -> Option<&Confirmation> {
        self.confirmations.get(&(*subject, *signer))
    }

    /// All confirmations for a subject, ordered by signer.
    pub fn for_subject(&self, subject: &SubjectRef) -> Vec<Confirmation> {
        self.confirmations
            .range(
                (*subject, EthAddress::new([0; 20]))..=(*subject, EthAddress::new([0xFF; 20])),
            )
            .map(|(_, c)| c.clone())
            .collect()
    }

    pub fn remove_subject(&mut self, subject: &SubjectRef) -> usize {
        let before = self.confirmations.len();
        self.confirmations.retain(|(s, _), _| s != subject);
        before - self.confirmations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Confirmation> {
        self.confirmations.values()
    }

    pub fn len(&self) -> usize {
        self.confirmations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.confirmations.is_empty()
    }
}
