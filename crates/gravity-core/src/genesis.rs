//! Genesis import/export
//!
//! Everything needed to resume the bridge: counters the external contract
//! has already seen, outstanding batches and signer sets with their
//! confirmations, and in-flight attestations. Liveness bookkeeping and
//! per-validator height reports are not carried over.

use crate::domain::{
    Attestation, BatchTx, Confirmation, DenomMapping, KeyRegistry, LatestEthereumHeight,
    OrchestratorBinding, Params, SendToEthereum, SignerSetTx, SubjectRef,
};
use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use shared_types::{EthAddress, ValidatorAddress};
use std::collections::{BTreeMap, BTreeSet};

/// Last issued batch nonce for one asset contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchNonce {
    pub token_contract: EthAddress,
    pub last_nonce: u64,
}

/// Highest event nonce a validator has voted on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorEventNonce {
    pub validator: ValidatorAddress,
    pub event_nonce: u64,
}

/// Highest executed invalidation nonce of one scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCallNonce {
    pub invalidation_scope: Vec<u8>,
    pub invalidation_nonce: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: Params,
    pub last_observed_event_nonce: u64,
    #[serde(default)]
    pub last_transfer_id: u64,
    #[serde(default)]
    pub last_signer_set_nonce: u64,
    #[serde(default)]
    pub batch_nonces: Vec<BatchNonce>,
    #[serde(default)]
    pub denom_mappings: Vec<DenomMapping>,
    #[serde(default)]
    pub delegate_keys: Vec<OrchestratorBinding>,
    #[serde(default)]
    pub unbatched_transfers: Vec<SendToEthereum>,
    #[serde(default)]
    pub batches: Vec<BatchTx>,
    #[serde(default)]
    pub signer_sets: Vec<SignerSetTx>,
    #[serde(default)]
    pub last_observed_signer_set: Option<SignerSetTx>,
    #[serde(default)]
    pub confirmations: Vec<Confirmation>,
    #[serde(default)]
    pub attestations: Vec<Attestation>,
    #[serde(default)]
    pub last_event_nonces: Vec<ValidatorEventNonce>,
    #[serde(default)]
    pub latest_ethereum_height: LatestEthereumHeight,
    #[serde(default)]
    pub contract_calls: Vec<ContractCallNonce>,
}

fn invalid(message: String) -> BridgeError {
    BridgeError::InvalidParams(message)
}

impl GenesisState {
    pub fn from_json(bytes: &[u8]) -> BridgeResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_json(&self) -> BridgeResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn validate(&self) -> BridgeResult<()> {
        self.params.validate()?;
        self.validate_keys()?;
        self.validate_denoms()?;
        self.validate_transfers()?;
        self.validate_batches()?;
        self.validate_signer_sets()?;
        self.validate_confirmations()?;
        self.validate_attestations()
    }

    fn validate_keys(&self) -> BridgeResult<()> {
        let mut registry = KeyRegistry::new();
        let mut validators = BTreeSet::new();
        for binding in &self.delegate_keys {
            if !validators.insert(binding.validator) {
                return Err(invalid(format!(
                    "duplicate delegate keys for {}",
                    binding.validator
                )));
            }
            registry.check_conflicts(binding)?;
            registry.bind(binding.clone());
        }
        Ok(())
    }

    fn validate_denoms(&self) -> BridgeResult<()> {
        let mut denoms = BTreeSet::new();
        let mut contracts = BTreeSet::new();
        for mapping in &self.denom_mappings {
            if !denoms.insert(mapping.denom.as_str()) || !contracts.insert(mapping.contract) {
                return Err(BridgeError::DenomAlreadyMapped {
                    denom: mapping.denom.clone(),
                    contract: mapping.contract,
                });
            }
        }
        Ok(())
    }

    /// Ids are unique across the pool and every batch.
    fn validate_transfers(&self) -> BridgeResult<()> {
        let batched = self.batches.iter().flat_map(|b| b.transactions.iter());
        let mut ids = BTreeSet::new();
        for transfer in self.unbatched_transfers.iter().chain(batched) {
            if !ids.insert(transfer.id) {
                return Err(invalid(format!("duplicate transfer id {}", transfer.id)));
            }
            if transfer.amount.denom != transfer.fee.denom {
                return Err(BridgeError::DenomMismatch {
                    amount: transfer.amount.to_string(),
                    fee: transfer.fee.to_string(),
                });
            }
        }
        Ok(())
    }

    fn validate_batches(&self) -> BridgeResult<()> {
        let mut counters = BTreeMap::new();
        for entry in &self.batch_nonces {
            if counters.insert(entry.token_contract, entry.last_nonce).is_some() {
                return Err(invalid(format!(
                    "duplicate batch nonce for {}",
                    entry.token_contract
                )));
            }
        }

        let mut keys = BTreeSet::new();
        for batch in &self.batches {
            if !keys.insert((batch.token_contract, batch.batch_nonce)) {
                return Err(invalid(format!(
                    "duplicate batch {} for {}",
                    batch.batch_nonce, batch.token_contract
                )));
            }
            if batch.transactions.is_empty() {
                return Err(invalid(format!("batch {} is empty", batch.batch_nonce)));
            }
            if batch
                .transactions
                .iter()
                .any(|t| t.token_contract != batch.token_contract)
            {
                return Err(invalid(format!(
                    "batch {} holds transfers of another contract",
                    batch.batch_nonce
                )));
            }
            if let Some(last) = counters.get(&batch.token_contract) {
                if batch.batch_nonce > *last {
                    return Err(invalid(format!(
                        "batch {} above last batch nonce {} for {}",
                        batch.batch_nonce, last, batch.token_contract
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_signer_sets(&self) -> BridgeResult<()> {
        let mut nonces = BTreeSet::new();
        for set in &self.signer_sets {
            if !nonces.insert(set.nonce) {
                return Err(invalid(format!("duplicate signer set {}", set.nonce)));
            }
        }
        let highest = self
            .signer_sets
            .iter()
            .chain(self.last_observed_signer_set.iter())
            .map(|s| s.nonce)
            .max()
            .unwrap_or(0);
        if self.last_signer_set_nonce != 0 && highest > self.last_signer_set_nonce {
            return Err(invalid(format!(
                "signer set {} above last signer set nonce {}",
                highest, self.last_signer_set_nonce
            )));
        }
        Ok(())
    }

    /// Every confirmation signs a subject that is still stored.
    fn validate_confirmations(&self) -> BridgeResult<()> {
        let mut seen = BTreeSet::new();
        for confirmation in &self.confirmations {
            let known = match confirmation.subject {
                SubjectRef::SignerSet { nonce } => {
                    self.signer_sets.iter().any(|s| s.nonce == nonce)
                }
                SubjectRef::Batch {
                    token_contract,
                    nonce,
                } => self
                    .batches
                    .iter()
                    .any(|b| b.token_contract == token_contract && b.batch_nonce == nonce),
            };
            if !known {
                return Err(BridgeError::UnknownSubject(confirmation.subject));
            }
            if !seen.insert((confirmation.subject, confirmation.ethereum_signer)) {
                return Err(invalid(format!(
                    "duplicate confirmation of {} by {}",
                    confirmation.subject, confirmation.ethereum_signer
                )));
            }
        }
        Ok(())
    }

    fn validate_attestations(&self) -> BridgeResult<()> {
        let mut keys = BTreeSet::new();
        for attestation in &self.attestations {
            let nonce = attestation.event.nonce();
            if !keys.insert((nonce, attestation.event.content_hash()?)) {
                return Err(invalid(format!("duplicate attestation at nonce {}", nonce)));
            }
            if attestation.observed && nonce > self.last_observed_event_nonce {
                return Err(invalid(format!(
                    "attestation {} observed beyond last observed nonce {}",
                    nonce, self.last_observed_event_nonce
                )));
            }
        }

        let mut validators = BTreeSet::new();
        for entry in &self.last_event_nonces {
            if !validators.insert(entry.validator) {
                return Err(invalid(format!(
                    "duplicate event nonce for {}",
                    entry.validator
                )));
            }
        }
        Ok(())
    }
}
