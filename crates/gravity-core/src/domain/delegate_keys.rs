//! Orchestrator bindings
//!
//! A validator binds one orchestrator account and one external signing
//! address. Each of the three sides is unique across all bindings.

use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use shared_crypto::keccak256;
use shared_types::{AccountAddress, EthAddress, Hash, ValidatorAddress};
use std::collections::BTreeMap;

/// One validator's delegated keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorBinding {
    pub validator: ValidatorAddress,
    pub orchestrator: AccountAddress,
    pub ethereum_address: EthAddress,
}

/// Challenge the external key signs to prove ownership.
///
/// `nonce` is the validator account's current sequence, so a proof cannot
/// be replayed after the account transacts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateKeysSignMsg {
    pub validator_address: ValidatorAddress,
    pub nonce: u64,
}

impl DelegateKeysSignMsg {
    pub fn new(validator_address: ValidatorAddress, nonce: u64) -> Self {
        Self {
            validator_address,
            nonce,
        }
    }

    /// Keccak-256 of the canonical JSON encoding.
    pub fn challenge_hash(&self) -> BridgeResult<Hash> {
        let bytes = serde_json::to_vec(self)?;
        Ok(keccak256(&bytes))
    }
}

/// Bidirectional index of bindings.
#[derive(Debug, Default, Clone)]
pub struct KeyRegistry {
    by_validator: BTreeMap<ValidatorAddress, OrchestratorBinding>,
    by_orchestrator: BTreeMap<AccountAddress, ValidatorAddress>,
    by_ethereum: BTreeMap<EthAddress, ValidatorAddress>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail if either address is already bound to a different validator.
    pub fn check_conflicts(&self, binding: &OrchestratorBinding) -> BridgeResult<()> {
        if let Some(owner) = self.by_orchestrator.get(&binding.orchestrator) {
            if *owner != binding.validator {
                return Err(BridgeError::AddressConflict {
                    address: binding.orchestrator.to_string(),
                    owner: *owner,
                });
            }
        }
        if let Some(owner) = self.by_ethereum.get(&binding.ethereum_address) {
            if *owner != binding.validator {
                return Err(BridgeError::AddressConflict {
                    address: binding.ethereum_address.to_string(),
                    owner: *owner,
                });
            }
        }
        Ok(())
    }

    /// Insert or replace the validator's binding. Returns the old one.
    ///
    /// Callers must run [`check_conflicts`](Self::check_conflicts) first.
    pub fn bind(&mut self, binding: OrchestratorBinding) -> Option<OrchestratorBinding> {
        let previous = self.by_validator.remove(&binding.validator);
        if let Some(old) = &previous {
            self.by_orchestrator.remove(&old.orchestrator);
            self.by_ethereum.remove(&old.ethereum_address);
        }
        self.by_orchestrator
            .insert(binding.orchestrator, binding.validator);
        self.by_ethereum
            .insert(binding.ethereum_address, binding.validator);
        self.by_validator.insert(binding.validator, binding);
        previous
    }

    pub fn binding(&self, validator: &ValidatorAddress) -> Option<&OrchestratorBinding> {
        self.by_validator.get(validator)
    }

    pub fn validator_for_orchestrator(
        &self,
        orchestrator: &AccountAddress,
    ) -> Option<ValidatorAddress> {
        self.by_orchestrator.get(orchestrator).copied()
    }

    pub fn validator_for_ethereum(&self, address: &EthAddress) -> Option<ValidatorAddress> {
        self.by_ethereum.get(address).copied()
    }

    pub fn ethereum_address(&self, validator: &ValidatorAddress) -> Option<EthAddress> {
        self.by_validator.get(validator).map(|b| b.ethereum_address)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrchestratorBinding> {
        self.by_validator.values()
    }

    pub fn len(&self) -> usize {
        self.by_validator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_validator.is_empty()
    }
}
