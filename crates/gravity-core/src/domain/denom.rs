//! Denom <-> asset-contract resolution
//!
//! External-chain assets use the voucher denom `gravity0x<contract>` and
//! need no map entry. Chain-native denoms are mapped once their
//! representation contract is deployed.

use serde::{Deserialize, Serialize};
use shared_types::EthAddress;
use std::collections::BTreeMap;

pub const VOUCHER_PREFIX: &str = "gravity";

/// Voucher denom for an external-chain asset.
pub fn voucher_denom(contract: &EthAddress) -> String {
    format!("{}{}", VOUCHER_PREFIX, contract)
}

/// Contract behind a voucher denom.
pub fn parse_voucher_denom(denom: &str) -> Option<EthAddress> {
    denom.strip_prefix(VOUCHER_PREFIX)?.parse().ok()
}

/// Where an asset originates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetOrigin {
    /// Chain-native, escrowed in the module account while bridged out
    Native { denom: String, contract: EthAddress },
    /// External-chain asset, minted here as a voucher
    Voucher { denom: String, contract: EthAddress },
}

impl AssetOrigin {
    pub fn denom(&self) -> &str {
        match self {
            Self::Native { denom, .. } | Self::Voucher { denom, .. } => denom,
        }
    }

    pub fn contract(&self) -> EthAddress {
        match self {
            Self::Native { contract, .. } | Self::Voucher { contract, .. } => *contract,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native { .. })
    }
}

/// Persisted mapping entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenomMapping {
    pub denom: String,
    pub contract: EthAddress,
}

#[derive(Clone, Debug, Default)]
pub struct DenomMap {
    denom_to_contract: BTreeMap<String, EthAddress>,
    contract_to_denom: BTreeMap<EthAddress, String>,
}

impl DenomMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, denom: String, contract: EthAddress) {
        self.contract_to_denom.insert(contract, denom.clone());
        self.denom_to_contract.insert(denom, contract);
    }

    pub fn contract_for_native(&self, denom: &str) -> Option<EthAddress> {
        self.denom_to_contract.get(denom).copied()
    }

    pub fn is_mapped(&self, denom: &str, contract: &EthAddress) -> bool {
        self.denom_to_contract.contains_key(denom) || self.contract_to_denom.contains_key(contract)
    }

    /// Resolve a denom to its contract. `None` means unknown asset.
    pub fn resolve_denom(&self, denom: &str) -> Option<AssetOrigin> {
        if let Some(contract) = parse_voucher_denom(denom) {
            return Some(AssetOrigin::Voucher {
                denom: denom.to_string(),
                contract,
            });
        }
        self.denom_to_contract
            .get(denom)
            .map(|contract| AssetOrigin::Native {
                denom: denom.to_string(),
                contract: *contract,
            })
    }

    /// Resolve a contract. Unmapped contracts are vouchers.
    pub fn resolve_contract(&self, contract: &EthAddress) -> AssetOrigin {
        match self.contract_to_denom.get(contract) {
            Some(denom) => AssetOrigin::Native {
                denom: denom.clone(),
                contract: *contract,
            },
            None => AssetOrigin::Voucher {
                denom: voucher_denom(contract),
                contract: *contract,
            },
        }
    }

    pub fn mappings(&self) -> Vec<DenomMapping> {
        self.denom_to_contract
            .iter()
            .map(|(denom, contract)| DenomMapping {
                denom: denom.clone(),
                contract: *contract,
            })
            .collect()
    }
}
