//! In-memory token ledger

use crate::ports::outbound::{LedgerError, TokenLedger};
use parking_lot::RwLock;
use shared_types::{AccountAddress, Coin, U256};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Default)]
struct Balances {
    accounts: BTreeMap<(AccountAddress, String), U256>,
    module: BTreeMap<String, U256>,
    supply: BTreeMap<String, U256>,
    denoms: BTreeSet<String>,
}

#[derive(Default)]
pub struct InMemoryBank {
    inner: RwLock<Balances>,
}

impl InMemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register denom metadata.
    pub fn register_denom(&self, denom: &str) {
        self.inner.write().denoms.insert(denom.to_string());
    }

    /// Mint directly into an account. Registers the denom.
    pub fn fund(&self, account: AccountAddress, coin: Coin) {
        let mut inner = self.inner.write();
        inner.denoms.insert(coin.denom.clone());
        let supply = inner.supply.entry(coin.denom.clone()).or_default();
        *supply = supply.saturating_add(coin.amount);
        let balance = inner.accounts.entry((account, coin.denom)).or_default();
        *balance = balance.saturating_add(coin.amount);
    }

    pub fn balance(&self, account: &AccountAddress, denom: &str) -> U256 {
        self.inner
            .read()
            .accounts
            .get(&(*account, denom.to_string()))
            .copied()
            .unwrap_or_default()
    }

    pub fn module_balance(&self, denom: &str) -> U256 {
        self.inner.read().module.get(denom).copied().unwrap_or_default()
    }

    pub fn supply(&self, denom: &str) -> U256 {
        self.inner.read().supply.get(denom).copied().unwrap_or_default()
    }
}

impl TokenLedger for InMemoryBank {
    fn send_to_module(&self, from: &AccountAddress, coin: &Coin) -> Result<(), LedgerError> {
        let mut inner = self.inner.write();
        let key = (*from, coin.denom.clone());
        let available = inner.accounts.get(&key).copied().unwrap_or_default();
        if available < coin.amount {
            return Err(LedgerError::InsufficientFunds {
                account: *from,
                denom: coin.denom.clone(),
                required: coin.amount,
                available,
            });
        }
        inner.accounts.insert(key, available - coin.amount);
        let module = inner.module.entry(coin.denom.clone()).or_default();
        *module = module.saturating_add(coin.amount);
        debug!(from = %from, coin = %coin, "[gravity] escrowed");
        Ok(())
    }

    fn send_from_module(&self, to: &AccountAddress, coin: &Coin) -> Result<(), LedgerError> {
        let mut inner = self.inner.write();
        let available = inner.module.get(&coin.denom).copied().unwrap_or_default();
        if available < coin.amount {
            return Err(LedgerError::ModuleUnderfunded {
                denom: coin.denom.clone(),
                required: coin.amount,
                available,
            });
        }
        inner.module.insert(coin.denom.clone(), available - coin.amount);
        let balance = inner.accounts.entry((*to, coin.denom.clone())).or_default();
        *balance = balance.saturating_add(coin.amount);
        Ok(())
    }

    fn mint(&self, coin: &Coin) -> Result<(), LedgerError> {
        let mut inner = self.inner.write();
        let supply = inner.supply.get(&coin.denom).copied().unwrap_or_default();
        let new_supply = supply
            .checked_add(coin.amount)
            .ok_or_else(|| LedgerError::Overflow(coin.denom.clone()))?;
        inner.supply.insert(coin.denom.clone(), new_supply);
        inner.denoms.insert(coin.denom.clone());
        let module = inner.module.entry(coin.denom.clone()).or_default();
        *module = module.saturating_add(coin.amount);
        Ok(())
    }

    fn burn(&self, coin: &Coin) -> Result<(), LedgerError> {
        let mut inner = self.inner.write();
        let available = inner.module.get(&coin.denom).copied().unwrap_or_default();
        if available < coin.amount {
            return Err(LedgerError::ModuleUnderfunded {
                denom: coin.denom.clone(),
                required: coin.amount,
                available,
            });
        }
        inner.module.insert(coin.denom.clone(), available - coin.amount);
        let supply = inner.supply.entry(coin.denom.clone()).or_default();
        *supply = supply.saturating_sub(coin.amount);
        Ok(())
    }

    fn has_denom(&self, denom: &str) -> bool {
        self.inner.read().denoms.contains(denom)
    }
}
