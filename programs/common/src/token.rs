//! Fungible asset collaborator
//!
//! The ledger only needs transfer, transfer-from, role-gated mint/burn and a
//! balance query. [`TokenLedger`] is the in-process implementation used for
//! the stablecoin, the governance token and every collateral asset.

use crate::access::{AccessControl, Role};
use crate::error::{LedgerError, Result};
use crate::math::{checked_add, checked_sub};
use crate::types::{Address, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Narrow fungible-asset interface consumed by the router and auctions
pub trait FungibleAsset {
    fn balance_of(&self, account: &Address) -> u128;

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<()>;

    /// Move `amount` from `owner` to `to` on behalf of `spender`
    fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<()>;

    /// Requires the Service role on `minter`
    fn mint(&mut self, minter: &Address, to: &Address, amount: u128) -> Result<()>;

    /// Requires the Service role on `burner`
    fn burn(&mut self, burner: &Address, from: &Address, amount: u128) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLedger {
    pub symbol: Symbol,
    pub total_supply: u128,
    balances: BTreeMap<Address, u128>,
    allowances: BTreeMap<(Address, Address), u128>,
    access: AccessControl,
}

impl TokenLedger {
    pub fn new(symbol: Symbol, admin: Address) -> Self {
        Self {
            symbol,
            total_supply: 0,
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
            access: AccessControl::new(admin),
        }
    }

    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    pub fn access_mut(&mut self) -> &mut AccessControl {
        &mut self.access
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) -> Result<()> {
        if spender.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        self.allowances.insert((*owner, *spender), amount);
        Ok(())
    }

    fn debit(&mut self, account: &Address, amount: u128) -> Result<()> {
        let balance = self.balance_of(account);
        if balance < amount {
            log::debug!(
                "Error: {} balance of {} too low ({} < {})",
                self.symbol,
                account,
                balance,
                amount
            );
            return Err(LedgerError::InsufficientBalance);
        }
        let remaining = balance - amount;
        if remaining == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(*account, remaining);
        }
        Ok(())
    }

    fn credit(&mut self, account: &Address, amount: u128) -> Result<()> {
        let balance = checked_add(self.balance_of(account), amount)?;
        if balance > 0 {
            self.balances.insert(*account, balance);
        }
        Ok(())
    }
}

impl FungibleAsset for TokenLedger {
    fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<()> {
        if to.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<()> {
        let allowance = self.allowance(owner, spender);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance);
        }
        self.transfer(owner, to, amount)?;
        if allowance != u128::MAX {
            self.allowances.insert((*owner, *spender), allowance - amount);
        }
        Ok(())
    }

    fn mint(&mut self, minter: &Address, to: &Address, amount: u128) -> Result<()> {
        self.access.require(Role::Service, minter)?;
        if to.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        self.total_supply = checked_add(self.total_supply, amount)?;
        self.credit(to, amount)
    }

    fn burn(&mut self, burner: &Address, from: &Address, amount: u128) -> Result<()> {
        self.access.require(Role::Service, burner)?;
        self.debit(from, amount)?;
        self.total_supply = checked_sub(self.total_supply, amount)?;
        Ok(())
    }
}
