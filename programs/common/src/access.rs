//! Role-based access control
//!
//! Each program owns one [`AccessControl`] with the fixed role set below.
//! Only admins grant or revoke roles.

use crate::error::{LedgerError, Result};
use crate::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Parameter changes, role management
    Admin,
    /// Program upgrades (carried for parity with deployments, not checked by the core)
    Upgrader,
    /// Trusted service: mint/burn on tokens, protocol-side actions
    Service,
    /// Price signer for the oracle
    Validator,
}

impl Role {
    pub fn from_u8(value: u8) -> Option<Role> {
        match value {
            0 => Some(Role::Admin),
            1 => Some(Role::Upgrader),
            2 => Some(Role::Service),
            3 => Some(Role::Validator),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            Role::Admin => 0,
            Role::Upgrader => 1,
            Role::Service => 2,
            Role::Validator => 3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    grants: BTreeSet<(Role, Address)>,
}

impl AccessControl {
    /// New role set with `admin` holding the Admin role
    pub fn new(admin: Address) -> Self {
        let mut grants = BTreeSet::new();
        grants.insert((Role::Admin, admin));
        Self { grants }
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.grants.contains(&(role, *account))
    }

    /// Fail with `MissingRole` unless `account` holds `role`
    pub fn require(&self, role: Role, account: &Address) -> Result<()> {
        if !self.has_role(role, account) {
            log::debug!("Error: {} lacks role {:?}", account, role);
            return Err(LedgerError::MissingRole);
        }
        Ok(())
    }

    pub fn grant_role(&mut self, caller: &Address, role: Role, account: Address) -> Result<()> {
        self.require(Role::Admin, caller)?;
        if account.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        self.grants.insert((role, account));
        log::info!("Access: granted {:?} to {}", role, account);
        Ok(())
    }

    pub fn revoke_role(&mut self, caller: &Address, role: Role, account: &Address) -> Result<()> {
        self.require(Role::Admin, caller)?;
        self.grants.remove(&(role, *account));
        log::info!("Access: revoked {:?} from {}", role, account);
        Ok(())
    }

    /// Accounts currently holding `role`
    pub fn members(&self, role: Role) -> impl Iterator<Item = &Address> {
        self.grants
            .iter()
            .filter(move |(r, _)| *r == role)
            .map(|(_, a)| a)
    }
}
