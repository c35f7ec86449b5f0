//! Oracle state structures

use keel_common::{AccessControl, Address, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default staleness window: one hour
pub const DEFAULT_VALID_TIME: u64 = 3_600;

/// Latest accepted price for one symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub symbol: Symbol,
    /// USD price (WAD)
    pub price: u128,
    /// Timestamp of the accepted update (0 = never priced)
    pub updated_at: u64,
    pub enabled: bool,
}

impl PriceRecord {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            price: 0,
            updated_at: 0,
            enabled: false,
        }
    }

    pub fn is_priced(&self) -> bool {
        self.price != 0
    }

    /// Fresh while `now - updated_at <= valid_time` (inclusive boundary)
    pub fn is_fresh(&self, now: u64, valid_time: u64) -> bool {
        now.saturating_sub(self.updated_at) <= valid_time
    }

    pub fn update_price(&mut self, price: u128, timestamp: u64) {
        self.price = price;
        self.updated_at = timestamp;
    }
}

/// Oracle account state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceOracle {
    pub records: BTreeMap<Symbol, PriceRecord>,
    /// Highest accepted nonce, shared across symbols
    pub last_nonce: u64,
    /// Maximum age (seconds) of a servable price
    pub valid_time: u64,
    pub access: AccessControl,
}

impl PriceOracle {
    pub fn new(admin: Address) -> Self {
        Self {
            records: BTreeMap::new(),
            last_nonce: 0,
            valid_time: DEFAULT_VALID_TIME,
            access: AccessControl::new(admin),
        }
    }

    pub fn record(&self, symbol: &Symbol) -> Option<&PriceRecord> {
        self.records.get(symbol)
    }

    pub fn is_enabled(&self, symbol: &Symbol) -> bool {
        self.records.get(symbol).map(|r| r.enabled).unwrap_or(false)
    }
}
