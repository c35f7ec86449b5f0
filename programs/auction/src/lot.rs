//! Lot record and status

use core::fmt;
use keel_common::{Address, Symbol};
use serde::{Deserialize, Serialize};

/// Flat, monotonically increasing lot identifier (per auction kind)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct LotId(pub u64);

impl fmt::Display for LotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LotStatus {
    /// Absent lot
    #[default]
    Unknown,
    /// Registered, not being auctioned
    New,
    /// Inside an auction window
    Auctioned,
    /// Fully sold
    Liquidated,
    /// Retired without a sale (collateral withdrawn)
    Closed,
}

impl LotStatus {
    pub fn as_u8(&self) -> u8 {
        match self {
            LotStatus::Unknown => 0,
            LotStatus::New => 1,
            LotStatus::Auctioned => 2,
            LotStatus::Liquidated => 3,
            LotStatus::Closed => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    pub id: LotId,
    /// Position owner (collateral) or the account that opened the lot (debt/surplus)
    pub owner: Address,
    pub symbol: Symbol,
    /// Units left in the lot
    pub amount: u128,
    /// Units offered in the current window (0 outside a window)
    pub sale_amount: u128,
    /// Oracle price captured at start (WAD)
    pub end_price: u128,
    pub start_time: u64,
    pub end_time: u64,
    pub status: LotStatus,
}

impl Lot {
    pub fn new(id: LotId, owner: Address, symbol: Symbol, amount: u128) -> Self {
        Self {
            id,
            owner,
            symbol,
            amount,
            sale_amount: 0,
            end_price: 0,
            start_time: 0,
            end_time: 0,
            status: LotStatus::New,
        }
    }

    /// Buyable at `now` (window is inclusive of `end_time`)
    pub fn is_open(&self, now: u64) -> bool {
        self.status == LotStatus::Auctioned && now <= self.end_time
    }

    /// Auctioned and past `end_time`
    pub fn is_expired(&self, now: u64) -> bool {
        self.status == LotStatus::Auctioned && now > self.end_time
    }

    pub(crate) fn clear_window(&mut self) {
        self.sale_amount = 0;
        self.end_price = 0;
        self.start_time = 0;
        self.end_time = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_lot() {
        let lot = Lot::new(LotId(1), Address::repeat_byte(1), Symbol::from("ETH"), 10);
        assert_eq!(lot.status, LotStatus::New);
        assert!(!lot.is_open(0));
        assert!(!lot.is_expired(0));
    }

    #[test]
    fn test_window_edges() {
        let mut lot = Lot::new(LotId(1), Address::repeat_byte(1), Symbol::from("ETH"), 10);
        lot.status = LotStatus::Auctioned;
        lot.start_time = 100;
        lot.end_time = 200;

        assert!(lot.is_open(200));
        assert!(!lot.is_expired(200));
        assert!(!lot.is_open(201));
        assert!(lot.is_expired(201));
    }

    #[test]
    fn test_default_status_unknown() {
        assert_eq!(LotStatus::default(), LotStatus::Unknown);
    }
}
