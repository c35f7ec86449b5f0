//! Per-(owner, symbol) collateralized position

use keel_auction::LotId;
use keel_common::{Address, Symbol};
use serde::{Deserialize, Serialize};

/// Invariant: `collateral == 0 => debt == 0`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub owner: Address,
    pub symbol: Symbol,
    /// Locked collateral (WAD)
    pub collateral: u128,
    /// Stablecoin minted against it (WAD)
    pub debt: u128,
    /// Ratio requested at the last mint (WAD)
    pub min_ratio: u128,
    /// Price the debt was last reconciled at (WAD)
    pub reference_price: u128,
    /// Live collateral lot, if any
    pub lot: Option<LotId>,
}

impl Position {
    pub fn new(owner: Address, symbol: Symbol) -> Self {
        Self {
            owner,
            symbol,
            collateral: 0,
            debt: 0,
            min_ratio: 0,
            reference_price: 0,
            lot: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.collateral == 0
    }

    /// Zero the position after full liquidation or withdrawal
    pub fn clear(&mut self) {
        self.collateral = 0;
        self.debt = 0;
        self.min_ratio = 0;
        self.reference_price = 0;
        self.lot = None;
    }
}
