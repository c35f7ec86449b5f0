//! Router and auction parameters

use keel_auction::DutchParams;
use keel_common::{Address, LedgerError, Result, Symbol, WAD};
use serde::{Deserialize, Serialize};

/// Which auction a lot or parameter change refers to
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuctionKind {
    Collateral = 0,
    Debt = 1,
    Surplus = 2,
}

impl AuctionKind {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(AuctionKind::Collateral),
            1 => Some(AuctionKind::Debt),
            2 => Some(AuctionKind::Surplus),
            _ => None,
        }
    }
}

/// CDP ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterParams {
    /// Account the router holds collateral, surplus and fees under
    pub vault: Address,
    pub stable_symbol: Symbol,
    /// Governance token, also its oracle symbol
    pub governance_symbol: Symbol,
    /// Withdrawal fee taken in collateral (WAD fraction)
    pub fee_rate: u128,
    /// Share of the withdrawal fee kept in the auction fee pool (WAD fraction)
    pub auction_fee_share: u128,
    pub fee_receiver: Address,
}

impl RouterParams {
    pub fn new(vault: Address, stable_symbol: Symbol, governance_symbol: Symbol, fee_receiver: Address) -> Self {
        Self {
            vault,
            stable_symbol,
            governance_symbol,
            fee_rate: WAD / 200,         // 0.5%
            auction_fee_share: WAD / 2,  // half of the fee
            fee_receiver,
        }
    }

    pub fn validate_fees(fee_rate: u128, auction_fee_share: u128, receiver: &Address) -> Result<()> {
        if fee_rate >= WAD || auction_fee_share > WAD {
            return Err(LedgerError::InvalidFee);
        }
        if receiver.is_zero() {
            return Err(LedgerError::ZeroAddress);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralAuctionParams {
    pub dutch: DutchParams,
    /// Ratio at or below which a lot may be auctioned (WAD, > 1.0)
    pub liquidate_threshold: u128,
}

impl Default for CollateralAuctionParams {
    fn default() -> Self {
        Self {
            dutch: DutchParams::default(),
            liquidate_threshold: WAD * 12 / 10, // 1.2
        }
    }
}

impl CollateralAuctionParams {
    pub fn validate_threshold(threshold: u128) -> Result<()> {
        if threshold <= WAD {
            return Err(LedgerError::InvalidRatio);
        }
        Ok(())
    }
}

/// Debt and surplus auctions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolAuctionParams {
    pub dutch: DutchParams,
    /// Largest single lot as a fraction of the available pool (WAD, in (0, 1])
    pub max_lot_amount_factor: u128,
}

impl Default for ProtocolAuctionParams {
    fn default() -> Self {
        Self {
            dutch: DutchParams::default(),
            max_lot_amount_factor: WAD / 2,
        }
    }
}

impl ProtocolAuctionParams {
    pub fn validate_factor(factor: u128) -> Result<()> {
        if factor == 0 || factor > WAD {
            return Err(LedgerError::InvalidRatio);
        }
        Ok(())
    }
}
