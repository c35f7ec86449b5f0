//! Liquidation: health check and the three auction adapters
//!
//! Each adapter drives its own [`keel_auction::LotBook`] with the shared
//! Dutch pricing and supplies the kind-specific trigger and settlement.

pub mod health;
pub mod collateral_auction;
pub mod debt_auction;
pub mod surplus_auction;

pub use health::*;
pub use collateral_auction::*;
pub use debt_auction::*;
pub use surplus_auction::*;
