//! Bounded linear price decay

use keel_common::{lerp, wad_mul, LedgerError, Result, WAD};
use serde::{Deserialize, Serialize};

/// Decay parameters shared by every auction kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutchParams {
    /// Seconds from start to `end_time`
    pub auction_duration: u64,
    /// Cost factor at start (WAD, e.g. 1.2e18)
    pub upper_bound_cost: u128,
    /// Cost factor at `end_time` and after (WAD)
    pub lower_bound_cost: u128,
}

impl Default for DutchParams {
    fn default() -> Self {
        Self {
            auction_duration: 3_600,         // 1 hour
            upper_bound_cost: WAD * 12 / 10, // 120% of reference value
            lower_bound_cost: WAD * 8 / 10,  // 80% of reference value
        }
    }
}

impl DutchParams {
    pub fn validate(&self) -> Result<()> {
        if self.auction_duration == 0 {
            return Err(LedgerError::InvalidDuration);
        }
        if self.upper_bound_cost == 0 || self.lower_bound_cost > self.upper_bound_cost {
            return Err(LedgerError::InvalidBounds);
        }
        Ok(())
    }

    /// Cost factor at `now` for a window `[start_time, end_time]`
    ///
    /// Non-increasing in `now`; exactly `lower_bound_cost` from `end_time` on.
    /// The span comes from the window recorded at start, so a later change of
    /// `auction_duration` leaves running windows alone.
    pub fn cost_factor(&self, start_time: u64, end_time: u64, now: u64) -> Result<u128> {
        let span = end_time.saturating_sub(start_time);
        let elapsed = now.saturating_sub(start_time);
        lerp(self.upper_bound_cost, self.lower_bound_cost, elapsed, span)
    }

    /// `base * cost_factor` at `now`
    pub fn cost(&self, base: u128, start_time: u64, end_time: u64, now: u64) -> Result<u128> {
        wad_mul(base, self.cost_factor(start_time, end_time, now)?)
    }
}
