//! Position health as seen by the collateral auction

use crate::state::Position;
use keel_common::{mul_div_up, wad_div, wad_mul, Result, WAD};
use serde::{Deserialize, Serialize};

/// Snapshot of one position at one price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionHealth {
    /// `C * P` in stablecoin units
    pub value: u128,
    pub debt: u128,
    /// `C * P / D`, `None` without debt
    pub ratio: Option<u128>,
    /// Ratio at or below the liquidation threshold
    pub liquidatable: bool,
    /// Largest sale the collateral auction accepts
    pub max_sale: u128,
}

pub fn collateral_ratio(collateral: u128, debt: u128, price: u128) -> Result<Option<u128>> {
    if debt == 0 {
        return Ok(None);
    }
    let value = wad_mul(collateral, price)?;
    wad_div(value, debt).map(Some)
}

/// Collateral to sell at `price` to bring the position back to `target_ratio`
///
/// Selling `x` at par leaves `(C - x) * P / (D - x * P) = R`, so
/// `x = (R * D - C * P) / (P * (R - 1))`, rounded up and capped at `C`. An
/// under-water position (`C * P <= D`) may sell everything. Any debt-carrying
/// position gets at least one unit, since any sale above water lifts its ratio.
pub fn required_sale(collateral: u128, debt: u128, price: u128, target_ratio: u128) -> Result<u128> {
    let value = wad_mul(collateral, price)?;
    if value <= debt || target_ratio <= WAD {
        return Ok(collateral);
    }
    let shortfall = wad_mul(target_ratio, debt)?.saturating_sub(value);
    let per_unit = wad_mul(price, target_ratio - WAD)?;
    if per_unit == 0 {
        return Ok(collateral);
    }
    Ok(mul_div_up(shortfall, WAD, per_unit)?.max(1).min(collateral))
}

/// Ratio a partial sale restores: the position's own minimum, or the
/// liquidation threshold when that has since been raised past it
pub fn target_ratio(position: &Position, liquidate_threshold: u128) -> u128 {
    position.min_ratio.max(liquidate_threshold)
}

pub fn assess(position: &Position, price: u128, liquidate_threshold: u128) -> Result<PositionHealth> {
    let value = wad_mul(position.collateral, price)?;
    let ratio = collateral_ratio(position.collateral, position.debt, price)?;
    let liquidatable = matches!(ratio, Some(r) if r <= liquidate_threshold);
    let max_sale = if liquidatable {
        let target = target_ratio(position, liquidate_threshold);
        required_sale(position.collateral, position.debt, price, target)?
    } else {
        0
    };
    Ok(PositionHealth {
        value,
        debt: position.debt,
        ratio,
        liquidatable,
        max_sale,
    })
}
