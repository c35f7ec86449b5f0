//! Collateral auction: Dutch sale of an unhealthy position's lot
//!
//! ```text
//! New ──start (ratio <= threshold)──▶ Auctioned ──buy──▶ Liquidated | New
//!                                         └──cancel (after end_time)──▶ New
//! ```

use super::health::assess;
use crate::state::{Aggregates, LedgerState};
use keel_auction::{LotId, LotStatus};
use keel_common::{checked_add, checked_sub, wad_mul, Context, FungibleAsset, LedgerError, Result};
use serde::{Deserialize, Serialize};

/// Outcome of a collateral purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaleReceipt {
    /// Collateral delivered to the buyer
    pub sale_amount: u128,
    /// Stablecoin taken from the buyer
    pub cost: u128,
    /// Part of `cost` burned against the position's debt
    pub settled: u128,
    /// Part of `cost` kept as protocol surplus
    pub surplus: u128,
    /// Debt moved to bad debt because no collateral remained
    pub bad_debt: u128,
    pub status: LotStatus,
}

/// Process start auction instruction
///
/// `requested_sale_amount == 0` offers the whole lot. Any caller may start an
/// auction once the position's ratio is at or below the liquidation
/// threshold.
///
/// # Returns
/// Collateral offered
pub fn process_start_auction(
    state: &mut LedgerState,
    ctx: &Context,
    lot_id: LotId,
    requested_sale_amount: u128,
) -> Result<u128> {
    let lot = state.collateral_lots.require_new(lot_id)?;
    if requested_sale_amount > lot.amount {
        log::debug!("Error: requested {} exceeds lot {}", requested_sale_amount, lot.amount);
        return Err(LedgerError::AmountExceedsLot);
    }
    let sale_amount = if requested_sale_amount == 0 {
        lot.amount
    } else {
        requested_sale_amount
    };
    let symbol = lot.symbol.clone();
    let owner = lot.owner;

    let price = state.price(&symbol, ctx.now)?;
    let position = state.position(&owner, &symbol).ok_or(LedgerError::PositionNotFound)?;
    let health = assess(position, price, state.collateral_auction.liquidate_threshold)?;
    log::debug!("Auction: lot {} ratio {:?}", lot_id, health.ratio);
    if !health.liquidatable {
        log::debug!("Error: lot {} is healthy", lot_id);
        return Err(LedgerError::LotNotForSale);
    }
    if sale_amount > health.max_sale {
        log::debug!("Error: sale {} exceeds required {}", sale_amount, health.max_sale);
        return Err(LedgerError::ExceedsRequiredAmount);
    }

    let dutch = state.collateral_auction.dutch;
    let offered = state
        .collateral_lots
        .start(lot_id, sale_amount, price, ctx.now, &dutch)?;
    Aggregates::add_to(&mut state.totals.total_auctioned, &symbol, offered)?;

    log::info!("Auction: {} started lot {} ({} {})", ctx.caller, lot_id, offered, symbol);
    Ok(offered)
}

/// Current stablecoin cost of an auctioned collateral lot
///
/// Decays from `sale * end_price * upper` to `sale * end_price * lower`.
pub fn collateral_lot_cost(state: &LedgerState, lot_id: LotId, now: u64) -> Result<u128> {
    let lot = state.collateral_lots.require_auctioned(lot_id)?;
    let base = wad_mul(lot.sale_amount, lot.end_price)?;
    state
        .collateral_auction
        .dutch
        .cost(base, lot.start_time, lot.end_time, now)
}

/// Process buy lot instruction
///
/// The buyer pays exactly the current cost (`payment` is the most they
/// accept to pay). Proceeds burn the position's debt, any excess becomes
/// surplus, and debt left on an emptied position becomes bad debt.
pub fn process_buy_lot(
    state: &mut LedgerState,
    ctx: &Context,
    lot_id: LotId,
    payment: u128,
) -> Result<SaleReceipt> {
    let lot = state.collateral_lots.require_open(lot_id, ctx.now)?.clone();
    let cost = collateral_lot_cost(state, lot_id, ctx.now)?;
    if payment < cost {
        log::debug!("Error: payment {} below cost {}", payment, cost);
        return Err(LedgerError::InsufficientAmount);
    }
    let position = state
        .position(&lot.owner, &lot.symbol)
        .cloned()
        .ok_or(LedgerError::PositionNotFound)?;

    let settled = cost.min(position.debt);
    let excess = cost - settled;
    let collateral = checked_sub(position.collateral, lot.sale_amount)?;
    let remaining_debt = position.debt - settled;
    let bad_debt = if collateral == 0 { remaining_debt } else { 0 };

    // Step 1: take payment
    let vault = state.vault();
    if settled > 0 {
        state.stablecoin.burn(&vault, &ctx.caller, settled)?;
    }
    if excess > 0 {
        state.stablecoin.transfer(&ctx.caller, &vault, excess)?;
    }

    // Step 2: deliver collateral
    state
        .collateral_token_mut(&lot.symbol)?
        .transfer(&vault, &ctx.caller, lot.sale_amount)?;

    // Step 3: lot and position
    let status = state.collateral_lots.settle(lot_id)?;
    let entry = state.position_mut(&lot.owner, &lot.symbol)?;
    if collateral == 0 {
        entry.clear();
    } else {
        entry.collateral = collateral;
        entry.debt = remaining_debt;
    }

    // Step 4: aggregates
    let totals = &mut state.totals;
    Aggregates::sub_from(&mut totals.total_collateral, &lot.symbol, lot.sale_amount)?;
    Aggregates::sub_from(&mut totals.total_auctioned, &lot.symbol, lot.sale_amount)?;
    totals.total_debt = checked_sub(totals.total_debt, checked_add(settled, bad_debt)?)?;
    totals.surplus = checked_add(totals.surplus, excess)?;
    totals.bad_debt = checked_add(totals.bad_debt, bad_debt)?;

    log::info!(
        "Auction: {} bought lot {} for {} (settled {}, surplus {}, bad debt {})",
        ctx.caller,
        lot_id,
        cost,
        settled,
        excess,
        bad_debt
    );
    Ok(SaleReceipt {
        sale_amount: lot.sale_amount,
        cost,
        settled,
        surplus: excess,
        bad_debt,
        status,
    })
}

/// Process cancel auction instruction
///
/// Only an Auctioned lot past its `end_time` can be cancelled; it returns to
/// New so it can be restarted at a fresh price.
pub fn process_cancel_auction(state: &mut LedgerState, ctx: &Context, lot_id: LotId) -> Result<()> {
    let symbol = state.collateral_lots.get(lot_id)?.symbol.clone();
    let released = state.collateral_lots.cancel(lot_id, ctx.now)?;
    Aggregates::sub_from(&mut state.totals.total_auctioned, &symbol, released)?;
    log::info!("Auction: {} cancelled lot {}", ctx.caller, lot_id);
    Ok(())
}
