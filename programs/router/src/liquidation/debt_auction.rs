//! Debt auction: sell freshly minted governance tokens to cover bad debt
//!
//! Lots are denominated in stablecoin. A lot of `amount` costs
//! `amount * factor(t)` stablecoin and pays out `amount / governance_price`
//! governance tokens, the price being captured when the lot starts.

use crate::state::LedgerState;
use keel_auction::LotId;
use keel_common::{checked_add, checked_sub, wad_div, wad_mul, Context, FungibleAsset, LedgerError, Result, Symbol};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DebtSale {
    /// Stablecoin taken from the buyer
    pub cost: u128,
    /// Bad debt written off (burned)
    pub covered: u128,
    /// Governance tokens minted to the buyer
    pub governance_minted: u128,
}

pub(crate) fn require_governance_symbol(state: &LedgerState, symbol: &Symbol) -> Result<()> {
    if *symbol != state.params.governance_symbol {
        log::debug!("Error: {} is not the governance symbol", symbol);
        return Err(LedgerError::SymbolMismatch);
    }
    Ok(())
}

/// Lot cap and unreserved bad debt, checked for every window opened
fn check_debt_reservation(state: &LedgerState, amount: u128) -> Result<()> {
    if amount == 0 {
        return Err(LedgerError::InvalidAmount);
    }
    let totals = &state.totals;
    let cap = wad_mul(state.debt_auction.max_lot_amount_factor, totals.bad_debt)?;
    if amount > cap {
        log::debug!("Error: debt lot {} exceeds cap {}", amount, cap);
        return Err(LedgerError::ExceedsLotCap);
    }
    if checked_add(amount, totals.debt_auctioned)? > totals.bad_debt {
        log::debug!(
            "Error: debt lot {} + reserved {} exceeds bad debt {}",
            amount,
            totals.debt_auctioned,
            totals.bad_debt
        );
        return Err(LedgerError::ExceedsAvailableDebt);
    }
    Ok(())
}

/// Open a window on a New debt lot at the current governance price
fn start_debt_window(state: &mut LedgerState, ctx: &Context, lot_id: LotId, amount: u128) -> Result<()> {
    let symbol = state.debt_lots.get(lot_id)?.symbol.clone();
    let governance_price = state.price(&symbol, ctx.now)?;
    let dutch = state.debt_auction.dutch;
    let offered = state
        .debt_lots
        .start(lot_id, amount, governance_price, ctx.now, &dutch)?;
    state.totals.debt_auctioned = checked_add(state.totals.debt_auctioned, offered)?;
    Ok(())
}

/// Process start debt auction instruction
///
/// Any caller may open a lot while unreserved bad debt exists.
pub fn process_start_debt_auction(
    state: &mut LedgerState,
    ctx: &Context,
    amount: u128,
    symbol: &Symbol,
) -> Result<LotId> {
    require_governance_symbol(state, symbol)?;
    check_debt_reservation(state, amount)?;

    let lot_id = state.debt_lots.open(ctx.caller, symbol.clone(), amount);
    start_debt_window(state, ctx, lot_id, amount)?;

    log::info!("DebtAuction: {} opened lot {} for {}", ctx.caller, lot_id, amount);
    Ok(lot_id)
}

/// Process restart debt lot instruction
///
/// Reopens a New lot (cancelled, or partly sold) at a fresh governance price.
/// `amount == 0` offers everything left in the lot; the caps apply again.
pub fn process_restart_debt_lot(
    state: &mut LedgerState,
    ctx: &Context,
    lot_id: LotId,
    amount: u128,
) -> Result<u128> {
    let lot = state.debt_lots.require_new(lot_id)?;
    if amount > lot.amount {
        log::debug!("Error: requested {} exceeds lot {}", amount, lot.amount);
        return Err(LedgerError::AmountExceedsLot);
    }
    let amount = if amount == 0 { lot.amount } else { amount };
    check_debt_reservation(state, amount)?;
    start_debt_window(state, ctx, lot_id, amount)?;

    log::info!("DebtAuction: {} restarted lot {} for {}", ctx.caller, lot_id, amount);
    Ok(amount)
}

/// Current stablecoin cost of a debt lot
pub fn debt_lot_cost(state: &LedgerState, lot_id: LotId, now: u64) -> Result<u128> {
    let lot = state.debt_lots.require_auctioned(lot_id)?;
    state
        .debt_auction
        .dutch
        .cost(lot.sale_amount, lot.start_time, lot.end_time, now)
}

/// Process buy debt lot instruction
///
/// Burns the paid stablecoin against the bad debt this lot reserved (anything
/// beyond the reservation becomes surplus) and mints governance tokens to the
/// buyer.
pub fn process_buy_debt_lot(
    state: &mut LedgerState,
    ctx: &Context,
    lot_id: LotId,
    payment: u128,
) -> Result<DebtSale> {
    let lot = state.debt_lots.require_open(lot_id, ctx.now)?.clone();
    let cost = debt_lot_cost(state, lot_id, ctx.now)?;
    if payment < cost {
        log::debug!("Error: payment {} below cost {}", payment, cost);
        return Err(LedgerError::InsufficientAmount);
    }
    let covered = cost.min(lot.sale_amount).min(state.totals.bad_debt);
    let excess = cost - covered;
    let governance_minted = wad_div(lot.sale_amount, lot.end_price)?;

    let vault = state.vault();
    if covered > 0 {
        state.stablecoin.burn(&vault, &ctx.caller, covered)?;
    }
    if excess > 0 {
        state.stablecoin.transfer(&ctx.caller, &vault, excess)?;
    }
    state.governance.mint(&vault, &ctx.caller, governance_minted)?;
    state.debt_lots.settle(lot_id)?;

    let totals = &mut state.totals;
    totals.bad_debt = checked_sub(totals.bad_debt, covered)?;
    totals.debt_auctioned = checked_sub(totals.debt_auctioned, lot.sale_amount)?;
    totals.surplus = checked_add(totals.surplus, excess)?;

    log::info!(
        "DebtAuction: {} bought lot {} for {}, minted {} governance",
        ctx.caller,
        lot_id,
        cost,
        governance_minted
    );
    Ok(DebtSale {
        cost,
        covered,
        governance_minted,
    })
}

/// Process cancel debt lot instruction: expired lot back to New, reservation released
pub fn process_cancel_debt_lot(state: &mut LedgerState, ctx: &Context, lot_id: LotId) -> Result<()> {
    let released = state.debt_lots.cancel(lot_id, ctx.now)?;
    state.totals.debt_auctioned = checked_sub(state.totals.debt_auctioned, released)?;
    log::info!("DebtAuction: {} cancelled lot {}", ctx.caller, lot_id);
    Ok(())
}
