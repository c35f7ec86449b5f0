//! Surplus auction: sell vault stablecoin for governance tokens, which are burned

use super::debt_auction::require_governance_symbol;
use crate::state::LedgerState;
use keel_auction::LotId;
use keel_common::{checked_add, checked_sub, wad_div, wad_mul, Context, FungibleAsset, LedgerError, Result, Symbol};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SurplusSale {
    /// Stablecoin delivered to the buyer
    pub amount: u128,
    /// Governance tokens burned from the buyer
    pub governance_burned: u128,
}

fn check_surplus_reservation(state: &LedgerState, amount: u128) -> Result<()> {
    if amount == 0 {
        return Err(LedgerError::InvalidAmount);
    }
    let totals = &state.totals;
    let cap = wad_mul(state.surplus_auction.max_lot_amount_factor, totals.surplus)?;
    if amount > cap {
        log::debug!("Error: surplus lot {} exceeds cap {}", amount, cap);
        return Err(LedgerError::ExceedsLotCap);
    }
    if checked_add(amount, totals.surplus_auctioned)? > totals.surplus {
        log::debug!(
            "Error: surplus lot {} + reserved {} exceeds surplus {}",
            amount,
            totals.surplus_auctioned,
            totals.surplus
        );
        return Err(LedgerError::ExceedsAvailableSurplus);
    }
    Ok(())
}

fn start_surplus_window(state: &mut LedgerState, ctx: &Context, lot_id: LotId, amount: u128) -> Result<()> {
    let symbol = state.surplus_lots.get(lot_id)?.symbol.clone();
    let governance_price = state.price(&symbol, ctx.now)?;
    let dutch = state.surplus_auction.dutch;
    let offered = state
        .surplus_lots
        .start(lot_id, amount, governance_price, ctx.now, &dutch)?;
    state.totals.surplus_auctioned = checked_add(state.totals.surplus_auctioned, offered)?;
    Ok(())
}

/// Process start surplus auction instruction
pub fn process_start_surplus_auction(
    state: &mut LedgerState,
    ctx: &Context,
    amount: u128,
    symbol: &Symbol,
) -> Result<LotId> {
    require_governance_symbol(state, symbol)?;
    check_surplus_reservation(state, amount)?;

    let lot_id = state.surplus_lots.open(ctx.caller, symbol.clone(), amount);
    start_surplus_window(state, ctx, lot_id, amount)?;

    log::info!("SurplusAuction: {} opened lot {} for {}", ctx.caller, lot_id, amount);
    Ok(lot_id)
}

/// Process restart surplus lot instruction: same rules as a debt lot restart
pub fn process_restart_surplus_lot(
    state: &mut LedgerState,
    ctx: &Context,
    lot_id: LotId,
    amount: u128,
) -> Result<u128> {
    let lot = state.surplus_lots.require_new(lot_id)?;
    if amount > lot.amount {
        return Err(LedgerError::AmountExceedsLot);
    }
    let amount = if amount == 0 { lot.amount } else { amount };
    check_surplus_reservation(state, amount)?;
    start_surplus_window(state, ctx, lot_id, amount)?;

    log::info!("SurplusAuction: {} restarted lot {} for {}", ctx.caller, lot_id, amount);
    Ok(amount)
}

/// Current governance-token cost of a surplus lot
///
/// Decays from `amount / governance_price * upper` to `... * lower`.
pub fn surplus_lot_cost(state: &LedgerState, lot_id: LotId, now: u64) -> Result<u128> {
    let lot = state.surplus_lots.require_auctioned(lot_id)?;
    let base = wad_div(lot.sale_amount, lot.end_price)?;
    state
        .surplus_auction
        .dutch
        .cost(base, lot.start_time, lot.end_time, now)
}

/// Process buy surplus lot instruction
pub fn process_buy_surplus_lot(
    state: &mut LedgerState,
    ctx: &Context,
    lot_id: LotId,
    payment: u128,
) -> Result<SurplusSale> {
    let lot = state.surplus_lots.require_open(lot_id, ctx.now)?.clone();
    let cost = surplus_lot_cost(state, lot_id, ctx.now)?;
    if payment < cost {
        log::debug!("Error: payment {} below cost {}", payment, cost);
        return Err(LedgerError::InsufficientAmount);
    }

    let vault = state.vault();
    state.governance.burn(&vault, &ctx.caller, cost)?;
    state.stablecoin.transfer(&vault, &ctx.caller, lot.sale_amount)?;
    state.surplus_lots.settle(lot_id)?;

    let totals = &mut state.totals;
    totals.surplus = checked_sub(totals.surplus, lot.sale_amount)?;
    totals.surplus_auctioned = checked_sub(totals.surplus_auctioned, lot.sale_amount)?;

    log::info!(
        "SurplusAuction: {} bought lot {}, burned {} governance",
        ctx.caller,
        lot_id,
        cost
    );
    Ok(SurplusSale {
        amount: lot.sale_amount,
        governance_burned: cost,
    })
}

pub fn process_cancel_surplus_lot(state: &mut LedgerState, ctx: &Context, lot_id: LotId) -> Result<()> {
    let released = state.surplus_lots.cancel(lot_id, ctx.now)?;
    state.totals.surplus_auctioned = checked_sub(state.totals.surplus_auctioned, released)?;
    log::info!("SurplusAuction: {} cancelled lot {}", ctx.caller, lot_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use keel_auction::LotStatus;
    use keel_common::{Role, WAD};

    /// 8 kUSD of surplus in the vault, BOB holds 10 KEEL
    fn with_surplus() -> LedgerState {
        let mut state = setup();
        state.totals.surplus = 8 * WAD;
        state.stablecoin.mint(&VAULT, &VAULT, 8 * WAD).unwrap();
        state
            .governance
            .access_mut()
            .grant_role(&ADMIN, Role::Service, ADMIN)
            .unwrap();
        state.governance.mint(&ADMIN, &BOB, 10 * WAD).unwrap();
        state
    }

    #[test]
    fn test_caps() {
        let mut state = with_surplus();
        assert_eq!(
            process_start_surplus_auction(&mut state, &ctx(BOB, 0), 4 * WAD + 1, &keel()),
            Err(LedgerError::ExceedsLotCap)
        );
        process_start_surplus_auction(&mut state, &ctx(BOB, 0), 4 * WAD, &keel()).unwrap();
        process_start_surplus_auction(&mut state, &ctx(BOB, 0), 4 * WAD, &keel()).unwrap();
        assert_eq!(
            process_start_surplus_auction(&mut state, &ctx(BOB, 0), 1, &keel()),
            Err(LedgerError::ExceedsAvailableSurplus)
        );
    }

    #[test]
    fn test_buy_burns_governance() {
        let mut state = with_surplus();
        let lot = process_start_surplus_auction(&mut state, &ctx(BOB, 0), 4 * WAD, &keel()).unwrap();

        // 4 kUSD / 2 = 2 KEEL, times 1.2 at start
        assert_eq!(surplus_lot_cost(&state, lot, 0).unwrap(), 24 * WAD / 10);
        let supply = state.governance.total_supply;
        let sale = process_buy_surplus_lot(&mut state, &ctx(BOB, 0), lot, 3 * WAD).unwrap();

        assert_eq!(sale.amount, 4 * WAD);
        assert_eq!(sale.governance_burned, 24 * WAD / 10);
        assert_eq!(state.governance.total_supply, supply - sale.governance_burned);
        assert_eq!(state.stablecoin.balance_of(&BOB), 4 * WAD);
        assert_eq!(state.stablecoin.balance_of(&VAULT), 4 * WAD);
        assert_eq!(state.totals.surplus, 4 * WAD);
        assert_eq!(state.totals.surplus_auctioned, 0);
        assert_eq!(state.surplus_lots.status(lot), LotStatus::Liquidated);
    }

    #[test]
    fn test_buy_without_governance_tokens() {
        let mut state = with_surplus();
        let lot = process_start_surplus_auction(&mut state, &ctx(BOB, 0), 4 * WAD, &keel()).unwrap();
        assert_eq!(
            process_buy_surplus_lot(&mut state, &ctx(ALICE, 0), lot, 3 * WAD),
            Err(LedgerError::InsufficientBalance)
        );
    }

    #[test]
    fn test_cancel_after_expiry() {
        let mut state = with_surplus();
        let lot = process_start_surplus_auction(&mut state, &ctx(BOB, 0), 4 * WAD, &keel()).unwrap();
        assert_eq!(
            process_buy_surplus_lot(&mut state, &ctx(BOB, 3_601), lot, 3 * WAD),
            Err(LedgerError::AuctionTimeOver)
        );
        process_cancel_surplus_lot(&mut state, &ctx(BOB, 3_601), lot).unwrap();
        assert_eq!(state.totals.surplus_auctioned, 0);
        assert_eq!(
            process_cancel_surplus_lot(&mut state, &ctx(BOB, 3_602), lot),
            Err(LedgerError::LotNotAuctioned)
        );
    }

    #[test]
    fn test_restart_after_cancel() {
        let mut state = with_surplus();
        let lot = process_start_surplus_auction(&mut state, &ctx(BOB, 0), 4 * WAD, &keel()).unwrap();
        process_cancel_surplus_lot(&mut state, &ctx(BOB, 3_601), lot).unwrap();

        // KEEL now at 4: 4 kUSD / 4 * 1.2
        set_price(&mut state, &keel(), 4 * WAD, 3_601);
        assert_eq!(process_restart_surplus_lot(&mut state, &ctx(BOB, 3_601), lot, 0).unwrap(), 4 * WAD);
        assert_eq!(state.totals.surplus_auctioned, 4 * WAD);
        assert_eq!(surplus_lot_cost(&state, lot, 3_601).unwrap(), 12 * WAD / 10);

        let sale = process_buy_surplus_lot(&mut state, &ctx(BOB, 3_601), lot, 2 * WAD).unwrap();
        assert_eq!(sale.amount, 4 * WAD);
        assert_eq!(state.surplus_lots.status(lot), LotStatus::Liquidated);
        assert_eq!(state.surplus_lots.len(), 1);
        assert_eq!(
            process_restart_surplus_lot(&mut state, &ctx(BOB, 3_601), lot, 0),
            Err(LedgerError::StatusNotNew)
        );
    }
}
