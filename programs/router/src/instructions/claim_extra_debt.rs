//! Mint the headroom created by a price rise

use super::owned_new_lot;
use crate::state::LedgerState;
use keel_auction::LotId;
use keel_common::{checked_add, mul_div, Context, FungibleAsset, LedgerError, Result, Symbol};

/// Process claim extra debt instruction
///
/// Mints `C * P / min_ratio - debt` to the owner and moves the position's
/// reference price to `P`. For an untouched position this equals
/// `C * (P - P_ref) / min_ratio`.
pub fn process_claim_extra_debt(
    state: &mut LedgerState,
    ctx: &Context,
    lot_id: LotId,
    symbol: &Symbol,
) -> Result<u128> {
    owned_new_lot(state, &ctx.caller, lot_id, symbol)?;
    let price = state.price(symbol, ctx.now)?;

    let position = state.position_mut(&ctx.caller, symbol)?;
    if price <= position.reference_price {
        log::debug!("Error: price {} has not risen above {}", price, position.reference_price);
        return Err(LedgerError::PriceNotRisen);
    }
    let target = mul_div(position.collateral, price, position.min_ratio)?;
    let extra = target.saturating_sub(position.debt);
    if extra == 0 {
        return Err(LedgerError::NothingToClaim);
    }
    position.debt = checked_add(position.debt, extra)?;
    position.reference_price = price;

    let vault = state.vault();
    state.stablecoin.mint(&vault, &ctx.caller, extra)?;
    state.totals.total_debt = checked_add(state.totals.total_debt, extra)?;

    log::info!("Claim: {} minted {} on lot {} at {}", ctx.caller, extra, lot_id, price);
    Ok(extra)
}
