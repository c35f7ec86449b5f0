//! Repay the shortfall created by a price fall

use super::owned_new_lot;
use crate::state::LedgerState;
use keel_auction::LotId;
use keel_common::{checked_sub, mul_div, Context, FungibleAsset, LedgerError, Result, Symbol};

/// Process dispose debt instruction
///
/// Burns exactly `debt - C * P / min_ratio` from the owner, who must offer at
/// least that much as `payment`. Moves the reference price down to `P`.
///
/// # Returns
/// Stablecoin burned
pub fn process_dispose_debt(
    state: &mut LedgerState,
    ctx: &Context,
    lot_id: LotId,
    symbol: &Symbol,
    payment: u128,
) -> Result<u128> {
    owned_new_lot(state, &ctx.caller, lot_id, symbol)?;
    let price = state.price(symbol, ctx.now)?;

    let position = state.position_mut(&ctx.caller, symbol)?;
    if price >= position.reference_price {
        log::debug!("Error: price {} has not fallen below {}", price, position.reference_price);
        return Err(LedgerError::PriceNotFallen);
    }
    let target = mul_div(position.collateral, price, position.min_ratio)?;
    let required = position.debt.saturating_sub(target);
    if required == 0 {
        return Err(LedgerError::NothingToDispose);
    }
    if payment < required {
        log::debug!("Error: payment {} below required {}", payment, required);
        return Err(LedgerError::InsufficientValue);
    }
    position.debt = checked_sub(position.debt, required)?;
    position.reference_price = price;

    let vault = state.vault();
    state.stablecoin.burn(&vault, &ctx.caller, required)?;
    state.totals.total_debt = checked_sub(state.totals.total_debt, required)?;

    log::info!("Dispose: {} repaid {} on lot {} at {}", ctx.caller, required, lot_id, price);
    Ok(required)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::process_produce_stablecoin;
    use crate::testing::*;
    use keel_common::WAD;

    fn opened() -> (LedgerState, LotId) {
        let mut state = setup();
        process_produce_stablecoin(&mut state, &ctx(ALICE, 0), 3 * WAD, 3 * WAD / 2, &eth()).unwrap();
        let lot = state.position(&ALICE, &eth()).unwrap().lot.unwrap();
        (state, lot)
    }

    #[test]
    fn test_dispose_after_fall() {
        let (mut state, lot) = opened();
        set_price(&mut state, &eth(), 27 * WAD, 10);

        // debt 60, target 3 * 27 / 1.5 = 54 → repay 6; overpayment is not taken
        let burned = process_dispose_debt(&mut state, &ctx(ALICE, 10), lot, &eth(), 10 * WAD).unwrap();
        assert_eq!(burned, 6 * WAD);

        let pos = state.position(&ALICE, &eth()).unwrap();
        assert_eq!(pos.debt, 54 * WAD);
        assert_eq!(pos.reference_price, 27 * WAD);
        assert_eq!(state.stablecoin.balance_of(&ALICE), 54 * WAD);
        assert_eq!(state.totals.total_debt, 54 * WAD);
    }

    #[test]
    fn test_dispose_short_payment() {
        let (mut state, lot) = opened();
        set_price(&mut state, &eth(), 27 * WAD, 10);
        assert_eq!(
            process_dispose_debt(&mut state, &ctx(ALICE, 10), lot, &eth(), 6 * WAD - 1),
            Err(LedgerError::InsufficientValue)
        );
    }

    #[test]
    fn test_dispose_without_fall() {
        let (mut state, lot) = opened();
        set_price(&mut state, &eth(), 31 * WAD, 10);
        assert_eq!(
            process_dispose_debt(&mut state, &ctx(ALICE, 10), lot, &eth(), WAD),
            Err(LedgerError::PriceNotFallen)
        );
    }

    #[test]
    fn test_dispose_not_owner() {
        let (mut state, lot) = opened();
        set_price(&mut state, &eth(), 27 * WAD, 10);
        assert_eq!(
            process_dispose_debt(&mut state, &ctx(BOB, 10), lot, &eth(), 10 * WAD),
            Err(LedgerError::NotOwner)
        );
    }
}
