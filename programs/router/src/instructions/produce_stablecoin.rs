//! Lock collateral and mint stablecoin against it

use crate::state::{Aggregates, LedgerState, Position};
use keel_common::{checked_add, mul_div, Context, FungibleAsset, LedgerError, Result, Symbol};

/// Process produce stablecoin instruction
///
/// Pulls `collateral_amount` of `symbol` from the caller into the vault and
/// mints `C_total * price / min_ratio - debt` stablecoin (never negative). A
/// first deposit opens a New collateral lot sized to the collateral; a top-up
/// grows the existing lot, which must still be New.
///
/// # Returns
/// Stablecoin minted by this call
pub fn process_produce_stablecoin(
    state: &mut LedgerState,
    ctx: &Context,
    collateral_amount: u128,
    min_ratio: u128,
    symbol: &Symbol,
) -> Result<u128> {
    log::debug!("Produce: {} locks {} {}", ctx.caller, collateral_amount, symbol);

    if collateral_amount == 0 {
        return Err(LedgerError::InvalidAmount);
    }
    if min_ratio <= state.collateral_auction.liquidate_threshold {
        log::debug!(
            "Error: min ratio {} does not exceed threshold {}",
            min_ratio,
            state.collateral_auction.liquidate_threshold
        );
        return Err(LedgerError::RatioBelowThreshold);
    }
    if !state.collateral(symbol)?.enabled {
        log::debug!("Error: collateral {} is disabled", symbol);
        return Err(LedgerError::DisabledToken);
    }
    let price = state.price(symbol, ctx.now)?;

    let position = state
        .position(&ctx.caller, symbol)
        .cloned()
        .unwrap_or_else(|| Position::new(ctx.caller, symbol.clone()));
    if let Some(lot_id) = position.lot {
        state.collateral_lots.require_new(lot_id)?;
    }

    let collateral = checked_add(position.collateral, collateral_amount)?;
    let target = mul_div(collateral, price, min_ratio)?;
    let minted = target.saturating_sub(position.debt);

    // Step 1: pull collateral into the vault
    let vault = state.vault();
    state
        .collateral_token_mut(symbol)?
        .transfer_from(&vault, &ctx.caller, &vault, collateral_amount)?;

    // Step 2: mint
    if minted > 0 {
        state.stablecoin.mint(&vault, &ctx.caller, minted)?;
    }

    // Step 3: lot
    let lot = match position.lot {
        Some(lot_id) => {
            state.collateral_lots.increase(lot_id, collateral_amount)?;
            lot_id
        }
        None => state.collateral_lots.open(ctx.caller, symbol.clone(), collateral),
    };

    // Step 4: position and aggregates
    let debt = checked_add(position.debt, minted)?;
    state.positions.insert(
        (ctx.caller, symbol.clone()),
        Position {
            collateral,
            debt,
            min_ratio,
            reference_price: price,
            lot: Some(lot),
            ..position
        },
    );
    Aggregates::add_to(&mut state.totals.total_collateral, symbol, collateral_amount)?;
    state.totals.total_debt = checked_add(state.totals.total_debt, minted)?;

    log::info!(
        "Produce: {} minted {} against {} {} (lot {})",
        ctx.caller,
        minted,
        collateral,
        symbol,
        lot
    );
    Ok(minted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use keel_auction::LotStatus;
    use keel_common::WAD;

    #[test]
    fn test_first_mint() {
        let mut state = setup();
        // 1 ETH at 30 with ratio 1.5 → 20 kUSD
        let minted = process_produce_stablecoin(&mut state, &ctx(ALICE, 10), WAD, 3 * WAD / 2, &eth()).unwrap();
        assert_eq!(minted, 20 * WAD);

        let pos = state.position(&ALICE, &eth()).unwrap();
        assert_eq!(pos.collateral, WAD);
        assert_eq!(pos.debt, 20 * WAD);
        assert_eq!(pos.reference_price, 30 * WAD);

        let lot = state.collateral_lots.get(pos.lot.unwrap()).unwrap();
        assert_eq!(lot.status, LotStatus::New);
        assert_eq!(lot.amount, WAD);

        assert_eq!(state.stablecoin.balance_of(&ALICE), 20 * WAD);
        assert_eq!(state.collateral(&eth()).unwrap().token.balance_of(&VAULT), WAD);
        assert_eq!(state.totals.total_debt, 20 * WAD);
        assert_eq!(state.totals.total_collateral(&eth()), WAD);
    }

    #[test]
    fn test_ratio_must_exceed_threshold() {
        let mut state = setup();
        let threshold = state.collateral_auction.liquidate_threshold;
        assert_eq!(
            process_produce_stablecoin(&mut state, &ctx(ALICE, 0), WAD, threshold, &eth()),
            Err(LedgerError::RatioBelowThreshold)
        );
    }

    #[test]
    fn test_top_up_reuses_lot() {
        let mut state = setup();
        let r = 2 * WAD;
        process_produce_stablecoin(&mut state, &ctx(ALICE, 0), WAD, r, &eth()).unwrap();
        let lot = state.position(&ALICE, &eth()).unwrap().lot;

        // 2 ETH at 30 / 2 = 30 total, 15 already minted
        let minted = process_produce_stablecoin(&mut state, &ctx(ALICE, 0), WAD, r, &eth()).unwrap();
        assert_eq!(minted, 15 * WAD);

        let pos = state.position(&ALICE, &eth()).unwrap();
        assert_eq!(pos.lot, lot);
        assert_eq!(pos.debt, 30 * WAD);
        assert_eq!(state.collateral_lots.get(lot.unwrap()).unwrap().amount, 2 * WAD);
        assert_eq!(state.collateral_lots.len(), 1);
    }

    #[test]
    fn test_top_up_after_price_fall_mints_nothing() {
        let mut state = setup();
        process_produce_stablecoin(&mut state, &ctx(ALICE, 0), WAD, 3 * WAD / 2, &eth()).unwrap();
        set_price(&mut state, &eth(), 10 * WAD, 5);

        // 1.1 ETH at 10 / 1.5 = 7.33 < 20 debt
        let minted = process_produce_stablecoin(&mut state, &ctx(ALICE, 5), WAD / 10, 3 * WAD / 2, &eth()).unwrap();
        assert_eq!(minted, 0);
        assert_eq!(state.position(&ALICE, &eth()).unwrap().debt, 20 * WAD);
    }

    #[test]
    fn test_requires_fresh_price() {
        let mut state = setup();
        let stale = state.oracle.valid_time + 1;
        assert_eq!(
            process_produce_stablecoin(&mut state, &ctx(ALICE, stale), WAD, 3 * WAD / 2, &eth()),
            Err(LedgerError::StalePrice)
        );
    }

    #[test]
    fn test_disabled_collateral() {
        let mut state = setup();
        state.collaterals.get_mut(&eth()).unwrap().enabled = false;
        assert_eq!(
            process_produce_stablecoin(&mut state, &ctx(ALICE, 0), WAD, 3 * WAD / 2, &eth()),
            Err(LedgerError::DisabledToken)
        );
    }

    #[test]
    fn test_unknown_collateral() {
        let mut state = setup();
        assert_eq!(
            process_produce_stablecoin(&mut state, &ctx(ALICE, 0), WAD, 3 * WAD / 2, &Symbol::from("BTC")),
            Err(LedgerError::UnknownToken("BTC".into()))
        );
    }

    #[test]
    fn test_insufficient_collateral_balance() {
        let mut state = setup();
        assert_eq!(
            process_produce_stablecoin(&mut state, &ctx(ALICE, 0), FUNDED + 1, 3 * WAD / 2, &eth()),
            Err(LedgerError::InsufficientBalance)
        );
    }
}
