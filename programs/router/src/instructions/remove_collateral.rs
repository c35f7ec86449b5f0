//! Withdraw collateral, burning proportional debt

use super::owned_new_lot;
use crate::state::{Aggregates, LedgerState};
use keel_auction::LotId;
use keel_common::{checked_sub, mul_div_up, wad_mul, Context, FungibleAsset, LedgerError, Result, Symbol};

/// Split of a withdrawal fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeSplit {
    pub total: u128,
    /// Retained in the vault's auction fee pool (never paid out)
    pub pool: u128,
    /// Sent to the fee receiver
    pub receiver: u128,
}

pub fn split_fee(amount: u128, fee_rate: u128, auction_fee_share: u128) -> Result<FeeSplit> {
    let total = wad_mul(amount, fee_rate)?;
    let pool = wad_mul(total, auction_fee_share)?;
    Ok(FeeSplit {
        total,
        pool,
        receiver: total - pool,
    })
}

/// Process remove collateral instruction
///
/// Burns `ceil(debt * amount / C)` stablecoin from the owner and releases
/// `amount - fee` collateral. Withdrawing everything zeroes the position and
/// closes its lot.
///
/// # Returns
/// Collateral released to the owner
pub fn process_remove_collateral(
    state: &mut LedgerState,
    ctx: &Context,
    lot_id: LotId,
    amount: u128,
    symbol: &Symbol,
) -> Result<u128> {
    owned_new_lot(state, &ctx.caller, lot_id, symbol)?;
    if amount == 0 {
        return Err(LedgerError::InvalidAmount);
    }
    // Withdrawals read the price too, so a stale feed freezes the position
    state.price(symbol, ctx.now)?;

    let position = state
        .position(&ctx.caller, symbol)
        .cloned()
        .ok_or(LedgerError::PositionNotFound)?;
    if amount > position.collateral {
        log::debug!("Error: withdraw {} exceeds collateral {}", amount, position.collateral);
        return Err(LedgerError::AmountExceedsCollateral);
    }
    let full = amount == position.collateral;
    let burned = if full {
        position.debt
    } else {
        mul_div_up(position.debt, amount, position.collateral)?.min(position.debt)
    };
    let fee = split_fee(amount, state.params.fee_rate, state.params.auction_fee_share)?;
    let released = amount - fee.total;

    // Step 1: burn debt
    let vault = state.vault();
    if burned > 0 {
        state.stablecoin.burn(&vault, &ctx.caller, burned)?;
    }

    // Step 2: release collateral and pay the receiver
    let receiver = state.params.fee_receiver;
    let token = state.collateral_token_mut(symbol)?;
    token.transfer(&vault, &ctx.caller, released)?;
    if fee.receiver > 0 {
        token.transfer(&vault, &receiver, fee.receiver)?;
    }

    // Step 3: position, lot, aggregates
    let position = state.position_mut(&ctx.caller, symbol)?;
    if full {
        position.clear();
        state.collateral_lots.close(lot_id)?;
    } else {
        position.collateral -= amount;
        position.debt -= burned;
        state.collateral_lots.decrease(lot_id, amount)?;
    }
    Aggregates::sub_from(&mut state.totals.total_collateral, symbol, amount)?;
    Aggregates::add_to(&mut state.totals.fee_pool, symbol, fee.pool)?;
    state.totals.total_debt = checked_sub(state.totals.total_debt, burned)?;

    log::info!(
        "Withdraw: {} removed {} {} (fee {}), burned {}",
        ctx.caller,
        amount,
        symbol,
        fee.total,
        burned
    );
    Ok(released)
}
