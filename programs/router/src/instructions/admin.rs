//! Admin-gated configuration

use crate::state::{
    AuctionKind, CollateralAsset, CollateralAuctionParams, LedgerState, ProtocolAuctionParams,
    RouterParams,
};
use keel_auction::DutchParams;
use keel_common::{Address, Context, LedgerError, Result, Role, Symbol, TokenLedger};

/// Register a collateral asset or toggle an existing one
///
/// A new asset gets its own token ledger administered by the caller, with the
/// Service role for the vault (custody) and the caller (faucet).
pub fn process_set_token(
    state: &mut LedgerState,
    ctx: &Context,
    enabled: bool,
    symbol: &Symbol,
) -> Result<()> {
    state.access.require(Role::Admin, &ctx.caller)?;
    if symbol.is_empty() || symbol.as_bytes().len() > Symbol::MAX_LEN {
        return Err(LedgerError::UnknownToken(symbol.to_string()));
    }
    if *symbol == state.params.stable_symbol || *symbol == state.params.governance_symbol {
        log::debug!("Error: {} is a protocol token", symbol);
        return Err(LedgerError::SymbolMismatch);
    }

    match state.collaterals.get_mut(symbol) {
        Some(asset) => asset.enabled = enabled,
        None => {
            let vault = state.vault();
            let mut token = TokenLedger::new(symbol.clone(), ctx.caller);
            token.access_mut().grant_role(&ctx.caller, Role::Service, vault)?;
            token.access_mut().grant_role(&ctx.caller, Role::Service, ctx.caller)?;
            state
                .collaterals
                .insert(symbol.clone(), CollateralAsset { token, enabled });
        }
    }

    log::info!("Router: collateral {} enabled = {}", symbol, enabled);
    Ok(())
}

pub fn process_set_fees(
    state: &mut LedgerState,
    ctx: &Context,
    fee_rate: u128,
    auction_fee_share: u128,
    fee_receiver: Address,
) -> Result<()> {
    state.access.require(Role::Admin, &ctx.caller)?;
    RouterParams::validate_fees(fee_rate, auction_fee_share, &fee_receiver)?;

    state.params.fee_rate = fee_rate;
    state.params.auction_fee_share = auction_fee_share;
    state.params.fee_receiver = fee_receiver;
    log::info!(
        "Router: fees rate={} share={} receiver={}",
        fee_rate,
        auction_fee_share,
        fee_receiver
    );
    Ok(())
}

/// Replace the decay parameters of one auction kind
///
/// Lots already in a window keep their recorded `[start_time, end_time]`;
/// only the cost bounds apply to them immediately.
pub fn process_set_auction_params(
    state: &mut LedgerState,
    ctx: &Context,
    kind: AuctionKind,
    params: DutchParams,
) -> Result<()> {
    state.access.require(Role::Admin, &ctx.caller)?;
    params.validate()?;
    *state.dutch_params_mut(kind) = params;
    log::info!("Router: {:?} auction params {:?}", kind, params);
    Ok(())
}

pub fn process_set_liquidate_threshold(
    state: &mut LedgerState,
    ctx: &Context,
    threshold: u128,
) -> Result<()> {
    state.access.require(Role::Admin, &ctx.caller)?;
    CollateralAuctionParams::validate_threshold(threshold)?;
    state.collateral_auction.liquidate_threshold = threshold;
    log::info!("Router: liquidate threshold = {}", threshold);
    Ok(())
}

/// Debt and surplus auctions only
pub fn process_set_max_lot_amount_factor(
    state: &mut LedgerState,
    ctx: &Context,
    kind: AuctionKind,
    factor: u128,
) -> Result<()> {
    state.access.require(Role::Admin, &ctx.caller)?;
    ProtocolAuctionParams::validate_factor(factor)?;
    match kind {
        AuctionKind::Debt => state.debt_auction.max_lot_amount_factor = factor,
        AuctionKind::Surplus => state.surplus_auction.max_lot_amount_factor = factor,
        AuctionKind::Collateral => return Err(LedgerError::InvalidInstruction),
    }
    log::info!("Router: {:?} max lot factor = {}", kind, factor);
    Ok(())
}

pub fn process_grant_role(state: &mut LedgerState, ctx: &Context, role: Role, account: Address) -> Result<()> {
    state.access.grant_role(&ctx.caller, role, account)
}

pub fn process_revoke_role(state: &mut LedgerState, ctx: &Context, role: Role, account: &Address) -> Result<()> {
    state.access.revoke_role(&ctx.caller, role, account)
}
