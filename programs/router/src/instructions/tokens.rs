//! Pass-through token operations on the router's ledgers

use crate::state::LedgerState;
use keel_common::{Address, Context, FungibleAsset, Result, Role, Symbol};

pub fn process_approve(
    state: &mut LedgerState,
    ctx: &Context,
    symbol: &Symbol,
    spender: &Address,
    amount: u128,
) -> Result<()> {
    state.token_mut(symbol)?.approve(&ctx.caller, spender, amount)
}

pub fn process_transfer(
    state: &mut LedgerState,
    ctx: &Context,
    symbol: &Symbol,
    to: &Address,
    amount: u128,
) -> Result<()> {
    state.token_mut(symbol)?.transfer(&ctx.caller, to, amount)
}

/// Mint on a token ledger; the caller needs that token's Service role
pub fn process_mint_token(
    state: &mut LedgerState,
    ctx: &Context,
    symbol: &Symbol,
    to: &Address,
    amount: u128,
) -> Result<()> {
    state.token_mut(symbol)?.mint(&ctx.caller, to, amount)?;
    log::info!("Token: {} minted {} {} to {}", ctx.caller, amount, symbol, to);
    Ok(())
}

/// Grant a role on a token ledger; the caller needs that token's Admin role
pub fn process_grant_token_role(
    state: &mut LedgerState,
    ctx: &Context,
    symbol: &Symbol,
    role: Role,
    account: Address,
) -> Result<()> {
    state
        .token_mut(symbol)?
        .access_mut()
        .grant_role(&ctx.caller, role, account)
}
