//! Oracle instruction handlers

use crate::state::{PriceOracle, PriceRecord};
use crate::verifier::{price_digest, Verifier};
use keel_common::{Context, LedgerError, Role, Signature, Symbol};

/// Accept a signed price update
///
/// Any account may submit; the recovered signer must hold the Validator role.
///
/// # Errors
/// * `DisabledToken` - symbol unknown or disabled
/// * `InvalidAmount` - zero price
/// * `StaleNonce` - `nonce <= last_nonce`, checked before the signature
/// * `BadSignature` - recovered signer is not a validator
pub fn process_set_price<V: Verifier + ?Sized>(
    oracle: &mut PriceOracle,
    verifier: &V,
    ctx: &Context,
    nonce: u64,
    price: u128,
    signature: &Signature,
    symbol: &Symbol,
) -> Result<(), LedgerError> {
    if !oracle.is_enabled(symbol) {
        log::debug!("Error: {} is disabled", symbol);
        return Err(LedgerError::DisabledToken);
    }

    if price == 0 {
        log::debug!("Error: zero price for {}", symbol);
        return Err(LedgerError::InvalidAmount);
    }

    if nonce <= oracle.last_nonce {
        log::debug!("Error: nonce {} <= last nonce {}", nonce, oracle.last_nonce);
        return Err(LedgerError::StaleNonce);
    }

    let signer = verifier.recover(&price_digest(nonce, price, symbol), signature)?;
    if !oracle.access.has_role(Role::Validator, &signer) {
        log::debug!("Error: {} is not a trusted signer", signer);
        return Err(LedgerError::BadSignature);
    }

    let record = oracle
        .records
        .get_mut(symbol)
        .ok_or(LedgerError::DisabledToken)?;
    record.update_price(price, ctx.now);
    oracle.last_nonce = nonce;

    log::info!("Oracle: {} = {} (nonce {})", symbol, price, nonce);
    Ok(())
}

/// Latest price for `symbol` as of `now`
pub fn get_price(oracle: &PriceOracle, symbol: &Symbol, now: u64) -> Result<u128, LedgerError> {
    let record = oracle.record(symbol).ok_or(LedgerError::DisabledToken)?;
    if !record.enabled {
        return Err(LedgerError::DisabledToken);
    }
    if !record.is_priced() {
        return Err(LedgerError::PriceNotSet);
    }
    if !record.is_fresh(now, oracle.valid_time) {
        log::debug!(
            "Error: {} price is stale (updated {}, now {})",
            symbol,
            record.updated_at,
            now
        );
        return Err(LedgerError::StalePrice);
    }
    Ok(record.price)
}

/// Enable or disable a symbol, creating its record on first use
pub fn process_update_token(
    oracle: &mut PriceOracle,
    ctx: &Context,
    enabled: bool,
    symbol: &Symbol,
) -> Result<(), LedgerError> {
    oracle.access.require(Role::Admin, &ctx.caller)?;
    if symbol.is_empty() || symbol.as_bytes().len() > Symbol::MAX_LEN {
        return Err(LedgerError::UnknownToken(symbol.to_string()));
    }

    oracle
        .records
        .entry(symbol.clone())
        .or_insert_with(|| PriceRecord::new(symbol.clone()))
        .enabled = enabled;

    log::info!("Oracle: {} enabled = {}", symbol, enabled);
    Ok(())
}

/// Change the staleness window
pub fn process_set_valid_time(
    oracle: &mut PriceOracle,
    ctx: &Context,
    seconds: u64,
) -> Result<(), LedgerError> {
    oracle.access.require(Role::Admin, &ctx.caller)?;
    if seconds == 0 {
        return Err(LedgerError::InvalidDuration);
    }
    oracle.valid_time = seconds;
    log::info!("Oracle: valid time = {}s", seconds);
    Ok(())
}
