//! WAD fixed-point arithmetic
//!
//! Amounts, prices and ratios carry 18 fractional decimal digits. Products of
//! two WAD values are widened to 256 bits before dividing back down, so
//! `collateral * price` never overflows for realistic inputs. Every helper is
//! total: failures surface as [`LedgerError`] instead of panicking.

use crate::error::{LedgerError, Result};
use primitive_types::U256;

/// 1.0 in WAD fixed point
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Number of fractional decimal digits in a WAD value
pub const WAD_DECIMALS: usize = 18;

fn narrow(value: U256) -> Result<u128> {
    if value > U256::from(u128::MAX) {
        return Err(LedgerError::Overflow);
    }
    Ok(value.low_u128())
}

/// `a * b / denominator`, rounded down
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128> {
    if denominator == 0 {
        return Err(LedgerError::DivisionByZero);
    }
    let product = U256::from(a) * U256::from(b);
    narrow(product / U256::from(denominator))
}

/// `a * b / denominator`, rounded up
pub fn mul_div_up(a: u128, b: u128, denominator: u128) -> Result<u128> {
    if denominator == 0 {
        return Err(LedgerError::DivisionByZero);
    }
    let product = U256::from(a) * U256::from(b);
    let denominator = U256::from(denominator);
    let mut quotient = product / denominator;
    if !(product % denominator).is_zero() {
        quotient += U256::one();
    }
    narrow(quotient)
}

/// WAD product `a * b / 1e18`
pub fn wad_mul(a: u128, b: u128) -> Result<u128> {
    mul_div(a, b, WAD)
}

/// WAD quotient `a * 1e18 / b`
pub fn wad_div(a: u128, b: u128) -> Result<u128> {
    mul_div(a, WAD, b)
}

pub fn checked_add(a: u128, b: u128) -> Result<u128> {
    a.checked_add(b).ok_or(LedgerError::Overflow)
}

pub fn checked_sub(a: u128, b: u128) -> Result<u128> {
    a.checked_sub(b).ok_or(LedgerError::Overflow)
}

/// Linear interpolation from `start` to `end` as `elapsed` goes 0..=`span`
///
/// `elapsed` is clamped to `span`, so the value at and after `span` is exactly
/// `end`. Works in either direction.
pub fn lerp(start: u128, end: u128, elapsed: u64, span: u64) -> Result<u128> {
    if span == 0 {
        return Err(LedgerError::InvalidDuration);
    }
    let elapsed = elapsed.min(span) as u128;
    let span = span as u128;
    if start >= end {
        let delta = mul_div(start - end, elapsed, span)?;
        checked_sub(start, delta)
    } else {
        let delta = mul_div(end - start, elapsed, span)?;
        checked_add(start, delta)
    }
}

/// Parse a decimal string ("1.5", "30", "0.000001") into WAD
pub fn parse_wad(text: &str) -> Result<u128> {
    let text = text.trim();
    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(LedgerError::InvalidAmount);
    }
    if frac.len() > WAD_DECIMALS {
        return Err(LedgerError::InvalidAmount);
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return Err(LedgerError::InvalidAmount);
    }
    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| LedgerError::InvalidAmount)?
    };
    let mut frac_value: u128 = 0;
    if !frac.is_empty() {
        frac_value = frac.parse().map_err(|_| LedgerError::InvalidAmount)?;
        frac_value *= 10u128.pow((WAD_DECIMALS - frac.len()) as u32);
    }
    whole
        .checked_mul(WAD)
        .and_then(|w| w.checked_add(frac_value))
        .ok_or(LedgerError::Overflow)
}

/// Render a WAD value as a trimmed decimal string
pub fn format_wad(value: u128) -> String {
    let whole = value / WAD;
    let frac = value % WAD;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:018}", frac);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
