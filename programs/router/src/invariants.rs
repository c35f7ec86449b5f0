//! Ledger invariants checked after every mutating operation

use crate::state::LedgerState;
use keel_auction::LotStatus;
use keel_common::{FungibleAsset, LedgerError, Result, Symbol};
use std::collections::BTreeMap;

/// Σ position.debt == total_debt
pub fn debt_conserved(s: &LedgerState) -> bool {
    let sum = s
        .positions
        .values()
        .fold(0u128, |acc, p| acc.saturating_add(p.debt));
    sum == s.totals.total_debt
}

/// Σ position.collateral == total_collateral, per symbol
pub fn collateral_conserved(s: &LedgerState) -> bool {
    let mut sums: BTreeMap<&Symbol, u128> = BTreeMap::new();
    for p in s.positions.values() {
        let entry = sums.entry(&p.symbol).or_insert(0);
        *entry = entry.saturating_add(p.collateral);
    }
    sums.keys()
        .copied()
        .chain(s.totals.total_collateral.keys())
        .all(|sym| sums.get(sym).copied().unwrap_or(0) == s.totals.total_collateral(sym))
}

/// collateral == 0 ⇒ debt == 0
pub fn empty_positions_debt_free(s: &LedgerState) -> bool {
    s.positions.values().all(|p| p.collateral > 0 || p.debt == 0)
}

/// A live position's lot is New or Auctioned and holds exactly its collateral
pub fn lots_track_positions(s: &LedgerState) -> bool {
    s.positions.values().all(|p| match p.lot {
        None => p.collateral == 0,
        Some(id) => s.collateral_lots.get(id).map_or(false, |lot| {
            matches!(lot.status, LotStatus::New | LotStatus::Auctioned) && lot.amount == p.collateral
        }),
    })
}

/// total_auctioned matches the sale amounts of auctioned collateral lots
pub fn auctioned_tracked(s: &LedgerState) -> bool {
    let mut sums: BTreeMap<&Symbol, u128> = BTreeMap::new();
    for lot in s.collateral_lots.with_status(LotStatus::Auctioned) {
        let entry = sums.entry(&lot.symbol).or_insert(0);
        *entry = entry.saturating_add(lot.sale_amount);
    }
    s.totals
        .total_auctioned
        .iter()
        .all(|(sym, v)| sums.get(sym).copied().unwrap_or(0) == *v)
        && sums.iter().all(|(sym, v)| s.totals.total_auctioned(sym) == *v)
}

/// The vault holds every locked unit plus the fee pool, and the surplus
pub fn vault_solvent(s: &LedgerState) -> bool {
    let vault = s.vault();
    let collateral_ok = s.collaterals.iter().all(|(sym, asset)| {
        let owed = s.totals.total_collateral(sym).saturating_add(s.totals.fee_pool(sym));
        asset.token.balance_of(&vault) >= owed
    });
    collateral_ok && s.stablecoin.balance_of(&vault) >= s.totals.surplus
}

/// Every stablecoin in existence is either open debt or bad debt
pub fn stablecoin_backed(s: &LedgerState) -> bool {
    s.stablecoin.total_supply == s.totals.total_debt.saturating_add(s.totals.bad_debt)
}

/// Reservations never exceed their pools
pub fn reservations_bounded(s: &LedgerState) -> bool {
    s.totals.surplus_auctioned <= s.totals.surplus && s.totals.debt_auctioned <= s.totals.bad_debt
}

/// debt_auctioned and surplus_auctioned equal the slices of their open windows
pub fn protocol_windows_tracked(s: &LedgerState) -> bool {
    let offered = |book: &keel_auction::LotBook| {
        book.with_status(LotStatus::Auctioned)
            .fold(0u128, |acc, l| acc.saturating_add(l.sale_amount))
    };
    offered(&s.debt_lots) == s.totals.debt_auctioned && offered(&s.surplus_lots) == s.totals.surplus_auctioned
}

pub fn check(s: &LedgerState) -> Result<()> {
    let checks: [(fn(&LedgerState) -> bool, &'static str); 9] = [
        (debt_conserved, "debt conservation"),
        (collateral_conserved, "collateral conservation"),
        (empty_positions_debt_free, "empty position carries debt"),
        (lots_track_positions, "lot out of sync with position"),
        (auctioned_tracked, "auctioned total"),
        (vault_solvent, "vault solvency"),
        (stablecoin_backed, "stablecoin backing"),
        (reservations_bounded, "auction reservation"),
        (protocol_windows_tracked, "protocol lot windows"),
    ];
    for (holds, name) in checks {
        if !holds(s) {
            log::debug!("Error: invariant violated: {}", name);
            return Err(LedgerError::InvariantViolation(name));
        }
    }
    Ok(())
}
