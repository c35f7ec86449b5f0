//! Health scan over the router's positions

use crate::priority_queue::{HealthQueue, LotHealth};
use keel_auction::LotStatus;
use keel_oracle::Verifier;
use keel_router::{AuctionKind, Router};

/// Snapshot every debt-bearing lot whose collateral has a fresh price
///
/// Positions priced by a stale or missing feed are skipped; the router
/// would reject any action on them anyway.
pub fn scan_positions<V: Verifier>(router: &Router<V>, now: u64) -> Vec<LotHealth> {
    router
        .positions()
        .filter(|p| p.debt > 0)
        .filter_map(|p| {
            let lot = p.lot?;
            let health = match router.position_health(&p.owner, &p.symbol, now) {
                Ok(h) => h,
                Err(e) => {
                    log::debug!("Skipping lot {} ({}): {}", lot, p.symbol, e);
                    return None;
                }
            };
            Some(LotHealth {
                lot,
                owner: p.owner,
                symbol: p.symbol.clone(),
                ratio: health.ratio?,
                max_sale: health.max_sale,
                collateral: p.collateral,
                last_update: now,
            })
        })
        .collect()
}

/// Rebuild the queue from a fresh scan, keeping only lots that can still be
/// put up for auction
pub fn refresh_queue<V: Verifier>(queue: &mut HealthQueue, router: &Router<V>, now: u64) -> usize {
    queue.clear();
    for health in scan_positions(router, now) {
        if router.lot_status(AuctionKind::Collateral, health.lot) == LotStatus::New {
            queue.push(health);
        }
    }
    queue.len()
}
