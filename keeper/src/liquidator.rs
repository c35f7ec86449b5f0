//! One keeper pass: start, buy and cancel auctions across all three kinds

use crate::health::refresh_queue;
use crate::priority_queue::HealthQueue;
use crate::tx_builder;
use keel_auction::{Lot, LotStatus};
use keel_common::{mul_div, wad_div, wad_mul, Address, Context, Result};
use keel_oracle::Verifier;
use keel_router::{process_instruction, AuctionKind, Router};
use serde::Serialize;

const BPS: u128 = 10_000;

/// What one pass submitted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub started: usize,
    pub bought: usize,
    pub cancelled: usize,
    pub opened: usize,
    /// Debt or surplus lots reopened in place
    pub restarted: usize,
    pub failed: usize,
}

impl PassReport {
    pub fn actions(&self) -> usize {
        self.started + self.bought + self.cancelled + self.opened + self.restarted
    }
}

pub struct Keeper {
    pub address: Address,
    pub min_profit_bps: u64,
    pub max_actions: usize,
    queue: HealthQueue,
}

impl Keeper {
    pub fn new(address: Address, min_profit_bps: u64, max_actions: usize) -> Self {
        Self {
            address,
            min_profit_bps,
            max_actions,
            queue: HealthQueue::new(),
        }
    }

    pub fn queue(&self) -> &HealthQueue {
        &self.queue
    }

    pub fn run_pass<V: Verifier>(&mut self, router: &mut Router<V>, now: u64) -> PassReport {
        let mut report = PassReport::default();
        refresh_queue(&mut self.queue, router, now);

        self.start_liquidations(router, now, &mut report);
        self.work_lots(router, AuctionKind::Collateral, now, &mut report);
        self.open_protocol_lots(router, now, &mut report);
        self.work_lots(router, AuctionKind::Debt, now, &mut report);
        self.work_lots(router, AuctionKind::Surplus, now, &mut report);

        if report.actions() > 0 || report.failed > 0 {
            log::info!(
                "Pass at {}: started={} bought={} cancelled={} opened={} restarted={} failed={}",
                now,
                report.started,
                report.bought,
                report.cancelled,
                report.opened,
                report.restarted,
                report.failed
            );
        }
        report
    }

    fn budget_left(&self, report: &PassReport) -> bool {
        report.actions() < self.max_actions
    }

    fn submit<V: Verifier>(&self, router: &mut Router<V>, now: u64, data: &[u8]) -> Result<()> {
        process_instruction(router, &Context::new(self.address, now), data)
    }

    fn start_liquidations<V: Verifier>(&mut self, router: &mut Router<V>, now: u64, report: &mut PassReport) {
        let threshold = router.state().collateral_auction.liquidate_threshold;
        let liquidatable = self.queue.get_liquidatable(threshold);
        if liquidatable.is_empty() {
            log::debug!("No lots need liquidation");
            return;
        }
        log::info!("Found {} lots needing liquidation", liquidatable.len());

        for health in liquidatable {
            if !self.budget_left(report) {
                break;
            }
            log::info!(
                "Liquidating lot {} of {} (ratio {})",
                health.lot,
                health.owner,
                keel_common::format_wad(health.ratio)
            );
            let data = tx_builder::build_start_auction(health.lot, health.sale_request());
            match self.submit(router, now, &data) {
                Ok(()) => {
                    report.started += 1;
                    self.queue.remove(&health.lot);
                }
                Err(e) => {
                    log::error!("Failed to start auction for lot {}: {}", health.lot, e);
                    report.failed += 1;
                }
            }
        }
    }

    /// Put unreserved bad debt and surplus up for auction, up to the per-lot
    /// cap: a New lot of that kind is reopened before a fresh one is opened
    fn open_protocol_lots<V: Verifier>(&mut self, router: &mut Router<V>, now: u64, report: &mut PassReport) {
        let state = router.state();
        let totals = &state.totals;
        let governance = state.params.governance_symbol.clone();

        let debt = lot_size(
            totals.bad_debt,
            totals.debt_auctioned,
            state.debt_auction.max_lot_amount_factor,
        );
        let surplus = lot_size(
            totals.surplus,
            totals.surplus_auctioned,
            state.surplus_auction.max_lot_amount_factor,
        );

        let mut requests = Vec::new();
        for (kind, available) in [(AuctionKind::Debt, debt), (AuctionKind::Surplus, surplus)] {
            if available == 0 {
                continue;
            }
            let idle = state.lots(kind).with_status(LotStatus::New).next();
            let request = match idle {
                Some(lot) => {
                    let amount = if lot.amount <= available { 0 } else { available };
                    (kind, true, tx_builder::build_restart(kind, lot.id, amount))
                }
                None if kind == AuctionKind::Debt => {
                    (kind, false, tx_builder::build_start_debt_auction(available, &governance))
                }
                None => (kind, false, tx_builder::build_start_surplus_auction(available, &governance)),
            };
            requests.push(request);
        }

        for (kind, restart, data) in requests {
            if !self.budget_left(report) {
                break;
            }
            match self.submit(router, now, &data) {
                Ok(()) if restart => report.restarted += 1,
                Ok(()) => report.opened += 1,
                Err(e) => {
                    log::error!("Failed to open {:?} lot: {}", kind, e);
                    report.failed += 1;
                }
            }
        }
    }

    fn work_lots<V: Verifier>(&mut self, router: &mut Router<V>, kind: AuctionKind, now: u64, report: &mut PassReport) {
        let lots: Vec<Lot> = router
            .state()
            .lots(kind)
            .with_status(LotStatus::Auctioned)
            .cloned()
            .collect();

        for lot in lots {
            if !self.budget_left(report) {
                break;
            }
            let data = if lot.is_expired(now) {
                tx_builder::build_cancel(kind, lot.id)
            } else {
                match self.bid(router, kind, &lot, now) {
                    Ok(Some(payment)) => tx_builder::build_buy(kind, lot.id, payment),
                    Ok(None) => continue,
                    Err(e) => {
                        log::debug!("Skipping {:?} lot {}: {}", kind, lot.id, e);
                        continue;
                    }
                }
            };
            match self.submit(router, now, &data) {
                Ok(()) if lot.is_expired(now) => report.cancelled += 1,
                Ok(()) => report.bought += 1,
                Err(e) => {
                    log::error!("Failed on {:?} lot {}: {}", kind, lot.id, e);
                    report.failed += 1;
                }
            }
        }
    }

    /// Payment to offer for `lot`, or `None` when the discount is too thin
    /// or the keeper cannot pay
    fn bid<V: Verifier>(&self, router: &Router<V>, kind: AuctionKind, lot: &Lot, now: u64) -> Result<Option<u128>> {
        let state = router.state();
        let cost = router.current_cost(kind, lot.id, now)?;

        // fair value in the payment token
        let (value, pay_with) = match kind {
            AuctionKind::Collateral => (
                wad_mul(lot.sale_amount, router.price(&lot.symbol, now)?)?,
                &state.params.stable_symbol,
            ),
            AuctionKind::Debt => (lot.sale_amount, &state.params.stable_symbol),
            AuctionKind::Surplus => (
                wad_div(lot.sale_amount, router.price(&lot.symbol, now)?)?,
                &state.params.governance_symbol,
            ),
        };

        if !is_profitable(cost, value, self.min_profit_bps)? {
            return Ok(None);
        }
        let balance = router.balance_of(pay_with, &self.address)?;
        if balance < cost {
            log::warn!(
                "Keeper {} short of {} for lot {}: has {}, needs {}",
                self.address,
                pay_with,
                lot.id,
                balance,
                cost
            );
            return Ok(None);
        }
        Ok(Some(cost))
    }
}

/// Unreserved amount, capped at `factor` of the total
fn lot_size(total: u128, reserved: u128, factor: u128) -> u128 {
    let cap = wad_mul(factor, total).unwrap_or(0);
    total.saturating_sub(reserved).min(cap)
}

/// `cost <= value * (1 - bps / 10_000)`
fn is_profitable(cost: u128, value: u128, min_profit_bps: u64) -> Result<bool> {
    let bps = (min_profit_bps as u128).min(BPS);
    let limit = mul_div(value, BPS - bps, BPS)?;
    Ok(cost <= limit)
}
