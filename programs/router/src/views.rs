//! Read-only views

use crate::liquidation::{assess, collateral_lot_cost, debt_lot_cost, surplus_lot_cost, PositionHealth};
use crate::router::Router;
use crate::state::{Aggregates, AuctionKind, Position};
use keel_auction::{Lot, LotId, LotStatus};
use keel_common::{Address, FungibleAsset, Result, Symbol};
use keel_oracle::Verifier;

impl<V: Verifier> Router<V> {
    /// Position of `owner` in `symbol`; an all-zero record if none exists
    pub fn collaterals(&self, symbol: &Symbol, owner: &Address) -> Position {
        self.state()
            .position(owner, symbol)
            .cloned()
            .unwrap_or_else(|| Position::new(*owner, symbol.clone()))
    }

    /// Collateral lots of `owner` in `symbol`, in creation order
    pub fn get_user_lots(&self, owner: &Address, offset: usize, limit: usize, symbol: &Symbol) -> Vec<Lot> {
        self.state()
            .collateral_lots
            .user_lots(owner, symbol, offset, limit)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn total_collateral(&self, symbol: &Symbol) -> u128 {
        self.state().totals.total_collateral(symbol)
    }

    pub fn total_debt(&self) -> u128 {
        self.state().totals.total_debt
    }

    pub fn surplus(&self) -> u128 {
        self.state().totals.surplus
    }

    pub fn bad_debt(&self) -> u128 {
        self.state().totals.bad_debt
    }

    pub fn aggregates(&self) -> &Aggregates {
        &self.state().totals
    }

    pub fn lots(&self, kind: AuctionKind, lot_id: LotId) -> Option<&Lot> {
        self.state().lots(kind).get(lot_id).ok()
    }

    pub fn lot_status(&self, kind: AuctionKind, lot_id: LotId) -> LotStatus {
        self.state().lots(kind).status(lot_id)
    }

    /// Current cost of an auctioned lot: stablecoin for collateral and debt
    /// lots, governance tokens for surplus lots
    pub fn current_cost(&self, kind: AuctionKind, lot_id: LotId, now: u64) -> Result<u128> {
        match kind {
            AuctionKind::Collateral => collateral_lot_cost(self.state(), lot_id, now),
            AuctionKind::Debt => debt_lot_cost(self.state(), lot_id, now),
            AuctionKind::Surplus => surplus_lot_cost(self.state(), lot_id, now),
        }
    }

    pub fn position_health(&self, owner: &Address, symbol: &Symbol, now: u64) -> Result<PositionHealth> {
        let price = self.state().price(symbol, now)?;
        assess(
            &self.collaterals(symbol, owner),
            price,
            self.state().collateral_auction.liquidate_threshold,
        )
    }

    pub fn price(&self, symbol: &Symbol, now: u64) -> Result<u128> {
        self.state().price(symbol, now)
    }

    pub fn balance_of(&self, symbol: &Symbol, account: &Address) -> Result<u128> {
        Ok(self.state().token(symbol)?.balance_of(account))
    }

    /// Every position, for keepers scanning for unhealthy lots
    pub fn positions(&self) -> impl Iterator<Item = &Position> {
        self.state().positions.values()
    }
}
