//! Lot arena with an owner index
//!
//! Lots live in an ordered map keyed by [`LotId`]; identifiers are never
//! reused. A secondary index maps `(owner, symbol)` to the lots opened for it,
//! in creation order.

use crate::lot::{Lot, LotId, LotStatus};
use crate::pricing::DutchParams;
use keel_common::{checked_add, checked_sub, Address, LedgerError, Result, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotBook {
    lots: BTreeMap<LotId, Lot>,
    next_id: u64,
    by_owner: BTreeMap<(Address, Symbol), Vec<LotId>>,
}

impl LotBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    /// Register a New lot and return its identifier
    pub fn open(&mut self, owner: Address, symbol: Symbol, amount: u128) -> LotId {
        self.next_id += 1;
        let id = LotId(self.next_id);
        self.by_owner
            .entry((owner, symbol.clone()))
            .or_default()
            .push(id);
        self.lots.insert(id, Lot::new(id, owner, symbol, amount));
        log::debug!("Auction: opened lot {} for {}", id, owner);
        id
    }

    pub fn get(&self, id: LotId) -> Result<&Lot> {
        self.lots.get(&id).ok_or(LedgerError::LotNotFound)
    }

    pub fn get_mut(&mut self, id: LotId) -> Result<&mut Lot> {
        self.lots.get_mut(&id).ok_or(LedgerError::LotNotFound)
    }

    /// Status of `id`, `Unknown` when absent
    pub fn status(&self, id: LotId) -> LotStatus {
        self.lots.get(&id).map(|l| l.status).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lot> {
        self.lots.values()
    }

    /// Lot that must be New for the caller to proceed
    pub fn require_new(&self, id: LotId) -> Result<&Lot> {
        let lot = self.get(id)?;
        if lot.status != LotStatus::New {
            log::debug!("Error: lot {} status {:?} is not New", id, lot.status);
            return Err(LedgerError::StatusNotNew);
        }
        Ok(lot)
    }

    /// Lot currently inside an auction window
    pub fn require_auctioned(&self, id: LotId) -> Result<&Lot> {
        let lot = self.get(id)?;
        if lot.status != LotStatus::Auctioned {
            log::debug!("Error: lot {} is not auctioned", id);
            return Err(LedgerError::LotNotAuctioned);
        }
        Ok(lot)
    }

    /// Lot that can be bought at `now`
    pub fn require_open(&self, id: LotId, now: u64) -> Result<&Lot> {
        let lot = self.require_auctioned(id)?;
        if now > lot.end_time {
            log::debug!("Error: lot {} window closed at {}", id, lot.end_time);
            return Err(LedgerError::AuctionTimeOver);
        }
        Ok(lot)
    }

    /// Move a New lot into an auction window
    ///
    /// `sale_amount == 0` offers the whole lot. Returns the amount offered.
    pub fn start(
        &mut self,
        id: LotId,
        sale_amount: u128,
        end_price: u128,
        now: u64,
        params: &DutchParams,
    ) -> Result<u128> {
        let lot = self.require_new(id)?;
        if sale_amount > lot.amount {
            log::debug!("Error: sale {} exceeds lot amount {}", sale_amount, lot.amount);
            return Err(LedgerError::AmountExceedsLot);
        }
        let sale_amount = if sale_amount == 0 { lot.amount } else { sale_amount };
        if sale_amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let end_time = now
            .checked_add(params.auction_duration)
            .ok_or(LedgerError::Overflow)?;

        let lot = self.get_mut(id)?;
        lot.sale_amount = sale_amount;
        lot.end_price = end_price;
        lot.start_time = now;
        lot.end_time = end_time;
        lot.status = LotStatus::Auctioned;

        log::info!(
            "Auction: lot {} started, sale {} at {} until {}",
            id,
            sale_amount,
            end_price,
            end_time
        );
        Ok(sale_amount)
    }

    /// Close the window after a sale of the offered amount
    ///
    /// The lot becomes Liquidated once empty, otherwise New again.
    pub fn settle(&mut self, id: LotId) -> Result<LotStatus> {
        let lot = self.get_mut(id)?;
        if lot.status != LotStatus::Auctioned {
            return Err(LedgerError::LotNotAuctioned);
        }
        lot.amount = checked_sub(lot.amount, lot.sale_amount)?;
        lot.clear_window();
        lot.status = if lot.amount == 0 {
            LotStatus::Liquidated
        } else {
            LotStatus::New
        };
        log::info!("Auction: lot {} settled, now {:?}", id, lot.status);
        Ok(lot.status)
    }

    /// Reset an expired, unsold lot to New. Returns the amount that was offered.
    pub fn cancel(&mut self, id: LotId, now: u64) -> Result<u128> {
        let lot = self.require_auctioned(id)?;
        if now <= lot.end_time {
            log::debug!("Error: lot {} still open until {}", id, lot.end_time);
            return Err(LedgerError::AuctionNotExpired);
        }
        let lot = self.get_mut(id)?;
        let released = lot.sale_amount;
        lot.clear_window();
        lot.status = LotStatus::New;
        log::info!("Auction: lot {} cancelled", id);
        Ok(released)
    }

    /// Retire a New lot without a sale
    pub fn close(&mut self, id: LotId) -> Result<()> {
        self.require_new(id)?;
        let lot = self.get_mut(id)?;
        lot.amount = 0;
        lot.status = LotStatus::Closed;
        Ok(())
    }

    /// Grow a New lot (collateral top-up)
    pub fn increase(&mut self, id: LotId, amount: u128) -> Result<()> {
        self.require_new(id)?;
        let lot = self.get_mut(id)?;
        lot.amount = checked_add(lot.amount, amount)?;
        Ok(())
    }

    /// Shrink a New lot (collateral withdrawal)
    pub fn decrease(&mut self, id: LotId, amount: u128) -> Result<()> {
        let lot = self.require_new(id)?;
        if amount > lot.amount {
            return Err(LedgerError::AmountExceedsLot);
        }
        let lot = self.get_mut(id)?;
        lot.amount -= amount;
        Ok(())
    }

    /// Lots opened for `(owner, symbol)`, paginated in creation order
    pub fn user_lots(&self, owner: &Address, symbol: &Symbol, offset: usize, limit: usize) -> Vec<&Lot> {
        self.by_owner
            .get(&(*owner, symbol.clone()))
            .map(|ids| {
                ids.iter()
                    .skip(offset)
                    .take(limit)
                    .filter_map(|id| self.lots.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Sum of amounts currently offered for `(owner, symbol)`
    pub fn auctioned_amount(&self, owner: &Address, symbol: &Symbol) -> u128 {
        self.user_lots(owner, symbol, 0, usize::MAX)
            .into_iter()
            .filter(|l| l.status == LotStatus::Auctioned)
            .fold(0u128, |acc, l| acc.saturating_add(l.sale_amount))
    }

    pub fn with_status(&self, status: LotStatus) -> impl Iterator<Item = &Lot> {
        self.lots.values().filter(move |l| l.status == status)
    }
}
