//! Priority queue for tracking lot health (min-heap by collateral ratio)

use keel_auction::LotId;
use keel_common::{Address, Symbol};
use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Lot health snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotHealth {
    pub lot: LotId,
    pub owner: Address,
    pub symbol: Symbol,
    /// Collateral ratio, WAD
    pub ratio: u128,
    /// Collateral the auction accepts for sale, 0 while healthy
    pub max_sale: u128,
    /// Collateral currently in the lot
    pub collateral: u128,
    /// Ledger time of the snapshot
    pub last_update: u64,
}

impl LotHealth {
    /// Check if lot can be put up for auction
    pub fn needs_liquidation(&self, threshold: u128) -> bool {
        self.ratio <= threshold
    }

    /// Amount argument for `StartAuction`; 0 sells the whole lot
    pub fn sale_request(&self) -> u128 {
        if self.max_sale >= self.collateral {
            0
        } else {
            self.max_sale
        }
    }
}

/// Health-based priority queue (min-heap: lowest ratio first)
pub struct HealthQueue {
    queue: PriorityQueue<LotId, Reverse<u128>>,
    map: HashMap<LotId, LotHealth>,
}

impl HealthQueue {
    pub fn new() -> Self {
        Self {
            queue: PriorityQueue::new(),
            map: HashMap::new(),
        }
    }

    /// Push or update lot health
    pub fn push(&mut self, health: LotHealth) {
        let lot = health.lot;
        let ratio = health.ratio;
        self.map.insert(lot, health);
        self.queue.push(lot, Reverse(ratio));
    }

    /// Pop lot with lowest ratio
    pub fn pop(&mut self) -> Option<LotHealth> {
        let (lot, _priority) = self.queue.pop()?;
        self.map.remove(&lot)
    }

    pub fn peek(&self) -> Option<&LotHealth> {
        let (lot, _priority) = self.queue.peek()?;
        self.map.get(lot)
    }

    pub fn remove(&mut self, lot: &LotId) -> Option<LotHealth> {
        self.queue.remove(lot);
        self.map.remove(lot)
    }

    pub fn get(&self, lot: &LotId) -> Option<&LotHealth> {
        self.map.get(lot)
    }

    pub fn contains(&self, lot: &LotId) -> bool {
        self.map.contains_key(lot)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Lots at or below the threshold, lowest ratio first
    pub fn get_liquidatable(&self, threshold: u128) -> Vec<LotHealth> {
        let mut lots: Vec<LotHealth> = self
            .map
            .values()
            .filter(|h| h.needs_liquidation(threshold))
            .cloned()
            .collect();
        lots.sort_by_key(|h| (h.ratio, h.lot));
        lots
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.map.clear();
    }
}

impl Default for HealthQueue {
    fn default() -> Self {
        Self::new()
    }
}
