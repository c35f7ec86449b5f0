//! Shared Dutch-auction engine
//!
//! Collateral, debt and surplus auctions all sell a [`Lot`] whose cost decays
//! linearly from `upper_bound_cost` to `lower_bound_cost` (both WAD factors of
//! a kind-specific base) over `auction_duration`. This crate owns the decay
//! math and the lot state machine; the router supplies the trigger and
//! settlement rules of each kind.
//!
//! ```text
//! New ──start──▶ Auctioned ──buy (lot emptied)──▶ Liquidated
//!  ▲                │  │
//!  └──cancel/partial┘  └── (expired, unsold) cancel ──▶ New
//! New ──close──▶ Closed
//! ```

pub mod pricing;
pub mod lot;
pub mod book;

pub use pricing::*;
pub use lot::*;
pub use book::*;
