//! Keel router: the CDP ledger and its liquidation market
//!
//! ## Instructions
//!
//! - **ProduceStablecoin** (0), **ClaimExtraDebt** (1), **DisposeDebt** (2),
//!   **RemoveCollateral** (3): position lifecycle
//! - **StartAuction** (4), **BuyLot** (5), **CancelAuction** (6): collateral auction
//! - **StartDebtAuction** (7) .. **CancelDebtLot** (9): debt auction
//! - **StartSurplusAuction** (10) .. **CancelSurplusLot** (12): surplus auction
//! - **SetToken** (13) .. **SetMaxLotAmountFactor** (17): admin configuration
//! - **Approve** (18), **Transfer** (19), **MintToken** (20), **GrantTokenRole** (24): token pass-through
//! - **GrantRole** (21), **RevokeRole** (22): router roles
//! - **Oracle** (23): nested oracle instruction
//! - **RestartDebtLot** (25), **RestartSurplusLot** (26): reopen a New protocol lot

pub mod state;
pub mod instructions;
pub mod liquidation;
pub mod invariants;
pub mod router;
pub mod views;
pub mod entrypoint;

#[cfg(test)]
pub(crate) mod testing;

pub use state::*;
pub use instructions::*;
pub use liquidation::*;
pub use router::Router;
pub use entrypoint::process_instruction;
