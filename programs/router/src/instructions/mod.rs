/// Router instruction handlers

pub mod produce_stablecoin;
pub mod claim_extra_debt;
pub mod dispose_debt;
pub mod remove_collateral;
pub mod admin;
pub mod tokens;

pub use produce_stablecoin::*;
pub use claim_extra_debt::*;
pub use dispose_debt::*;
pub use remove_collateral::*;
pub use admin::*;
pub use tokens::*;

use crate::state::LedgerState;
use keel_auction::{Lot, LotId};
use keel_common::{Address, LedgerError, Result, Symbol};

/// Instruction discriminator
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterInstruction {
    /// Lock collateral and mint stablecoin
    ProduceStablecoin = 0,
    /// Mint the headroom a price rise created
    ClaimExtraDebt = 1,
    /// Repay the shortfall a price fall created
    DisposeDebt = 2,
    /// Burn proportional debt and withdraw collateral
    RemoveCollateral = 3,
    /// Open a collateral auction window on an unhealthy lot
    StartAuction = 4,
    BuyLot = 5,
    CancelAuction = 6,
    /// Sell governance tokens against bad debt
    StartDebtAuction = 7,
    BuyDebtLot = 8,
    CancelDebtLot = 9,
    /// Sell surplus stablecoin for governance tokens
    StartSurplusAuction = 10,
    BuySurplusLot = 11,
    CancelSurplusLot = 12,
    /// Register or toggle a collateral asset
    SetToken = 13,
    SetFees = 14,
    /// Duration and cost bounds of one auction kind
    SetAuctionParams = 15,
    SetLiquidateThreshold = 16,
    SetMaxLotAmountFactor = 17,
    /// Token allowance for the vault or another spender
    Approve = 18,
    Transfer = 19,
    /// Role-gated faucet on a token ledger
    MintToken = 20,
    GrantRole = 21,
    RevokeRole = 22,
    /// Nested oracle instruction
    Oracle = 23,
    /// Role on a token ledger (e.g. a collateral faucet)
    GrantTokenRole = 24,
    /// Reopen a New debt lot at a fresh price
    RestartDebtLot = 25,
    RestartSurplusLot = 26,
}

impl RouterInstruction {
    pub fn from_u8(value: u8) -> Option<Self> {
        use RouterInstruction::*;
        let ix = match value {
            0 => ProduceStablecoin,
            1 => ClaimExtraDebt,
            2 => DisposeDebt,
            3 => RemoveCollateral,
            4 => StartAuction,
            5 => BuyLot,
            6 => CancelAuction,
            7 => StartDebtAuction,
            8 => BuyDebtLot,
            9 => CancelDebtLot,
            10 => StartSurplusAuction,
            11 => BuySurplusLot,
            12 => CancelSurplusLot,
            13 => SetToken,
            14 => SetFees,
            15 => SetAuctionParams,
            16 => SetLiquidateThreshold,
            17 => SetMaxLotAmountFactor,
            18 => Approve,
            19 => Transfer,
            20 => MintToken,
            21 => GrantRole,
            22 => RevokeRole,
            23 => Oracle,
            24 => GrantTokenRole,
            25 => RestartDebtLot,
            26 => RestartSurplusLot,
            _ => return None,
        };
        Some(ix)
    }
}

/// Collateral lot the caller owns, still New, quoted in `symbol`
pub(crate) fn owned_new_lot<'a>(
    state: &'a LedgerState,
    caller: &Address,
    lot_id: LotId,
    symbol: &Symbol,
) -> Result<&'a Lot> {
    let lot = state.collateral_lots.get(lot_id)?;
    if lot.symbol != *symbol {
        log::debug!("Error: lot {} is quoted in {}, not {}", lot_id, lot.symbol, symbol);
        return Err(LedgerError::SymbolMismatch);
    }
    if lot.owner != *caller {
        log::debug!("Error: {} does not own lot {}", caller, lot_id);
        return Err(LedgerError::NotOwner);
    }
    state.collateral_lots.require_new(lot_id)
}
