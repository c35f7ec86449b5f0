//! Error taxonomy shared by every Keel program
//!
//! Each rejected operation maps to exactly one variant so callers can assert on
//! the cause. Variants are grouped by [`ErrorKind`].

use thiserror::Error;

/// Broad class of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range input
    Validation,
    /// Operation attempted from the wrong lot/position status
    State,
    /// Stale price or auction window violations
    Temporal,
    /// Ratio, payment or capacity violations
    Economic,
    /// Missing role, bad signature, wrong owner
    Authorization,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // Validation
    #[error("zero address")]
    ZeroAddress,
    #[error("invalid amount")]
    InvalidAmount,
    #[error("invalid ratio")]
    InvalidRatio,
    #[error("invalid duration")]
    InvalidDuration,
    #[error("invalid cost bounds")]
    InvalidBounds,
    #[error("invalid fee parameters")]
    InvalidFee,
    #[error("invalid instruction data")]
    InvalidInstruction,
    #[error("unknown token {0}")]
    UnknownToken(String),
    #[error("lot not found")]
    LotNotFound,
    #[error("position not found")]
    PositionNotFound,
    #[error("symbol does not match lot")]
    SymbolMismatch,

    // State machine
    #[error("lot status is not New")]
    StatusNotNew,
    #[error("lot is not auctioned")]
    LotNotAuctioned,

    // Temporal
    #[error("token is disabled")]
    DisabledToken,
    #[error("price is stale")]
    StalePrice,
    #[error("price has never been set")]
    PriceNotSet,
    #[error("auction time is over")]
    AuctionTimeOver,
    #[error("auction has not expired")]
    AuctionNotExpired,

    // Economic
    #[error("min ratio must exceed the liquidation threshold")]
    RatioBelowThreshold,
    #[error("lot is not for sale")]
    LotNotForSale,
    #[error("amount exceeds lot")]
    AmountExceedsLot,
    #[error("amount exceeds what is needed to restore health")]
    ExceedsRequiredAmount,
    #[error("amount exceeds collateral")]
    AmountExceedsCollateral,
    #[error("insufficient amount paid")]
    InsufficientAmount,
    #[error("insufficient value for repayment")]
    InsufficientValue,
    #[error("insufficient balance")]
    InsufficientBalance,
    #[error("insufficient allowance")]
    InsufficientAllowance,
    #[error("price has not risen")]
    PriceNotRisen,
    #[error("price has not fallen")]
    PriceNotFallen,
    #[error("nothing to claim")]
    NothingToClaim,
    #[error("nothing to dispose")]
    NothingToDispose,
    #[error("amount exceeds available bad debt")]
    ExceedsAvailableDebt,
    #[error("amount exceeds available surplus")]
    ExceedsAvailableSurplus,
    #[error("amount exceeds lot cap")]
    ExceedsLotCap,
    #[error("arithmetic overflow")]
    Overflow,
    #[error("division by zero")]
    DivisionByZero,
    #[error("ledger invariant violated: {0}")]
    InvariantViolation(&'static str),

    // Authorization
    #[error("missing role")]
    MissingRole,
    #[error("stale nonce")]
    StaleNonce,
    #[error("bad signature")]
    BadSignature,
    #[error("caller is not the position owner")]
    NotOwner,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        use LedgerError::*;
        match self {
            ZeroAddress | InvalidAmount | InvalidRatio | InvalidDuration | InvalidBounds
            | InvalidFee | InvalidInstruction | UnknownToken(_) | LotNotFound
            | PositionNotFound | SymbolMismatch | DisabledToken => ErrorKind::Validation,
            StatusNotNew | LotNotAuctioned => ErrorKind::State,
            StalePrice | PriceNotSet | AuctionTimeOver | AuctionNotExpired => ErrorKind::Temporal,
            RatioBelowThreshold | LotNotForSale | AmountExceedsLot | ExceedsRequiredAmount
            | AmountExceedsCollateral | InsufficientAmount | InsufficientValue
            | InsufficientBalance | InsufficientAllowance | PriceNotRisen | PriceNotFallen
            | NothingToClaim | NothingToDispose | ExceedsAvailableDebt
            | ExceedsAvailableSurplus | ExceedsLotCap | Overflow | DivisionByZero
            | InvariantViolation(_) => ErrorKind::Economic,
            MissingRole | StaleNonce | BadSignature | NotOwner => ErrorKind::Authorization,
        }
    }
}

pub type Result<T, E = LedgerError> = core::result::Result<T, E>;
