//! Instruction builders for keeper submissions
//!
//! Produces raw router instruction bytes; the simulation feeds them through
//! `keel_router::process_instruction` exactly as an external client would.

use keel_auction::LotId;
use keel_common::{Address, InstructionWriter, Signature, Symbol};
use keel_oracle::OracleInstruction;
use keel_router::{AuctionKind, RouterInstruction};

/// Start a collateral auction; `amount == 0` puts the whole lot up
pub fn build_start_auction(lot: LotId, amount: u128) -> Vec<u8> {
    InstructionWriter::new(RouterInstruction::StartAuction as u8)
        .u64(lot.0)
        .u128(amount)
        .build()
}

/// Buy an auctioned lot of any kind, offering at most `payment`
pub fn build_buy(kind: AuctionKind, lot: LotId, payment: u128) -> Vec<u8> {
    let discriminator = match kind {
        AuctionKind::Collateral => RouterInstruction::BuyLot,
        AuctionKind::Debt => RouterInstruction::BuyDebtLot,
        AuctionKind::Surplus => RouterInstruction::BuySurplusLot,
    };
    InstructionWriter::new(discriminator as u8)
        .u64(lot.0)
        .u128(payment)
        .build()
}

/// Cancel an expired lot of any kind
pub fn build_cancel(kind: AuctionKind, lot: LotId) -> Vec<u8> {
    let discriminator = match kind {
        AuctionKind::Collateral => RouterInstruction::CancelAuction,
        AuctionKind::Debt => RouterInstruction::CancelDebtLot,
        AuctionKind::Surplus => RouterInstruction::CancelSurplusLot,
    };
    InstructionWriter::new(discriminator as u8).u64(lot.0).build()
}

/// Reopen a New lot; `amount == 0` offers all of it
pub fn build_restart(kind: AuctionKind, lot: LotId, amount: u128) -> Vec<u8> {
    let discriminator = match kind {
        AuctionKind::Collateral => RouterInstruction::StartAuction,
        AuctionKind::Debt => RouterInstruction::RestartDebtLot,
        AuctionKind::Surplus => RouterInstruction::RestartSurplusLot,
    };
    InstructionWriter::new(discriminator as u8)
        .u64(lot.0)
        .u128(amount)
        .build()
}

pub fn build_start_debt_auction(amount: u128, symbol: &Symbol) -> Vec<u8> {
    InstructionWriter::new(RouterInstruction::StartDebtAuction as u8)
        .u128(amount)
        .symbol(symbol)
        .build()
}

pub fn build_start_surplus_auction(amount: u128, symbol: &Symbol) -> Vec<u8> {
    InstructionWriter::new(RouterInstruction::StartSurplusAuction as u8)
        .u128(amount)
        .symbol(symbol)
        .build()
}

pub fn build_produce_stablecoin(amount: u128, min_ratio: u128, symbol: &Symbol) -> Vec<u8> {
    InstructionWriter::new(RouterInstruction::ProduceStablecoin as u8)
        .u128(amount)
        .u128(min_ratio)
        .symbol(symbol)
        .build()
}

pub fn build_approve(symbol: &Symbol, spender: &Address, amount: u128) -> Vec<u8> {
    InstructionWriter::new(RouterInstruction::Approve as u8)
        .symbol(symbol)
        .address(spender)
        .u128(amount)
        .build()
}

/// Signed price update wrapped in the router's oracle passthrough
pub fn build_set_price(nonce: u64, price: u128, signature: &Signature, symbol: &Symbol) -> Vec<u8> {
    let inner = InstructionWriter::new(OracleInstruction::SetPrice as u8)
        .u64(nonce)
        .u128(price)
        .signature(signature)
        .symbol(symbol)
        .build();
    InstructionWriter::new(RouterInstruction::Oracle as u8)
        .raw(&inner)
        .build()
}
