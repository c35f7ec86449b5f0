//! Router instruction decoding and dispatch
//!
//! Every instruction is `discriminator: u8` followed by a little-endian
//! payload. Symbols are length-prefixed (u8), addresses are 20 raw bytes.

use crate::instructions::RouterInstruction;
use crate::router::Router;
use crate::state::AuctionKind;
use keel_auction::{DutchParams, LotId};
use keel_common::{Context, InstructionReader, LedgerError, Result, Role};
use keel_oracle::Verifier;

/// Decode `instruction_data` and run it against `router`
pub fn process_instruction<V: Verifier>(
    router: &mut Router<V>,
    ctx: &Context,
    instruction_data: &[u8],
) -> Result<()> {
    if instruction_data.is_empty() {
        log::debug!("Error: Instruction data is empty");
        return Err(LedgerError::InvalidInstruction);
    }

    let discriminator = instruction_data[0];
    let instruction = match RouterInstruction::from_u8(discriminator) {
        Some(ix) => ix,
        None => {
            log::debug!("Error: Unknown instruction {}", discriminator);
            return Err(LedgerError::InvalidInstruction);
        }
    };
    log::debug!("Instruction: {:?}", instruction);

    let data = &instruction_data[1..];
    let mut reader = InstructionReader::new(data);

    match instruction {
        RouterInstruction::ProduceStablecoin => {
            let amount = reader.read_u128()?;
            let min_ratio = reader.read_u128()?;
            let symbol = reader.read_symbol()?;
            reader.finish()?;
            router.produce_stablecoin(ctx, amount, min_ratio, &symbol)?;
        }
        RouterInstruction::ClaimExtraDebt => {
            let lot = LotId(reader.read_u64()?);
            let symbol = reader.read_symbol()?;
            reader.finish()?;
            router.claim_extra_debt(ctx, lot, &symbol)?;
        }
        RouterInstruction::DisposeDebt => {
            let lot = LotId(reader.read_u64()?);
            let symbol = reader.read_symbol()?;
            let payment = reader.read_u128()?;
            reader.finish()?;
            router.dispose_debt(ctx, lot, &symbol, payment)?;
        }
        RouterInstruction::RemoveCollateral => {
            let lot = LotId(reader.read_u64()?);
            let amount = reader.read_u128()?;
            let symbol = reader.read_symbol()?;
            reader.finish()?;
            router.remove_collateral(ctx, lot, amount, &symbol)?;
        }
        RouterInstruction::StartAuction => {
            let lot = LotId(reader.read_u64()?);
            let amount = reader.read_u128()?;
            reader.finish()?;
            router.start_auction(ctx, lot, amount)?;
        }
        RouterInstruction::BuyLot | RouterInstruction::BuyDebtLot | RouterInstruction::BuySurplusLot => {
            let lot = LotId(reader.read_u64()?);
            let payment = reader.read_u128()?;
            reader.finish()?;
            match instruction {
                RouterInstruction::BuyLot => router.buy_lot(ctx, lot, payment).map(|_| ())?,
                RouterInstruction::BuyDebtLot => router.buy_debt_lot(ctx, lot, payment).map(|_| ())?,
                _ => router.buy_surplus_lot(ctx, lot, payment).map(|_| ())?,
            }
        }
        RouterInstruction::CancelAuction
        | RouterInstruction::CancelDebtLot
        | RouterInstruction::CancelSurplusLot => {
            let lot = LotId(reader.read_u64()?);
            reader.finish()?;
            match instruction {
                RouterInstruction::CancelAuction => router.cancel_auction(ctx, lot)?,
                RouterInstruction::CancelDebtLot => router.cancel_debt_lot(ctx, lot)?,
                _ => router.cancel_surplus_lot(ctx, lot)?,
            }
        }
        RouterInstruction::RestartDebtLot | RouterInstruction::RestartSurplusLot => {
            let lot = LotId(reader.read_u64()?);
            let amount = reader.read_u128()?;
            reader.finish()?;
            if instruction == RouterInstruction::RestartDebtLot {
                router.restart_debt_lot(ctx, lot, amount)?;
            } else {
                router.restart_surplus_lot(ctx, lot, amount)?;
            }
        }
        RouterInstruction::StartDebtAuction | RouterInstruction::StartSurplusAuction => {
            let amount = reader.read_u128()?;
            let symbol = reader.read_symbol()?;
            reader.finish()?;
            if instruction == RouterInstruction::StartDebtAuction {
                router.start_debt_auction(ctx, amount, &symbol)?;
            } else {
                router.start_surplus_auction(ctx, amount, &symbol)?;
            }
        }
        RouterInstruction::SetToken => {
            let enabled = reader.read_bool()?;
            let symbol = reader.read_symbol()?;
            reader.finish()?;
            router.set_token(ctx, enabled, &symbol)?;
        }
        RouterInstruction::SetFees => {
            let fee_rate = reader.read_u128()?;
            let share = reader.read_u128()?;
            let receiver = reader.read_address()?;
            reader.finish()?;
            router.set_fees(ctx, fee_rate, share, receiver)?;
        }
        RouterInstruction::SetAuctionParams => {
            let kind = read_kind(&mut reader)?;
            let params = DutchParams {
                auction_duration: reader.read_u64()?,
                upper_bound_cost: reader.read_u128()?,
                lower_bound_cost: reader.read_u128()?,
            };
            reader.finish()?;
            router.set_auction_params(ctx, kind, params)?;
        }
        RouterInstruction::SetLiquidateThreshold => {
            let threshold = reader.read_u128()?;
            reader.finish()?;
            router.set_liquidate_threshold(ctx, threshold)?;
        }
        RouterInstruction::SetMaxLotAmountFactor => {
            let kind = read_kind(&mut reader)?;
            let factor = reader.read_u128()?;
            reader.finish()?;
            router.set_max_lot_amount_factor(ctx, kind, factor)?;
        }
        RouterInstruction::Approve | RouterInstruction::Transfer | RouterInstruction::MintToken => {
            let symbol = reader.read_symbol()?;
            let account = reader.read_address()?;
            let amount = reader.read_u128()?;
            reader.finish()?;
            match instruction {
                RouterInstruction::Approve => router.approve(ctx, &symbol, &account, amount)?,
                RouterInstruction::Transfer => router.transfer(ctx, &symbol, &account, amount)?,
                _ => router.mint_token(ctx, &symbol, &account, amount)?,
            }
        }
        RouterInstruction::GrantRole | RouterInstruction::RevokeRole => {
            let role = read_role(&mut reader)?;
            let account = reader.read_address()?;
            reader.finish()?;
            if instruction == RouterInstruction::GrantRole {
                router.grant_role(ctx, role, account)?;
            } else {
                router.revoke_role(ctx, role, &account)?;
            }
        }
        RouterInstruction::GrantTokenRole => {
            let symbol = reader.read_symbol()?;
            let role = read_role(&mut reader)?;
            let account = reader.read_address()?;
            reader.finish()?;
            router.grant_token_role(ctx, &symbol, role, account)?;
        }
        RouterInstruction::Oracle => router.oracle_instruction(ctx, data)?,
    }
    Ok(())
}

fn read_kind(reader: &mut InstructionReader) -> Result<AuctionKind> {
    AuctionKind::from_u8(reader.read_u8()?).ok_or(LedgerError::InvalidInstruction)
}

fn read_role(reader: &mut InstructionReader) -> Result<Role> {
    Role::from_u8(reader.read_u8()?).ok_or(LedgerError::InvalidInstruction)
}
