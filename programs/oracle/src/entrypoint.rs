//! Oracle instruction decoding and dispatch

use crate::instructions;
use crate::state::PriceOracle;
use crate::verifier::Verifier;
use keel_common::{Context, InstructionReader, LedgerError, Role};

/// Oracle instruction discriminators
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleInstruction {
    /// nonce: u64, price: u128, signature, symbol
    SetPrice = 0,
    /// enabled: bool, symbol
    UpdateToken = 1,
    /// seconds: u64
    SetValidTime = 2,
    /// role: u8, account: Address
    GrantRole = 3,
    /// role: u8, account: Address
    RevokeRole = 4,
}

impl OracleInstruction {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::SetPrice),
            1 => Some(Self::UpdateToken),
            2 => Some(Self::SetValidTime),
            3 => Some(Self::GrantRole),
            4 => Some(Self::RevokeRole),
            _ => None,
        }
    }
}

/// Process one oracle instruction
pub fn process_instruction<V: Verifier + ?Sized>(
    oracle: &mut PriceOracle,
    verifier: &V,
    ctx: &Context,
    instruction_data: &[u8],
) -> Result<(), LedgerError> {
    let mut reader = InstructionReader::new(instruction_data);
    let discriminator = reader.read_u8()?;
    let instruction = match OracleInstruction::from_u8(discriminator) {
        Some(ix) => ix,
        None => {
            log::debug!("Error: Unknown oracle instruction {}", discriminator);
            return Err(LedgerError::InvalidInstruction);
        }
    };
    log::debug!("Instruction: Oracle {:?}", instruction);

    match instruction {
        OracleInstruction::SetPrice => {
            let nonce = reader.read_u64()?;
            let price = reader.read_u128()?;
            let signature = reader.read_signature()?;
            let symbol = reader.read_symbol()?;
            reader.finish()?;
            instructions::process_set_price(oracle, verifier, ctx, nonce, price, &signature, &symbol)
        }
        OracleInstruction::UpdateToken => {
            let enabled = reader.read_bool()?;
            let symbol = reader.read_symbol()?;
            reader.finish()?;
            instructions::process_update_token(oracle, ctx, enabled, &symbol)
        }
        OracleInstruction::SetValidTime => {
            let seconds = reader.read_u64()?;
            reader.finish()?;
            instructions::process_set_valid_time(oracle, ctx, seconds)
        }
        OracleInstruction::GrantRole | OracleInstruction::RevokeRole => {
            let role = Role::from_u8(reader.read_u8()?).ok_or(LedgerError::InvalidInstruction)?;
            let account = reader.read_address()?;
            reader.finish()?;
            if instruction == OracleInstruction::GrantRole {
                oracle.access.grant_role(&ctx.caller, role, account)
            } else {
                oracle.access.revoke_role(&ctx.caller, role, &account)
            }
        }
    }
}
