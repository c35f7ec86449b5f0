//! Instruction data codec
//!
//! Little-endian, fixed-width fields. Symbols are length-prefixed (u8) UTF-8.
//! Readers bounds-check every access and return `InvalidInstruction` on short
//! or malformed input; [`InstructionWriter`] produces the matching layout.

use crate::error::LedgerError;
use crate::types::{Address, Signature, Symbol};

/// Read a u8 from instruction data
#[inline]
pub fn read_u8(data: &[u8], offset: usize) -> Result<u8, LedgerError> {
    if offset >= data.len() {
        return Err(LedgerError::InvalidInstruction);
    }
    Ok(data[offset])
}

/// Read a u64 (little-endian) from instruction data
#[inline]
pub fn read_u64(data: &[u8], offset: usize) -> Result<u64, LedgerError> {
    Ok(u64::from_le_bytes(read_bytes::<8>(data, offset)?))
}

/// Read a u128 (little-endian) from instruction data
#[inline]
pub fn read_u128(data: &[u8], offset: usize) -> Result<u128, LedgerError> {
    Ok(u128::from_le_bytes(read_bytes::<16>(data, offset)?))
}

/// Read a fixed-size byte array from instruction data
#[inline]
pub fn read_bytes<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N], LedgerError> {
    let end = offset.checked_add(N).ok_or(LedgerError::InvalidInstruction)?;
    if end > data.len() {
        return Err(LedgerError::InvalidInstruction);
    }
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(&data[offset..end]);
    Ok(bytes)
}

/// Instruction data reader with tracked offset
pub struct InstructionReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> InstructionReader<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// Unread tail of the data (used to forward nested instructions)
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.offset.min(self.data.len())..]
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, LedgerError> {
        let val = read_u8(self.data, self.offset)?;
        self.offset += 1;
        Ok(val)
    }

    #[inline]
    pub fn read_bool(&mut self) -> Result<bool, LedgerError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(LedgerError::InvalidInstruction),
        }
    }

    #[inline]
    pub fn read_u64(&mut self) -> Result<u64, LedgerError> {
        let val = read_u64(self.data, self.offset)?;
        self.offset += 8;
        Ok(val)
    }

    #[inline]
    pub fn read_u128(&mut self) -> Result<u128, LedgerError> {
        let val = read_u128(self.data, self.offset)?;
        self.offset += 16;
        Ok(val)
    }

    #[inline]
    pub fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N], LedgerError> {
        let val = read_bytes(self.data, self.offset)?;
        self.offset += N;
        Ok(val)
    }

    pub fn read_address(&mut self) -> Result<Address, LedgerError> {
        Ok(Address(self.read_bytes::<20>()?))
    }

    pub fn read_symbol(&mut self) -> Result<Symbol, LedgerError> {
        let len = self.read_u8()? as usize;
        if len == 0 || len > Symbol::MAX_LEN || len > self.remaining() {
            return Err(LedgerError::InvalidInstruction);
        }
        let bytes = &self.data[self.offset..self.offset + len];
        let text = core::str::from_utf8(bytes).map_err(|_| LedgerError::InvalidInstruction)?;
        self.offset += len;
        Ok(Symbol::from(text))
    }

    pub fn read_signature(&mut self) -> Result<Signature, LedgerError> {
        let v = self.read_u8()?;
        let r = self.read_bytes::<32>()?;
        let s = self.read_bytes::<32>()?;
        Ok(Signature { v, r, s })
    }

    /// Fail unless every byte was consumed
    pub fn finish(&self) -> Result<(), LedgerError> {
        if self.remaining() != 0 {
            return Err(LedgerError::InvalidInstruction);
        }
        Ok(())
    }
}

/// Builder for instruction data in the layout [`InstructionReader`] expects
#[derive(Debug, Default, Clone)]
pub struct InstructionWriter {
    data: Vec<u8>,
}

impl InstructionWriter {
    pub fn new(discriminator: u8) -> Self {
        Self {
            data: vec![discriminator],
        }
    }

    pub fn u8(mut self, value: u8) -> Self {
        self.data.push(value);
        self
    }

    pub fn bool(self, value: bool) -> Self {
        self.u8(value as u8)
    }

    pub fn u64(mut self, value: u64) -> Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn u128(mut self, value: u128) -> Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn address(mut self, value: &Address) -> Self {
        self.data.extend_from_slice(value.as_bytes());
        self
    }

    /// The real length is written, so a symbol longer than [`Symbol::MAX_LEN`]
    /// fails to decode instead of arriving as a different, truncated symbol
    pub fn symbol(mut self, value: &Symbol) -> Self {
        let bytes = value.as_bytes();
        let len = bytes.len().min(u8::MAX as usize);
        self.data.push(len as u8);
        self.data.extend_from_slice(&bytes[..len]);
        self
    }

    pub fn signature(mut self, value: &Signature) -> Self {
        self.data.push(value.v);
        self.data.extend_from_slice(&value.r);
        self.data.extend_from_slice(&value.s);
        self
    }

    /// Append pre-encoded bytes (nested instruction)
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}
