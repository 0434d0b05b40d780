use crate::LoadError;

/// A property value decoded from its big-endian wire form.
///
/// The hand-off metadata historically stored addresses as a single
/// 32-bit cell and was widened to a two-cell form once addresses at or
/// above 4 GiB appeared. Nothing in a blob marks which form a property
/// uses; the choice is made per call site, either from context or from
/// the property's byte length via [`CellValue::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellValue {
    /// One 32-bit cell (legacy encoding).
    Single(u32),
    /// Two 32-bit cells composed high word first.
    Pair(u64),
}

impl CellValue {
    /// Decodes a property, selecting the encoding by byte length:
    /// 4 bytes is a single cell, 8 or more a cell pair.
    pub fn parse(raw: &[u8]) -> Result<CellValue, LoadError> {
        match raw.len() {
            4 => Ok(CellValue::Single(be32(raw))),
            n if n >= 8 => Ok(CellValue::Pair(read_cell_pair(raw)?)),
            _ => Err(LoadError::Encoding),
        }
    }

    /// The decoded value widened to the native width.
    pub fn value(self) -> u64 {
        match self {
            CellValue::Single(value) => value as u64,
            CellValue::Pair(value) => value,
        }
    }
}

fn be32(raw: &[u8]) -> u32 {
    u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]])
}

/// Reads a property that must be exactly one legacy cell.
pub fn read_cell(raw: &[u8]) -> Result<u32, LoadError> {
    if raw.len() != 4 {
        return Err(LoadError::Encoding);
    }

    Ok(be32(raw))
}

/// Reads a cell pair composed into a 64-bit value, high word first.
pub fn read_cell_pair(raw: &[u8]) -> Result<u64, LoadError> {
    if raw.len() < 8 {
        return Err(LoadError::Encoding);
    }

    let high = be32(&raw[0..4]) as u64;
    let low = be32(&raw[4..8]) as u64;
    Ok(high << 32 | low)
}

/// Encodes a native value as a cell pair, high word first.
pub fn encode_cell_pair(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Encodes a native value as a single legacy cell.
///
/// The legacy encoding cannot express more than 32 bits; the value is
/// truncated to its low word.
pub fn encode_cell(value: u64) -> [u8; 4] {
    (value as u32).to_be_bytes()
}
