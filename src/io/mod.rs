//! Binary codec for the chain's wire format
//!
//! This module provides:
//! - VarInt / VarBytes reading and writing (little-endian, 1/3/5/9 byte forms)
//! - Fixed-width little-endian primitives
//! - Script-style push lengths (`OP_PUSHBYTES1..75`, `OP_PUSHDATA1/2/4`)
//!
//! The two length schemes are kept in separate functions and never mixed.

pub mod reader;
pub mod writer;

pub use reader::BinaryReader;
pub use writer::{var_int_size, BinaryWriter};

use thiserror::Error;

/// Default upper bound for VarBytes lengths read off the wire
pub const MAX_VAR_BYTES: u64 = 0x7fff_ffc7;

/// Upper bound for element counts of serialized arrays
pub const MAX_ARRAY_LEN: u64 = 0x1000_0000;

/// Decode errors, carrying the byte offset where decoding failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Unexpected end of stream at offset {offset}: need {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("Value {value} at offset {offset} exceeds maximum {max}")]
    TooLarge { offset: usize, value: u64, max: u64 },
    #[error("Invalid UTF-8 string at offset {offset}")]
    InvalidUtf8 { offset: usize },
    #[error("{remaining} trailing bytes at offset {offset}")]
    TrailingBytes { offset: usize, remaining: usize },
    #[error("Unknown {kind} tag {tag:#04x} at offset {offset}")]
    UnknownTag {
        offset: usize,
        tag: u8,
        kind: &'static str,
    },
    #[error("Invalid data at offset {offset}: {reason}")]
    InvalidData { offset: usize, reason: String },
}

/// Types with a canonical binary encoding
pub trait Serializable: Sized {
    /// Append the encoding of `self` to the writer
    fn serialize(&self, writer: &mut BinaryWriter);

    /// Read one value from the reader
    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self, CodecError>;

    /// Encode into a fresh byte vector
    fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        self.serialize(&mut writer);
        writer.into_bytes()
    }

    /// Decode from a complete buffer, rejecting trailing bytes
    fn from_bytes(data: &[u8]) -> Result<Self, CodecError> {
        let mut reader = BinaryReader::new(data);
        let value = Self::deserialize(&mut reader)?;
        reader.ensure_consumed()?;
        Ok(value)
    }
}
