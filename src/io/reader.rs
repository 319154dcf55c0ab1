//! Binary reader
//!
//! Cursor over a borrowed byte slice. Every failure reports the offset at
//! which the offending item started.

use bytes::Buf;

use super::{CodecError, Serializable, MAX_ARRAY_LEN};
use crate::script::opcodes::OpCode;

/// Bounded cursor over a byte slice
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current offset from the start of the input
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Fail with `TrailingBytes` unless the whole input was consumed
    pub fn ensure_consumed(&self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(CodecError::TrailingBytes {
                offset: self.pos,
                remaining,
            }),
        }
    }

    /// Borrow the next `len` bytes and advance
    fn take(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < len {
            return Err(CodecError::Truncated {
                offset: self.pos,
                needed: len,
                available: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?.get_u8())
    }

    /// Any non-zero byte reads as `true`
    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        Ok(self.take(2)?.get_u16_le())
    }

    pub fn read_i16(&mut self) -> Result<i16, CodecError> {
        Ok(self.take(2)?.get_i16_le())
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(self.take(4)?.get_u32_le())
    }

    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        Ok(self.take(4)?.get_i32_le())
    }

    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        Ok(self.take(8)?.get_u64_le())
    }

    pub fn read_i64(&mut self) -> Result<i64, CodecError> {
        Ok(self.take(8)?.get_i64_le())
    }

    /// Read exactly `len` raw bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, CodecError> {
        Ok(self.take(len)?.to_vec())
    }

    /// Read a fixed-size array
    pub fn read_fixed<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Read a VarInt, rejecting values above `max` (unsigned comparison)
    pub fn read_var_int(&mut self, max: u64) -> Result<u64, CodecError> {
        let start = self.pos;
        let value = match self.read_u8()? {
            0xFD => u64::from(self.read_u16()?),
            0xFE => u64::from(self.read_u32()?),
            0xFF => self.read_u64()?,
            small => u64::from(small),
        };
        if value > max {
            return Err(CodecError::TooLarge {
                offset: start,
                value,
                max,
            });
        }
        Ok(value)
    }

    /// Read a VarInt length, bounded by `max`, followed by that many bytes
    pub fn read_var_bytes(&mut self, max: u64) -> Result<Vec<u8>, CodecError> {
        let len = self.read_var_int(max)?;
        let len = usize::try_from(len).map_err(|_| CodecError::TooLarge {
            offset: self.pos,
            value: len,
            max: usize::MAX as u64,
        })?;
        self.read_bytes(len)
    }

    /// Read VarBytes and decode them as UTF-8
    pub fn read_var_string(&mut self, max: u64) -> Result<String, CodecError> {
        let start = self.pos;
        let bytes = self.read_var_bytes(max)?;
        String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8 { offset: start })
    }

    /// Read a script-style push length
    ///
    /// Bytes up to `OP_PUSHBYTES75` are the length itself; `OP_PUSHDATA1/2/4`
    /// are followed by a 1/2/4 byte length. Any other opcode is rejected.
    pub fn read_push_len(&mut self) -> Result<usize, CodecError> {
        let offset = self.pos;
        let marker = self.read_u8()?;
        if marker <= OpCode::PushBytes75 as u8 {
            return Ok(usize::from(marker));
        }
        let len = match OpCode::from_byte(marker) {
            Some(OpCode::PushData1) => usize::from(self.read_u8()?),
            Some(OpCode::PushData2) => usize::from(self.read_u16()?),
            Some(OpCode::PushData4) => self.read_u32()? as usize,
            _ => {
                return Err(CodecError::InvalidData {
                    offset,
                    reason: format!("opcode {:#04x} is not a data push", marker),
                })
            }
        };
        Ok(len)
    }

    /// Read a script-style push and return its payload
    pub fn read_push_bytes(&mut self) -> Result<Vec<u8>, CodecError> {
        let len = self.read_push_len()?;
        self.read_bytes(len)
    }

    /// Look at the next byte without consuming it
    pub fn peek_u8(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    pub fn read_serializable<T: Serializable>(&mut self) -> Result<T, CodecError> {
        T::deserialize(self)
    }

    /// Read a VarInt count followed by that many elements
    pub fn read_serializable_array<T: Serializable>(&mut self) -> Result<Vec<T>, CodecError> {
        let count = self.read_var_int(MAX_ARRAY_LEN)?;
        let mut items = Vec::with_capacity((count as usize).min(self.remaining()));
        for _ in 0..count {
            items.push(T::deserialize(self)?);
        }
        Ok(items)
    }
}
