//! Binary writer
//!
//! Appends little-endian primitives, VarInts and length-prefixed byte
//! arrays to a growable buffer. Writing never enforces an upper bound.

use bytes::{BufMut, BytesMut};

use super::Serializable;
use crate::script::opcodes::OpCode;

/// Encoded length of `value` as a VarInt
pub fn var_int_size(value: u64) -> usize {
    if value < 0xFD {
        1
    } else if value <= 0xFFFF {
        3
    } else if value <= 0xFFFF_FFFF {
        5
    } else {
        9
    }
}

/// Growable little-endian byte writer
#[derive(Debug, Default, Clone)]
pub struct BinaryWriter {
    buf: BytesMut,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// View the written bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer and return its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.to_vec()
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.put_u8(u8::from(value));
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.put_u16_le(value);
    }

    pub fn write_i16(&mut self, value: i16) {
        self.buf.put_i16_le(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32_le(value);
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.put_u64_le(value);
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buf.put_i64_le(value);
    }

    /// Write raw bytes with no length prefix
    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buf.put_slice(data);
    }

    /// Write a VarInt: 1, 3, 5 or 9 bytes depending on magnitude
    pub fn write_var_int(&mut self, value: u64) {
        if value < 0xFD {
            self.buf.put_u8(value as u8);
        } else if value <= 0xFFFF {
            self.buf.put_u8(0xFD);
            self.buf.put_u16_le(value as u16);
        } else if value <= 0xFFFF_FFFF {
            self.buf.put_u8(0xFE);
            self.buf.put_u32_le(value as u32);
        } else {
            self.buf.put_u8(0xFF);
            self.buf.put_u64_le(value);
        }
    }

    /// Write VarInt length followed by the raw bytes
    pub fn write_var_bytes(&mut self, data: &[u8]) {
        self.write_var_int(data.len() as u64);
        self.buf.put_slice(data);
    }

    /// Write a UTF-8 string as VarBytes
    pub fn write_var_string(&mut self, value: &str) {
        self.write_var_bytes(value.as_bytes());
    }

    /// Write a script-style push: length opcode chosen by size class, then data
    ///
    /// Lengths above `u32::MAX` cannot be expressed and are truncated by the
    /// caller's contract; script sizes never approach that bound.
    pub fn write_push_bytes(&mut self, data: &[u8]) {
        let len = data.len();
        if len <= OpCode::PushBytes75 as usize {
            self.buf.put_u8(len as u8);
        } else if len < 0x100 {
            self.buf.put_u8(OpCode::PushData1 as u8);
            self.buf.put_u8(len as u8);
        } else if len < 0x1_0000 {
            self.buf.put_u8(OpCode::PushData2 as u8);
            self.buf.put_u16_le(len as u16);
        } else {
            self.buf.put_u8(OpCode::PushData4 as u8);
            self.buf.put_u32_le(len as u32);
        }
        self.buf.put_slice(data);
    }

    pub fn write_serializable<T: Serializable>(&mut self, value: &T) {
        value.serialize(self);
    }

    /// Write a VarInt count followed by each element
    pub fn write_serializable_array<T: Serializable>(&mut self, values: &[T]) {
        self.write_var_int(values.len() as u64);
        for value in values {
            value.serialize(self);
        }
    }
}
