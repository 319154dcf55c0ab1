//! Stack-script assembler
//!
//! Emits NeoVM push and control opcodes into a byte buffer. Integer and
//! byte-array pushes always pick the shortest encoding.

use super::opcodes::OpCode;
use super::ScriptError;
use crate::io::BinaryWriter;

/// Minimal little-endian two's-complement encoding of an integer
///
/// Zero encodes as the empty array, the VM's canonical zero.
pub fn int_to_script_bytes(value: i128) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }
    let mut bytes = value.to_le_bytes().to_vec();
    while bytes.len() > 1 {
        let last = bytes[bytes.len() - 1];
        let prev_sign = bytes[bytes.len() - 2] & 0x80;
        let redundant = (last == 0x00 && prev_sign == 0) || (last == 0xFF && prev_sign != 0);
        if !redundant {
            break;
        }
        bytes.pop();
    }
    bytes
}

/// Decode a little-endian two's-complement integer pushed as bytes
pub fn int_from_script_bytes(bytes: &[u8]) -> Result<i128, ScriptError> {
    if bytes.len() > 16 {
        return Err(ScriptError::IntegerOverflow(bytes.len()));
    }
    let Some(&last) = bytes.last() else {
        return Ok(0);
    };
    let fill = if last & 0x80 != 0 { 0xFF } else { 0x00 };
    let mut buf = [fill; 16];
    buf[..bytes.len()].copy_from_slice(bytes);
    Ok(i128::from_le_bytes(buf))
}

/// Builder for NeoVM scripts
#[derive(Debug, Default, Clone)]
pub struct ScriptBuilder {
    writer: BinaryWriter,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single opcode
    pub fn emit(&mut self, op: OpCode) -> &mut Self {
        self.writer.write_u8(op as u8);
        self
    }

    /// Append raw bytes verbatim
    pub fn add(&mut self, raw: &[u8]) -> &mut Self {
        self.writer.write_bytes(raw);
        self
    }

    pub fn emit_push_bool(&mut self, value: bool) -> &mut Self {
        self.emit(if value { OpCode::Push1 } else { OpCode::Push0 })
    }

    /// Push an integer: `-1` and `0..=16` get their own opcode, anything
    /// else is pushed as minimal two's-complement bytes
    pub fn emit_push_integer(&mut self, value: i128) -> &mut Self {
        match value {
            -1 => self.emit(OpCode::PushM1),
            0 => self.emit(OpCode::Push0),
            1..=16 => {
                self.writer.write_u8(OpCode::Push1 as u8 - 1 + value as u8);
                self
            }
            _ => self.emit_push_bytes(&int_to_script_bytes(value)),
        }
    }

    /// Push a byte array with the shortest length prefix for its size
    pub fn emit_push_bytes(&mut self, data: &[u8]) -> &mut Self {
        self.writer.write_push_bytes(data);
        self
    }

    /// Call an interop service: `SYSCALL` followed by the pushed name
    pub fn emit_syscall(&mut self, service: &str) -> &mut Self {
        self.emit(OpCode::Syscall);
        self.emit_push_bytes(service.as_bytes())
    }

    /// Pack the top `count` stack items into an array
    pub fn emit_pack(&mut self, count: usize) -> &mut Self {
        self.emit_push_integer(count as i128);
        self.emit(OpCode::Pack)
    }

    pub fn len(&self) -> usize {
        self.writer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writer.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        self.writer.as_slice()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.writer.into_bytes()
    }
}
