//! NeoVM opcodes
//!
//! Only the opcodes the script builder and program parser emit or inspect
//! are listed; the byte values follow the NeoVM instruction set.

use serde::{Deserialize, Serialize};

/// NeoVM instruction opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum OpCode {
    // Constants (0x00 - 0x60)
    /// Push an empty byte array (integer zero)
    Push0 = 0x00,
    /// Push the next byte as data
    PushBytes1 = 0x01,
    /// Push the next 75 bytes as data
    PushBytes75 = 0x4B,
    /// Next byte holds the data length
    PushData1 = 0x4C,
    /// Next two bytes hold the data length
    PushData2 = 0x4D,
    /// Next four bytes hold the data length
    PushData4 = 0x4E,
    /// Push the number -1
    PushM1 = 0x4F,
    /// Push the number 1
    Push1 = 0x51,
    Push2 = 0x52,
    Push3 = 0x53,
    Push4 = 0x54,
    Push5 = 0x55,
    Push6 = 0x56,
    Push7 = 0x57,
    Push8 = 0x58,
    Push9 = 0x59,
    Push10 = 0x5A,
    Push11 = 0x5B,
    Push12 = 0x5C,
    Push13 = 0x5D,
    Push14 = 0x5E,
    Push15 = 0x5F,
    /// Push the number 16
    Push16 = 0x60,

    // Flow control (0x61 - 0x69)
    Nop = 0x61,
    Jmp = 0x62,
    JmpIf = 0x63,
    JmpIfNot = 0x64,
    Call = 0x65,
    Ret = 0x66,
    /// Call a deployed NeoVM contract by its 20-byte address
    AppCall = 0x67,
    /// Call an interop service by name
    Syscall = 0x68,
    TailCall = 0x69,

    // Stack (0x6A - 0x7D)
    DupFromAltStack = 0x6A,
    ToAltStack = 0x6B,
    FromAltStack = 0x6C,
    XDrop = 0x6D,
    XSwap = 0x72,
    XTuck = 0x73,
    Depth = 0x74,
    Drop = 0x75,
    Dup = 0x76,
    Nip = 0x77,
    Over = 0x78,
    Pick = 0x79,
    Roll = 0x7A,
    Rot = 0x7B,
    Swap = 0x7C,
    Tuck = 0x7D,

    // Splice (0x7E - 0x82)
    Cat = 0x7E,
    Substr = 0x7F,
    Left = 0x80,
    Right = 0x81,
    Size = 0x82,

    // Crypto (0xA7 - 0xAE)
    Sha1 = 0xA7,
    Sha256 = 0xA8,
    Hash160 = 0xA9,
    Hash256 = 0xAA,
    CheckSig = 0xAC,
    Verify = 0xAD,
    CheckMultiSig = 0xAE,

    // Collections (0xC0 - 0xCD)
    ArraySize = 0xC0,
    Pack = 0xC1,
    Unpack = 0xC2,
    PickItem = 0xC3,
    SetItem = 0xC4,
    NewArray = 0xC5,
    NewStruct = 0xC6,
    NewMap = 0xC7,
    Append = 0xC8,
    Reverse = 0xC9,
    Remove = 0xCA,
    HasKey = 0xCB,
    Keys = 0xCC,
    Values = 0xCD,

    // Exceptions
    Throw = 0xF0,
    ThrowIfNot = 0xF1,
}

impl OpCode {
    /// Convert byte to opcode
    ///
    /// `0x02..=0x4A` are data-length prefixes with no named variant and
    /// decode to `None`, like any unassigned byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        use OpCode::*;
        let op = match byte {
            0x00 => Push0,
            0x01 => PushBytes1,
            0x4B => PushBytes75,
            0x4C => PushData1,
            0x4D => PushData2,
            0x4E => PushData4,
            0x4F => PushM1,
            0x51 => Push1,
            0x52 => Push2,
            0x53 => Push3,
            0x54 => Push4,
            0x55 => Push5,
            0x56 => Push6,
            0x57 => Push7,
            0x58 => Push8,
            0x59 => Push9,
            0x5A => Push10,
            0x5B => Push11,
            0x5C => Push12,
            0x5D => Push13,
            0x5E => Push14,
            0x5F => Push15,
            0x60 => Push16,
            0x61 => Nop,
            0x62 => Jmp,
            0x63 => JmpIf,
            0x64 => JmpIfNot,
            0x65 => Call,
            0x66 => Ret,
            0x67 => AppCall,
            0x68 => Syscall,
            0x69 => TailCall,
            0x6A => DupFromAltStack,
            0x6B => ToAltStack,
            0x6C => FromAltStack,
            0x6D => XDrop,
            0x72 => XSwap,
            0x73 => XTuck,
            0x74 => Depth,
            0x75 => Drop,
            0x76 => Dup,
            0x77 => Nip,
            0x78 => Over,
            0x79 => Pick,
            0x7A => Roll,
            0x7B => Rot,
            0x7C => Swap,
            0x7D => Tuck,
            0x7E => Cat,
            0x7F => Substr,
            0x80 => Left,
            0x81 => Right,
            0x82 => Size,
            0xA7 => Sha1,
            0xA8 => Sha256,
            0xA9 => Hash160,
            0xAA => Hash256,
            0xAC => CheckSig,
            0xAD => Verify,
            0xAE => CheckMultiSig,
            0xC0 => ArraySize,
            0xC1 => Pack,
            0xC2 => Unpack,
            0xC3 => PickItem,
            0xC4 => SetItem,
            0xC5 => NewArray,
            0xC6 => NewStruct,
            0xC7 => NewMap,
            0xC8 => Append,
            0xC9 => Reverse,
            0xCA => Remove,
            0xCB => HasKey,
            0xCC => Keys,
            0xCD => Values,
            0xF0 => Throw,
            0xF1 => ThrowIfNot,
            _ => return None,
        };
        Some(op)
    }

    /// Small-integer value pushed by `PUSHM1`, `PUSH0` and `PUSH1..PUSH16`
    pub fn small_int(byte: u8) -> Option<i64> {
        match byte {
            0x4F => Some(-1),
            0x00 => Some(0),
            0x51..=0x60 => Some(i64::from(byte - 0x50)),
            _ => None,
        }
    }

    /// Opcode name for disassembly
    pub fn name(&self) -> &'static str {
        use OpCode::*;
        match self {
            Push0 => "PUSH0",
            PushBytes1 => "PUSHBYTES1",
            PushBytes75 => "PUSHBYTES75",
            PushData1 => "PUSHDATA1",
            PushData2 => "PUSHDATA2",
            PushData4 => "PUSHDATA4",
            PushM1 => "PUSHM1",
            Push1 => "PUSH1",
            Push2 => "PUSH2",
            Push3 => "PUSH3",
            Push4 => "PUSH4",
            Push5 => "PUSH5",
            Push6 => "PUSH6",
            Push7 => "PUSH7",
            Push8 => "PUSH8",
            Push9 => "PUSH9",
            Push10 => "PUSH10",
            Push11 => "PUSH11",
            Push12 => "PUSH12",
            Push13 => "PUSH13",
            Push14 => "PUSH14",
            Push15 => "PUSH15",
            Push16 => "PUSH16",
            Nop => "NOP",
            Jmp => "JMP",
            JmpIf => "JMPIF",
            JmpIfNot => "JMPIFNOT",
            Call => "CALL",
            Ret => "RET",
            AppCall => "APPCALL",
            Syscall => "SYSCALL",
            TailCall => "TAILCALL",
            DupFromAltStack => "DUPFROMALTSTACK",
            ToAltStack => "TOALTSTACK",
            FromAltStack => "FROMALTSTACK",
            XDrop => "XDROP",
            XSwap => "XSWAP",
            XTuck => "XTUCK",
            Depth => "DEPTH",
            Drop => "DROP",
            Dup => "DUP",
            Nip => "NIP",
            Over => "OVER",
            Pick => "PICK",
            Roll => "ROLL",
            Rot => "ROT",
            Swap => "SWAP",
            Tuck => "TUCK",
            Cat => "CAT",
            Substr => "SUBSTR",
            Left => "LEFT",
            Right => "RIGHT",
            Size => "SIZE",
            Sha1 => "SHA1",
            Sha256 => "SHA256",
            Hash160 => "HASH160",
            Hash256 => "HASH256",
            CheckSig => "CHECKSIG",
            Verify => "VERIFY",
            CheckMultiSig => "CHECKMULTISIG",
            ArraySize => "ARRAYSIZE",
            Pack => "PACK",
            Unpack => "UNPACK",
            PickItem => "PICKITEM",
            SetItem => "SETITEM",
            NewArray => "NEWARRAY",
            NewStruct => "NEWSTRUCT",
            NewMap => "NEWMAP",
            Append => "APPEND",
            Reverse => "REVERSE",
            Remove => "REMOVE",
            HasKey => "HASKEY",
            Keys => "KEYS",
            Values => "VALUES",
            Throw => "THROW",
            ThrowIfNot => "THROWIFNOT",
        }
    }
}
