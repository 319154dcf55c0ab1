//! NeoVM script construction
//!
//! This module provides:
//! - The opcode table
//! - `ScriptBuilder` for push and control opcodes
//! - Contract call parameters (`Param`, ABI descriptions)
//! - Verification/invocation programs and their parsers

pub mod builder;
pub mod opcodes;
pub mod params;
pub mod program;

pub use builder::{int_from_script_bytes, int_to_script_bytes, ScriptBuilder};
pub use opcodes::OpCode;
pub use params::{build_params, AbiFunction, AbiParameter, Param};
pub use program::{
    get_param_info, get_program_info, program_from_multi_pubkey, program_from_params,
    program_from_pubkey, ProgramInfo, MULTI_SIG_MAX_PUBKEY_SIZE,
};

use thiserror::Error;

use crate::crypto::KeyError;
use crate::io::CodecError;

/// Script encoding and parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("Unsupported parameter type: {0}")]
    UnsupportedParamType(String),
    #[error("Invalid parameter: {0}")]
    ParamError(String),
    #[error("Malformed script at offset {offset}: {reason}")]
    MalformedScript { offset: usize, reason: String },
    #[error("Integer push of {0} bytes does not fit in 128 bits")]
    IntegerOverflow(usize),
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("Key error: {0}")]
    Key(#[from] KeyError),
}
