//! Contract call construction
//!
//! This module builds the bytecode that calls a contract; it never executes
//! any. Two calling conventions are covered:
//! - Native contracts (ONT, ONG) through the `Ontology.Native.Invoke` service
//! - NeoVM contracts through `APPCALL` plus the contract address
//!
//! # Example
//!
//! ```ignore
//! use ontio_core::contract::{native, NativeAsset, State};
//!
//! let state = State::new(alice, bob, 10);
//! let tx = native::transfer(&config, NativeAsset::Ont, &[state], Some(alice))?;
//! ```

pub mod native;
pub mod neovm;

pub use native::{
    build_native_invoke, native_invoke_transaction, NativeAsset, State, NATIVE_INVOKE_NAME,
    ONG_CONTRACT, ONT_CONTRACT,
};
pub use neovm::{build_neovm_invoke, contract_address, deploy_transaction, invoke_transaction};

use thiserror::Error;

/// Contract call errors
#[derive(Error, Debug)]
pub enum ContractError {
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid contract code: {0}")]
    InvalidCode(String),
    #[error("Script error: {0}")]
    Script(#[from] crate::script::ScriptError),
    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),
}
