//! Core transaction data model
//!
//! This module contains the fundamental building blocks:
//! - Identifiers (`H256`, `Address` with Base58Check and reversed hex forms)
//! - Attributes and signature-program entries (`Sig`)
//! - Typed payloads behind a closed transaction-type tag set
//! - Transactions with canonical unsigned encoding, hashing and JSON view

pub mod attribute;
pub mod payload;
pub mod sig;
pub mod transaction;
pub mod types;

pub use attribute::{Attribute, AttributeUsage, MAX_ATTRIBUTE_DATA};
pub use payload::{BookkeeperAction, DeployCode, Payload, TransactionType};
pub use sig::Sig;
pub use transaction::{
    Transaction, TransactionBuilder, TransactionError, TX_MAX_SIG_SIZE, TX_VERSION,
};
pub use types::{Address, ParseError, ADDRESS_LEN, ADDRESS_VERSION, H256};
