//! Transaction signing and M-of-N signature aggregation
//!
//! Signers contribute independently; signatures for the same key set are
//! gathered into one signature-program entry keyed by the canonical key
//! order.
//!
//! # Example
//!
//! ```ignore
//! use ontio_core::multisig::add_multi_sign;
//!
//! // Two of three holders sign, in any order
//! let tx = add_multi_sign(&tx, 2, &pubkeys, alice.sign(&tx.signing_digest())?)?;
//! let tx = add_multi_sign(&tx, 2, &pubkeys, carol.sign(&tx.signing_digest())?)?;
//! ```

pub mod signing;

pub use signing::{add_multi_sign, add_sign, sign_transaction, sign_transaction_with_m};

use thiserror::Error;

/// Errors related to signing and aggregation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MultisigError {
    #[error("Too many signatures: {0}")]
    TooManySignatures(String),
    #[error("M threshold mismatch: entry has {existing}, requested {requested}")]
    ThresholdMismatch { existing: usize, requested: usize },
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),
    #[error("Crypto error: {0}")]
    Key(#[from] crate::crypto::KeyError),
    #[error("Script error: {0}")]
    Script(#[from] crate::script::ScriptError),
    #[error("Transaction error: {0}")]
    Transaction(#[from] crate::core::TransactionError),
}
