//! ontio-core: client-side transaction engine for the Ontology chain
//!
//! This crate builds, canonically encodes, signs and verifies transactions:
//! - Binary codec for the chain's VarInt / VarBytes wire format
//! - secp256r1 / SM2 key handling, Base58Check addresses
//! - Stack-script builder and contract parameter encoder
//! - Signature programs with canonical M-of-N key ordering
//! - Transaction model with typed payloads and signature aggregation
//! - Merkle audit-path verification of block inclusion proofs
//!
//! # Example
//!
//! ```rust
//! use ontio_core::config::SdkConfig;
//! use ontio_core::contract::{native, NativeAsset, State};
//! use ontio_core::crypto::KeyPair;
//! use ontio_core::multisig::add_sign;
//!
//! let config = SdkConfig::default();
//! let alice = KeyPair::generate();
//! let bob = KeyPair::generate();
//!
//! // Build an ONT transfer paid by the sender
//! let state = State::new(alice.address(), bob.address(), 10);
//! let tx = native::transfer(&config, NativeAsset::Ont, &[state], Some(alice.address())).unwrap();
//!
//! // Sign it; the hash does not change
//! let signed = add_sign(&tx, &alice).unwrap();
//! assert_eq!(signed.hash(), tx.hash());
//! println!("{}", signed.to_hex());
//! ```

pub mod cli;
pub mod config;
pub mod contract;
pub mod core;
pub mod crypto;
pub mod io;
pub mod multisig;
pub mod script;

// Re-export commonly used types
pub use config::SdkConfig;
pub use contract::{NativeAsset, State};
pub use core::{Address, Attribute, Payload, Sig, Transaction, TransactionBuilder, H256};
pub use crypto::{KeyPair, MerkleProof, Signer};
pub use io::{BinaryReader, BinaryWriter, CodecError, Serializable};
pub use multisig::{add_multi_sign, add_sign, sign_transaction, MultisigError};
pub use script::{AbiFunction, Param, ScriptBuilder};
