//! Cryptographic utilities
//!
//! This module provides:
//! - SHA-256, double SHA-256 and RIPEMD-160 hashing
//! - Base58Check encoding
//! - Key types, signature schemes and canonical public-key ordering
//! - Merkle audit-path verification and construction

pub mod base58;
pub mod hash;
pub mod keys;
pub mod merkle;

pub use base58::{decode_check, encode_check, Base58Error};
pub use hash::{hash160, hash256, ripemd160, sha256, sha256_hex};
pub use keys::{
    compare_public_keys, sort_public_keys, verify_signature, EcPoint, KeyError, KeyPair, KeyType,
    SignatureScheme, Signer,
};
pub use merkle::{
    audit_path, hash_children, hash_empty, hash_full_tree, hash_full_tree_with_leaf_hashes,
    hash_leaf, proof_nodes, root_from_audit_path, verify_leaf_hash_inclusion, verify_proof_nodes,
    Direction, MerkleError, MerkleProof, ProofNode,
};
