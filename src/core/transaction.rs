//! Transactions
//!
//! A transaction is a common envelope (version, nonce, gas, payer,
//! attributes) around a type-specific payload, plus signature entries.
//! Identity and signing both use the double-SHA-256 of the envelope
//! without signatures, so signing never changes a transaction's hash.

use std::hash::{Hash, Hasher};

use log::debug;
use serde_json::{json, Value};
use thiserror::Error;

use super::attribute::Attribute;
use super::payload::{Payload, TransactionType};
use super::sig::Sig;
use super::types::{Address, H256};
use crate::crypto::hash::hash256;
use crate::crypto::KeyError;
use crate::io::{BinaryReader, BinaryWriter, CodecError, Serializable};
use crate::script::ScriptError;

// =============================================================================
// Constants
// =============================================================================

/// Current transaction version
pub const TX_VERSION: u8 = 0;

/// Maximum number of signature entries per transaction
pub const TX_MAX_SIG_SIZE: usize = 16;

// =============================================================================
// Error Types
// =============================================================================

/// Transaction-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Decode error: {0}")]
    Codec(#[from] CodecError),
    #[error("Invalid hex: {0}")]
    InvalidHex(String),
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),
    #[error("Key error: {0}")]
    Key(#[from] KeyError),
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
}

// =============================================================================
// Transaction
// =============================================================================

/// A transaction envelope with its payload and signatures
#[derive(Debug, Clone)]
pub struct Transaction {
    pub version: u8,
    pub nonce: u32,
    pub gas_price: u64,
    pub gas_limit: u64,
    pub payer: Address,
    pub attributes: Vec<Attribute>,
    pub payload: Payload,
    pub sigs: Vec<Sig>,
}

impl Transaction {
    /// Create an unsigned transaction with a random nonce and zero gas
    pub fn new(payload: Payload) -> Self {
        TransactionBuilder::new(payload).build()
    }

    pub fn tx_type(&self) -> TransactionType {
        self.payload.tx_type()
    }

    fn serialize_unsigned_into(&self, writer: &mut BinaryWriter) {
        writer.write_u8(self.version);
        writer.write_u8(self.tx_type() as u8);
        writer.write_u32(self.nonce);
        writer.write_u64(self.gas_price);
        writer.write_u64(self.gas_limit);
        writer.write_serializable(&self.payer);
        self.payload.serialize(writer);
        writer.write_serializable_array(&self.attributes);
    }

    /// Canonical encoding without the signature list
    pub fn serialize_unsigned(&self) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        self.serialize_unsigned_into(&mut writer);
        writer.into_bytes()
    }

    /// Content hash: double SHA-256 of the unsigned encoding
    pub fn hash(&self) -> H256 {
        H256(hash256(&self.serialize_unsigned()))
    }

    /// Message handed to signers
    pub fn signing_digest(&self) -> [u8; 32] {
        self.hash().0
    }

    /// Copy of this transaction with a different signature list
    pub fn with_sigs(&self, sigs: Vec<Sig>) -> Self {
        Self {
            sigs,
            ..self.clone()
        }
    }

    /// Full signed encoding as hex, ready for submission
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn from_hex(s: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(s.trim()).map_err(|e| TransactionError::InvalidHex(e.to_string()))?;
        Ok(Self::from_bytes(&bytes)?)
    }

    pub fn to_json(&self) -> Value {
        json!({
            "Hash": self.hash().to_string(),
            "Version": self.version,
            "Nonce": self.nonce,
            "TxType": self.tx_type() as u8,
            "GasPrice": self.gas_price,
            "GasLimit": self.gas_limit,
            "Payer": self.payer.to_base58(),
            "Attributes": self.attributes.iter().map(Attribute::to_json).collect::<Vec<_>>(),
            "Sigs": self.sigs.iter().map(Sig::to_json).collect::<Vec<_>>(),
            "Payload": self.payload.to_json(),
        })
    }
}

impl Serializable for Transaction {
    fn serialize(&self, writer: &mut BinaryWriter) {
        self.serialize_unsigned_into(writer);
        writer.write_serializable_array(&self.sigs);
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self, CodecError> {
        let version = reader.read_u8()?;
        let tag_offset = reader.position();
        let tag = reader.read_u8()?;
        let tx_type = TransactionType::from_byte(tag).ok_or(CodecError::UnknownTag {
            offset: tag_offset,
            tag,
            kind: "transaction type",
        })?;
        let nonce = reader.read_u32()?;
        let gas_price = reader.read_u64()?;
        let gas_limit = reader.read_u64()?;
        let payer = reader.read_serializable()?;
        let payload = Payload::deserialize(tx_type, reader)?;
        let attributes = reader.read_serializable_array()?;

        let sigs_offset = reader.position();
        let sig_count = reader
            .read_var_int(TX_MAX_SIG_SIZE as u64)
            .map_err(|e| match e {
                CodecError::TooLarge { .. } => CodecError::InvalidData {
                    offset: sigs_offset,
                    reason: format!("more than {} signature entries", TX_MAX_SIG_SIZE),
                },
                other => other,
            })?;
        let mut sigs = Vec::with_capacity(sig_count as usize);
        for _ in 0..sig_count {
            sigs.push(reader.read_serializable()?);
        }

        let tx = Transaction {
            version,
            nonce,
            gas_price,
            gas_limit,
            payer,
            attributes,
            payload,
            sigs,
        };
        debug!(
            "Decoded {:?} transaction {} with {} signature entries",
            tx_type,
            tx.hash(),
            tx.sigs.len()
        );
        Ok(tx)
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.hash() == other.hash()
    }
}

impl Eq for Transaction {}

impl Hash for Transaction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Transaction::hash(self).hash(state);
    }
}

// =============================================================================
// Transaction Builder
// =============================================================================

/// Builder for unsigned transactions
pub struct TransactionBuilder {
    payload: Payload,
    version: u8,
    nonce: Option<u32>,
    gas_price: u64,
    gas_limit: u64,
    payer: Address,
    attributes: Vec<Attribute>,
}

impl TransactionBuilder {
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            version: TX_VERSION,
            nonce: None,
            gas_price: 0,
            gas_limit: 0,
            payer: Address::default(),
            attributes: Vec::new(),
        }
    }

    pub fn version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    /// Fix the nonce instead of drawing a random one
    pub fn nonce(mut self, nonce: u32) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn gas_price(mut self, gas_price: u64) -> Self {
        self.gas_price = gas_price;
        self
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn payer(mut self, payer: Address) -> Self {
        self.payer = payer;
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn build(self) -> Transaction {
        Transaction {
            version: self.version,
            nonce: self.nonce.unwrap_or_else(rand::random),
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            payer: self.payer,
            attributes: self.attributes,
            payload: self.payload,
            sigs: Vec::new(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attribute::AttributeUsage;
    use crate::crypto::keys::{KeyPair, Signer};

    fn sample_tx() -> Transaction {
        TransactionBuilder::new(Payload::InvokeCode {
            code: vec![0x00, 0xC1, 0x67],
        })
        .nonce(0x01020304)
        .gas_price(500)
        .gas_limit(20000)
        .payer(Address([0x11; 20]))
        .attribute(Attribute::new(AttributeUsage::Nonce, vec![0xAA]))
        .build()
    }

    #[test]
    fn test_envelope_layout() {
        let tx = sample_tx();
        let bytes = tx.serialize_unsigned();

        assert_eq!(bytes[0], TX_VERSION);
        assert_eq!(bytes[1], 0xD1);
        assert_eq!(&bytes[2..6], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[6..14], &500u64.to_le_bytes());
        assert_eq!(&bytes[14..22], &20000u64.to_le_bytes());
        assert_eq!(&bytes[22..42], &[0x11; 20]);
        assert_eq!(&bytes[42..46], &[0x03, 0x00, 0xC1, 0x67]);
        assert_eq!(&bytes[46..], &[0x01, 0x00, 0x01, 0xAA]);

        let mut full = bytes.clone();
        full.push(0x00);
        assert_eq!(tx.to_bytes(), full);
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        let key = KeyPair::generate();
        let tx = sample_tx();
        let signature = key.sign(&tx.signing_digest()).unwrap();
        let signed = tx.with_sigs(vec![Sig::new(1, vec![key.public_key()], vec![signature]).unwrap()]);

        let hex = signed.to_hex();
        let decoded = Transaction::from_hex(&hex).unwrap();
        assert_eq!(decoded.to_hex(), hex);
        assert_eq!(decoded.serialize_unsigned(), tx.serialize_unsigned());
        assert_eq!(decoded.sigs.len(), 1);
    }

    #[test]
    fn test_hash_ignores_signatures() {
        let key = KeyPair::generate();
        let tx = sample_tx();
        let signed = tx.with_sigs(vec![Sig::new(1, vec![key.public_key()], vec![vec![1]]).unwrap()]);

        assert_eq!(tx.hash(), signed.hash());
        assert_eq!(tx, signed);
        assert_ne!(tx.to_bytes(), signed.to_bytes());
    }

    #[test]
    fn test_unknown_type_tag() {
        let mut bytes = sample_tx().to_bytes();
        bytes[1] = 0x42;
        assert_eq!(
            Transaction::from_bytes(&bytes).unwrap_err(),
            CodecError::UnknownTag {
                offset: 1,
                tag: 0x42,
                kind: "transaction type"
            }
        );
    }

    #[test]
    fn test_truncated_and_trailing() {
        let bytes = sample_tx().to_bytes();
        assert!(matches!(
            Transaction::from_bytes(&bytes[..bytes.len() - 1]),
            Err(CodecError::Truncated { .. })
        ));

        let mut longer = bytes.clone();
        longer.push(0x00);
        assert!(matches!(
            Transaction::from_bytes(&longer),
            Err(CodecError::TrailingBytes { .. })
        ));
    }

    #[test]
    fn test_too_many_sig_entries() {
        let mut bytes = sample_tx().serialize_unsigned();
        bytes.push(17);
        assert!(matches!(
            Transaction::from_bytes(&bytes),
            Err(CodecError::InvalidData { .. })
        ));
    }

    #[test]
    fn test_truncated_sig_count() {
        let mut bytes = sample_tx().serialize_unsigned();
        bytes.push(0xFD);
        assert!(matches!(
            Transaction::from_bytes(&bytes),
            Err(CodecError::Truncated { .. })
        ));
    }

    #[test]
    fn test_from_hex_rejects_bad_hex() {
        assert!(matches!(
            Transaction::from_hex("zz"),
            Err(TransactionError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_json_fields() {
        let tx = sample_tx();
        let json = tx.to_json();
        assert_eq!(json["Hash"], tx.hash().to_string());
        assert_eq!(json["TxType"], 0xD1);
        assert_eq!(json["GasPrice"], 500);
        assert_eq!(json["Payer"], Address([0x11; 20]).to_base58());
        assert_eq!(json["Payload"]["Code"], "00c167");
        assert_eq!(json["Attributes"][0]["Data"], "aa");
    }

    #[test]
    fn test_builder_draws_random_nonce() {
        let nonces: std::collections::HashSet<u32> = (0..8)
            .map(|_| Transaction::new(Payload::Bookkeeping { nonce: 0 }).nonce)
            .collect();
        assert!(nonces.len() > 1);
    }
}
