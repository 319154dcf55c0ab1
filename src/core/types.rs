//! Fixed-size identifiers: 32-byte hashes and 20-byte addresses
//!
//! Both render as byte-reversed hex. Addresses additionally have a
//! Base58Check form with a one-byte version prefix.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::crypto::base58::{decode_check, encode_check, Base58Error};
use crate::crypto::hash::hash160;
use crate::io::{BinaryReader, BinaryWriter, CodecError, Serializable};
use crate::script::program::{program_from_multi_pubkey, program_from_pubkey};
use crate::script::ScriptError;

/// Base58 version byte of account addresses
pub const ADDRESS_VERSION: u8 = 0x17;

/// Length of an address in bytes
pub const ADDRESS_LEN: usize = 20;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid hex: {0}")]
    InvalidHex(String),
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("Base58 error: {0}")]
    Base58(#[from] Base58Error),
    #[error("Wrong address version: expected {expected:#04x}, got {actual:#04x}")]
    WrongVersion { expected: u8, actual: u8 },
}

/// Decode byte-reversed hex, accepting an optional `0x` prefix
fn decode_reversed_hex<const N: usize>(s: &str) -> Result<[u8; N], ParseError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let mut bytes = hex::decode(s).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
    if bytes.len() != N {
        return Err(ParseError::InvalidLength {
            expected: N,
            actual: bytes.len(),
        });
    }
    bytes.reverse();
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

fn encode_reversed_hex(bytes: &[u8]) -> String {
    let mut reversed = bytes.to_vec();
    reversed.reverse();
    hex::encode(reversed)
}

// =============================================================================
// H256
// =============================================================================

/// 32-byte hash (transaction hash, Merkle node)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct H256(pub [u8; 32]);

impl H256 {
    pub const ZERO: H256 = H256([0u8; 32]);

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ParseError> {
        let array: [u8; 32] = bytes.try_into().map_err(|_| ParseError::InvalidLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        Ok(H256(array))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl From<[u8; 32]> for H256 {
    fn from(bytes: [u8; 32]) -> Self {
        H256(bytes)
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_reversed_hex(&self.0))
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H256({})", self)
    }
}

impl FromStr for H256 {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_reversed_hex::<32>(s).map(H256)
    }
}

impl Serialize for H256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for H256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Serializable for H256 {
    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_bytes(&self.0);
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self, CodecError> {
        reader.read_fixed::<32>().map(H256)
    }
}

// =============================================================================
// Address
// =============================================================================

/// 20-byte account or contract address: `hash160` of a verification script
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ParseError> {
        let array: [u8; ADDRESS_LEN] =
            bytes.try_into().map_err(|_| ParseError::InvalidLength {
                expected: ADDRESS_LEN,
                actual: bytes.len(),
            })?;
        Ok(Address(array))
    }

    /// Address of arbitrary VM code
    pub fn from_vm_code(code: &[u8]) -> Self {
        Address(hash160(code))
    }

    /// Address controlled by a single public key
    pub fn from_pubkey(public_key: &[u8]) -> Self {
        Self::from_vm_code(&program_from_pubkey(public_key))
    }

    /// Address controlled by an M-of-N key set
    pub fn from_multi_pubkeys(m: usize, public_keys: &[Vec<u8>]) -> Result<Self, ScriptError> {
        Ok(Self::from_vm_code(&program_from_multi_pubkey(m, public_keys)?))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn to_base58(&self) -> String {
        self.to_base58_with_version(ADDRESS_VERSION)
    }

    pub fn to_base58_with_version(&self, version: u8) -> String {
        encode_check(version, &self.0)
    }

    pub fn from_base58(s: &str) -> Result<Self, ParseError> {
        Self::from_base58_with_version(s, ADDRESS_VERSION)
    }

    /// Decode a Base58Check address, checking length, version and checksum
    pub fn from_base58_with_version(s: &str, version: u8) -> Result<Self, ParseError> {
        let (actual, payload) = decode_check(s)?;
        if payload.len() != ADDRESS_LEN {
            return Err(ParseError::InvalidLength {
                expected: ADDRESS_LEN + 5,
                actual: payload.len() + 5,
            });
        }
        if actual != version {
            return Err(ParseError::WrongVersion {
                expected: version,
                actual,
            });
        }
        Self::from_slice(&payload)
    }

    /// Byte-reversed hex form
    pub fn to_hex_string(&self) -> String {
        encode_reversed_hex(&self.0)
    }

    pub fn from_hex_string(s: &str) -> Result<Self, ParseError> {
        decode_reversed_hex::<ADDRESS_LEN>(s).map(Address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_base58())
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Serializable for Address {
    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_bytes(&self.0);
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self, CodecError> {
        reader.read_fixed::<ADDRESS_LEN>().map(Address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_h256_reversed_hex() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xAB;
        let hash = H256(bytes);
        let text = hash.to_string();
        assert!(text.ends_with("ab"));
        assert!(text.starts_with("00"));

        assert_eq!(text.parse::<H256>().unwrap(), hash);
        assert_eq!(format!("0x{}", text).parse::<H256>().unwrap(), hash);
    }

    #[test]
    fn test_h256_rejects_wrong_length() {
        assert_eq!(
            "abcd".parse::<H256>(),
            Err(ParseError::InvalidLength {
                expected: 32,
                actual: 2
            })
        );
        assert!(matches!("xyz".parse::<H256>(), Err(ParseError::InvalidHex(_))));
    }

    #[test]
    fn test_address_base58_round_trip() {
        let address = Address::from_vm_code(b"some contract code");
        let encoded = address.to_base58();
        assert!(encoded.starts_with('A'));
        assert_eq!(Address::from_base58(&encoded).unwrap(), address);
    }

    #[test]
    fn test_address_known_vector() {
        let address = Address::from_hex_string("0100000000000000000000000000000000000000").unwrap();
        assert_eq!(address.0[19], 0x01);
        assert_eq!(address.to_base58(), "AFmseVrdL9f9oyCzZefL9tG6UbvhUMqNMV");
    }

    #[test]
    fn test_address_wrong_version() {
        let address = Address::from_vm_code(b"code");
        let other = address.to_base58_with_version(0x42);
        assert_eq!(
            Address::from_base58(&other),
            Err(ParseError::WrongVersion {
                expected: ADDRESS_VERSION,
                actual: 0x42
            })
        );
    }

    #[test]
    fn test_address_wrong_length() {
        let encoded = encode_check(ADDRESS_VERSION, &[0x01; 19]);
        assert!(matches!(
            Address::from_base58(&encoded),
            Err(ParseError::InvalidLength { .. })
        ));
    }

    #[test]
    fn test_address_serde_as_base58() {
        let address = Address::from_vm_code(b"serde");
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, format!("\"{}\"", address.to_base58()));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);
    }
}
