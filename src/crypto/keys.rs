//! Key types, signature schemes and the canonical public-key order
//!
//! Public keys on this chain are secp256r1 points (raw SEC1, or prefixed
//! with a key-type label and a curve label), SM2 points (always prefixed)
//! or Ed25519 keys. Multisig scripts embed keys in a canonical order:
//! first by key-type label, then by affine point (X, then Y) for curve
//! keys, else by hex string.

use std::cmp::Ordering;
use std::fmt;

use p256::ecdsa::signature::{Signer as _, Verifier as _};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use thiserror::Error;

use crate::core::types::Address;
use crate::io::{BinaryReader, BinaryWriter, CodecError, Serializable};

/// Errors that can occur during key operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Unsupported key type label {0:#04x}")]
    UnsupportedKeyType(u8),
    #[error("Unknown signature scheme {0}")]
    UnknownSignatureScheme(u8),
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

// ===== Key types =====

/// Public key algorithm, identified by its label byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum KeyType {
    Ecdsa = 0x12,
    Sm2 = 0x13,
    Eddsa = 0x14,
}

impl KeyType {
    pub fn from_label(label: u8) -> Option<Self> {
        match label {
            0x12 => Some(KeyType::Ecdsa),
            0x13 => Some(KeyType::Sm2),
            0x14 => Some(KeyType::Eddsa),
            _ => None,
        }
    }

    pub fn label(self) -> u8 {
        self as u8
    }

    /// Detect the key type of a serialized public key
    ///
    /// Raw 33/65 byte SEC1 points are secp256r1; anything else carries its
    /// key-type label in the first byte.
    pub fn from_public_key(public_key: &[u8]) -> Result<Self, KeyError> {
        match public_key.len() {
            0 => Err(KeyError::InvalidPublicKey("empty".to_string())),
            33 | 65 => Ok(KeyType::Ecdsa),
            _ => Self::from_label(public_key[0])
                .ok_or(KeyError::UnsupportedKeyType(public_key[0])),
        }
    }
}

/// Signature algorithm; its ordinal prefixes every signature on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SignatureScheme {
    Sha224WithEcdsa = 0,
    Sha256WithEcdsa = 1,
    Sha384WithEcdsa = 2,
    Sha512WithEcdsa = 3,
    Sha3_224WithEcdsa = 4,
    Sha3_256WithEcdsa = 5,
    Sha3_384WithEcdsa = 6,
    Sha3_512WithEcdsa = 7,
    Ripemd160WithEcdsa = 8,
    Sm3WithSm2 = 9,
}

impl SignatureScheme {
    pub fn from_byte(byte: u8) -> Result<Self, KeyError> {
        let scheme = match byte {
            0 => SignatureScheme::Sha224WithEcdsa,
            1 => SignatureScheme::Sha256WithEcdsa,
            2 => SignatureScheme::Sha384WithEcdsa,
            3 => SignatureScheme::Sha512WithEcdsa,
            4 => SignatureScheme::Sha3_224WithEcdsa,
            5 => SignatureScheme::Sha3_256WithEcdsa,
            6 => SignatureScheme::Sha3_384WithEcdsa,
            7 => SignatureScheme::Sha3_512WithEcdsa,
            8 => SignatureScheme::Ripemd160WithEcdsa,
            9 => SignatureScheme::Sm3WithSm2,
            other => return Err(KeyError::UnknownSignatureScheme(other)),
        };
        Ok(scheme)
    }

    pub fn name(self) -> &'static str {
        match self {
            SignatureScheme::Sha224WithEcdsa => "SHA224withECDSA",
            SignatureScheme::Sha256WithEcdsa => "SHA256withECDSA",
            SignatureScheme::Sha384WithEcdsa => "SHA384withECDSA",
            SignatureScheme::Sha512WithEcdsa => "SHA512withECDSA",
            SignatureScheme::Sha3_224WithEcdsa => "SHA3-224withECDSA",
            SignatureScheme::Sha3_256WithEcdsa => "SHA3-256withECDSA",
            SignatureScheme::Sha3_384WithEcdsa => "SHA3-384withECDSA",
            SignatureScheme::Sha3_512WithEcdsa => "SHA3-512withECDSA",
            SignatureScheme::Ripemd160WithEcdsa => "RIPEMD160withECDSA",
            SignatureScheme::Sm3WithSm2 => "SM3withSM2",
        }
    }
}

impl fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ===== Signing capability =====

/// A signing capability supplied by the caller (wallet, HSM, test key)
///
/// `sign` receives the message to sign, which for transactions is the
/// double-SHA-256 of the unsigned encoding, and returns the scheme byte
/// followed by the raw signature.
pub trait Signer {
    fn public_key(&self) -> Vec<u8>;

    fn scheme(&self) -> SignatureScheme;

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, KeyError>;
}

/// A secp256r1 key pair signing with SHA256withECDSA
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Create a key pair from a hex-encoded 32-byte private key
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_key).map_err(|_| KeyError::InvalidPrivateKey)?;
        let signing_key =
            SigningKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    pub fn private_key_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    /// Compressed SEC1 public key as hex
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key())
    }

    /// Single-key address of this key pair
    pub fn address(&self) -> Address {
        Address::from_pubkey(&self.public_key())
    }

    /// Verify a scheme-prefixed signature against this key pair's public key
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, KeyError> {
        verify_signature(&self.public_key(), message, signature)
    }
}

impl Signer for KeyPair {
    fn public_key(&self) -> Vec<u8> {
        VerifyingKey::from(&self.signing_key)
            .to_encoded_point(true)
            .as_bytes()
            .to_vec()
    }

    fn scheme(&self) -> SignatureScheme {
        SignatureScheme::Sha256WithEcdsa
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, KeyError> {
        let signature: Signature = self
            .signing_key
            .try_sign(message)
            .map_err(|e| KeyError::SigningFailed(e.to_string()))?;
        let mut out = Vec::with_capacity(65);
        out.push(self.scheme() as u8);
        out.extend_from_slice(&signature.to_bytes());
        Ok(out)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key_hex())
            .finish()
    }
}

/// Verify a SHA256withECDSA signature made by a secp256r1 key
///
/// A 65-byte signature carries the scheme byte in front; 64 bytes are a
/// bare `r || s`.
pub fn verify_signature(
    public_key: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Result<bool, KeyError> {
    let raw = match signature.len() {
        64 => signature,
        65 => {
            let scheme = SignatureScheme::from_byte(signature[0])?;
            if scheme != SignatureScheme::Sha256WithEcdsa {
                return Ok(false);
            }
            &signature[1..]
        }
        _ => return Err(KeyError::InvalidSignature),
    };

    let point = ecdsa_point_bytes(public_key)?;
    let verifying_key = VerifyingKey::from_sec1_bytes(point)
        .map_err(|e| KeyError::InvalidPublicKey(e.to_string()))?;
    let sig = Signature::from_slice(raw).map_err(|_| KeyError::InvalidSignature)?;

    Ok(verifying_key.verify(message, &sig).is_ok())
}

/// Strip the key-type and curve labels from a prefixed ECDSA key
fn ecdsa_point_bytes(public_key: &[u8]) -> Result<&[u8], KeyError> {
    match KeyType::from_public_key(public_key)? {
        KeyType::Ecdsa if matches!(public_key.len(), 33 | 65) => Ok(public_key),
        KeyType::Ecdsa if public_key.len() > 2 => Ok(&public_key[2..]),
        KeyType::Ecdsa => Err(KeyError::InvalidPublicKey("truncated".to_string())),
        other => Err(KeyError::UnsupportedKeyType(other.label())),
    }
}

// ===== Canonical ordering =====

/// Position of a key within its key-type group
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum PointKey {
    Infinity,
    Affine { x: Vec<u8>, y: Vec<u8> },
    Hex(String),
}

fn affine_from_p256(body: &[u8]) -> Result<PointKey, KeyError> {
    if body == [0x00] {
        return Ok(PointKey::Infinity);
    }
    let public = p256::PublicKey::from_sec1_bytes(body)
        .map_err(|e| KeyError::InvalidPublicKey(e.to_string()))?;
    let encoded = public.to_encoded_point(false);
    match (encoded.x(), encoded.y()) {
        (Some(x), Some(y)) => Ok(PointKey::Affine {
            x: x.to_vec(),
            y: y.to_vec(),
        }),
        _ => Ok(PointKey::Infinity),
    }
}

fn affine_from_sm2(body: &[u8]) -> Result<PointKey, KeyError> {
    if body == [0x00] {
        return Ok(PointKey::Infinity);
    }
    let public = sm2::PublicKey::from_sec1_bytes(body)
        .map_err(|e| KeyError::InvalidPublicKey(e.to_string()))?;
    let encoded = public.to_encoded_point(false);
    match (encoded.x(), encoded.y()) {
        (Some(x), Some(y)) => Ok(PointKey::Affine {
            x: x.to_vec(),
            y: y.to_vec(),
        }),
        _ => Ok(PointKey::Infinity),
    }
}

/// Sort key of a public key: (type label, position within the type)
fn sort_key(public_key: &[u8]) -> Result<(u8, PointKey), KeyError> {
    if public_key.is_empty() {
        return Err(KeyError::InvalidPublicKey("empty".to_string()));
    }
    match KeyType::from_public_key(public_key) {
        Ok(KeyType::Ecdsa) => Ok((
            KeyType::Ecdsa.label(),
            affine_from_p256(ecdsa_point_bytes(public_key)?)?,
        )),
        Ok(KeyType::Sm2) => {
            if public_key.len() <= 2 {
                return Err(KeyError::InvalidPublicKey("truncated".to_string()));
            }
            Ok((KeyType::Sm2.label(), affine_from_sm2(&public_key[2..])?))
        }
        Ok(KeyType::Eddsa) => Ok((KeyType::Eddsa.label(), PointKey::Hex(hex::encode(public_key)))),
        Err(_) => Ok((public_key[0], PointKey::Hex(hex::encode(public_key)))),
    }
}

/// Compare two public keys in canonical multisig order
pub fn compare_public_keys(a: &[u8], b: &[u8]) -> Result<Ordering, KeyError> {
    Ok(sort_key(a)?.cmp(&sort_key(b)?))
}

/// Sort public keys into canonical multisig order
///
/// Fails if any curve key does not decode to a point on its curve.
pub fn sort_public_keys(keys: &[Vec<u8>]) -> Result<Vec<Vec<u8>>, KeyError> {
    let mut keyed = keys
        .iter()
        .map(|k| sort_key(k).map(|sk| (sk, k.clone())))
        .collect::<Result<Vec<_>, _>>()?;
    keyed.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    Ok(keyed.into_iter().map(|(_, k)| k).collect())
}

// ===== Affine points in payloads =====

/// A secp256r1 point in affine form, as carried by consensus payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EcPoint {
    pub x: [u8; 32],
    pub y: [u8; 32],
}

impl EcPoint {
    /// Decode a SEC1 (compressed or uncompressed) secp256r1 public key
    pub fn from_public_key(public_key: &[u8]) -> Result<Self, KeyError> {
        match affine_from_p256(ecdsa_point_bytes(public_key)?)? {
            PointKey::Affine { x, y } => {
                let mut point = EcPoint {
                    x: [0u8; 32],
                    y: [0u8; 32],
                };
                point.x.copy_from_slice(&x);
                point.y.copy_from_slice(&y);
                Ok(point)
            }
            _ => Err(KeyError::InvalidPublicKey("point at infinity".to_string())),
        }
    }

    /// Compressed SEC1 encoding
    pub fn to_compressed(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(33);
        out.push(0x02 | (self.y[31] & 0x01));
        out.extend_from_slice(&self.x);
        out
    }
}

/// Coordinate as a minimal two's-complement big-endian integer, without the
/// sign byte when the value fills all 32 bytes
fn encode_coordinate(value: &[u8; 32]) -> Vec<u8> {
    let start = value.iter().position(|&b| b != 0).unwrap_or(value.len());
    let magnitude = &value[start..];
    if magnitude.is_empty() {
        return vec![0x00];
    }
    let mut out = Vec::with_capacity(magnitude.len() + 1);
    if magnitude[0] & 0x80 != 0 && magnitude.len() < 32 {
        out.push(0x00);
    }
    out.extend_from_slice(magnitude);
    out
}

fn decode_coordinate(reader: &mut BinaryReader<'_>) -> Result<[u8; 32], CodecError> {
    let offset = reader.position();
    let bytes = reader.read_var_bytes(33)?;
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    let magnitude = &bytes[start..];
    if magnitude.len() > 32 {
        return Err(CodecError::InvalidData {
            offset,
            reason: "curve coordinate wider than 32 bytes".to_string(),
        });
    }
    let mut out = [0u8; 32];
    out[32 - magnitude.len()..].copy_from_slice(magnitude);
    Ok(out)
}

impl Serializable for EcPoint {
    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_var_bytes(&encode_coordinate(&self.x));
        writer.write_var_bytes(&encode_coordinate(&self.y));
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self, CodecError> {
        let x = decode_coordinate(reader)?;
        let y = decode_coordinate(reader)?;
        Ok(EcPoint { x, y })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::hash256;

    fn fixed_key(byte: u8) -> KeyPair {
        KeyPair::from_private_key_hex(&hex::encode([byte; 32])).unwrap()
    }

    #[test]
    fn test_key_pair_from_hex() {
        let kp1 = KeyPair::generate();
        let kp2 = KeyPair::from_private_key_hex(&kp1.private_key_hex()).unwrap();
        assert_eq!(kp1.public_key_hex(), kp2.public_key_hex());
        assert_eq!(kp1.address(), kp2.address());
        assert_eq!(kp1.public_key().len(), 33);
    }

    #[test]
    fn test_sign_and_verify() {
        let kp = KeyPair::generate();
        let digest = hash256(b"Hello, ontology!");

        let signature = kp.sign(&digest).unwrap();
        assert_eq!(signature.len(), 65);
        assert_eq!(signature[0], SignatureScheme::Sha256WithEcdsa as u8);
        assert!(kp.verify(&digest, &signature).unwrap());
        assert!(!kp.verify(&hash256(b"other"), &signature).unwrap());
    }

    #[test]
    fn test_invalid_private_key() {
        assert_eq!(
            KeyPair::from_private_key_hex("zz").unwrap_err(),
            KeyError::InvalidPrivateKey
        );
        assert_eq!(
            KeyPair::from_private_key_hex(&"00".repeat(32)).unwrap_err(),
            KeyError::InvalidPrivateKey
        );
    }

    #[test]
    fn test_key_type_detection() {
        assert_eq!(KeyType::from_public_key(&[0x02; 33]).unwrap(), KeyType::Ecdsa);
        assert_eq!(KeyType::from_public_key(&[0x13; 35]).unwrap(), KeyType::Sm2);
        assert_eq!(KeyType::from_public_key(&[0x14; 34]).unwrap(), KeyType::Eddsa);
        assert_eq!(
            KeyType::from_public_key(&[0x99; 10]).unwrap_err(),
            KeyError::UnsupportedKeyType(0x99)
        );
    }

    #[test]
    fn test_sort_is_order_independent_and_idempotent() {
        let keys: Vec<Vec<u8>> = (1u8..=5).map(|b| fixed_key(b).public_key()).collect();
        let sorted = sort_public_keys(&keys).unwrap();

        let mut reversed = keys.clone();
        reversed.reverse();
        assert_eq!(sort_public_keys(&reversed).unwrap(), sorted);
        assert_eq!(sort_public_keys(&sorted).unwrap(), sorted);

        for pair in sorted.windows(2) {
            let a = EcPoint::from_public_key(&pair[0]).unwrap();
            let b = EcPoint::from_public_key(&pair[1]).unwrap();
            assert!((a.x, a.y) <= (b.x, b.y));
        }
    }

    #[test]
    fn test_sort_compressed_and_uncompressed_agree() {
        let a = fixed_key(7);
        let point = EcPoint::from_public_key(&a.public_key()).unwrap();
        let mut uncompressed = vec![0x04];
        uncompressed.extend_from_slice(&point.x);
        uncompressed.extend_from_slice(&point.y);

        assert_eq!(
            compare_public_keys(&a.public_key(), &uncompressed).unwrap(),
            Ordering::Equal
        );
    }

    #[test]
    fn test_sort_groups_by_type_label() {
        let ecdsa = fixed_key(3).public_key();
        let mut eddsa = vec![KeyType::Eddsa.label(), 0x50];
        eddsa.extend_from_slice(&[0x00; 32]);
        let mut eddsa_high = vec![KeyType::Eddsa.label(), 0x50];
        eddsa_high.extend_from_slice(&[0x01; 32]);

        let sorted =
            sort_public_keys(&[eddsa_high.clone(), eddsa.clone(), ecdsa.clone()]).unwrap();
        assert_eq!(sorted, vec![ecdsa, eddsa, eddsa_high]);
    }

    fn sm2_key() -> (Vec<u8>, Vec<u8>) {
        let public = sm2::SecretKey::random(&mut OsRng).public_key();
        let mut key = vec![KeyType::Sm2.label(), 0x14];
        key.extend_from_slice(public.to_encoded_point(true).as_bytes());
        let point = public.to_encoded_point(false);
        let mut xy = point.x().unwrap().to_vec();
        xy.extend_from_slice(point.y().unwrap());
        (key, xy)
    }

    #[test]
    fn test_sort_sm2_keys() {
        let pairs: Vec<(Vec<u8>, Vec<u8>)> = (0..6).map(|_| sm2_key()).collect();
        let keys: Vec<Vec<u8>> = pairs.iter().map(|(k, _)| k.clone()).collect();
        let sorted = sort_public_keys(&keys).unwrap();

        let mut reversed = keys.clone();
        reversed.reverse();
        assert_eq!(sort_public_keys(&reversed).unwrap(), sorted);
        assert_eq!(sort_public_keys(&sorted).unwrap(), sorted);

        let mut by_point = pairs.clone();
        by_point.sort_by(|a, b| a.1.cmp(&b.1));
        let expected: Vec<Vec<u8>> = by_point.into_iter().map(|(k, _)| k).collect();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_sort_mixed_key_types() {
        let raw = fixed_key(4).public_key();
        let mut labelled = vec![KeyType::Ecdsa.label(), 0x02];
        labelled.extend_from_slice(&fixed_key(5).public_key());
        let (sm2_a, _) = sm2_key();
        let (sm2_b, _) = sm2_key();

        let sorted = sort_public_keys(&[
            sm2_a.clone(),
            labelled.clone(),
            sm2_b.clone(),
            raw.clone(),
        ])
        .unwrap();
        assert_eq!(sorted.len(), 4);
        for key in &sorted[..2] {
            assert!(key == &raw || key == &labelled);
        }
        for key in &sorted[2..] {
            assert!(key == &sm2_a || key == &sm2_b);
        }

        // a labelled key sorts by its point, like the raw encoding
        assert_eq!(
            compare_public_keys(&labelled, &raw).unwrap(),
            compare_public_keys(&fixed_key(5).public_key(), &raw).unwrap()
        );
        assert_eq!(
            compare_public_keys(&labelled, &fixed_key(5).public_key()).unwrap(),
            Ordering::Equal
        );
    }

    #[test]
    fn test_sort_rejects_off_curve_key() {
        let mut bogus = vec![0x02];
        bogus.extend_from_slice(&[0xFF; 32]);
        assert!(matches!(
            sort_public_keys(&[bogus]),
            Err(KeyError::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn test_ec_point_encoding() {
        let point = EcPoint::from_public_key(&fixed_key(9).public_key()).unwrap();
        let decoded = EcPoint::from_bytes(&point.to_bytes()).unwrap();
        assert_eq!(decoded, point);
        assert_eq!(decoded.to_compressed(), fixed_key(9).public_key());
    }

    #[test]
    fn test_coordinate_minimal_form() {
        let mut small = [0u8; 32];
        small[31] = 0x05;
        assert_eq!(encode_coordinate(&small), vec![0x05]);

        let mut high_bit = [0u8; 32];
        high_bit[1] = 0x80;
        let encoded = encode_coordinate(&high_bit);
        assert_eq!(encoded.len(), 32);
        assert_eq!(encoded[0], 0x00);

        assert_eq!(encode_coordinate(&[0xFF; 32]).len(), 32);
        assert_eq!(encode_coordinate(&[0u8; 32]), vec![0x00]);
    }
}
