//! Base58Check encoding
//!
//! `version || payload || hash256(version || payload)[..4]`, rendered with
//! the Bitcoin alphabet. Leading zero bytes become leading `1` characters.

use thiserror::Error;

use super::hash::hash256;

/// Length of the trailing checksum
pub const CHECKSUM_LEN: usize = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Base58Error {
    #[error("Invalid base58 string: {0}")]
    InvalidBase58(String),
    #[error("Decoded data too short: {0} bytes")]
    TooShort(usize),
    #[error("Checksum mismatch")]
    ChecksumMismatch,
}

fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let hash = hash256(data);
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Encode `version || payload` with a trailing checksum
pub fn encode_check(version: u8, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(1 + payload.len() + CHECKSUM_LEN);
    data.push(version);
    data.extend_from_slice(payload);
    let sum = checksum(&data);
    data.extend_from_slice(&sum);
    bs58::encode(data).into_string()
}

/// Decode a Base58Check string into `(version, payload)`
pub fn decode_check(encoded: &str) -> Result<(u8, Vec<u8>), Base58Error> {
    let data = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| Base58Error::InvalidBase58(e.to_string()))?;
    if data.len() < 1 + CHECKSUM_LEN {
        return Err(Base58Error::TooShort(data.len()));
    }

    let (body, sum) = data.split_at(data.len() - CHECKSUM_LEN);
    if checksum(body) != sum {
        return Err(Base58Error::ChecksumMismatch);
    }

    Ok((body[0], body[1..].to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let payloads: [&[u8]; 4] = [b"", b"\x00\x00abc", &[0xFF; 20], b"ontology"];
        for payload in payloads {
            for version in [0x00, 0x17, 0xFF] {
                let encoded = encode_check(version, payload);
                let (v, p) = decode_check(&encoded).unwrap();
                assert_eq!(v, version);
                assert_eq!(p, payload);
            }
        }
    }

    #[test]
    fn test_leading_zeros_become_ones() {
        let encoded = encode_check(0x00, &[0x00, 0x01]);
        assert!(encoded.starts_with("11"));
    }

    #[test]
    fn test_corruption_is_detected() {
        let encoded = encode_check(0x17, &[0x42; 20]);
        let mut chars: Vec<char> = encoded.chars().collect();
        let last = chars.len() - 1;
        chars[last] = if chars[last] == 'z' { 'y' } else { 'z' };
        let corrupted: String = chars.into_iter().collect();

        assert_eq!(
            decode_check(&corrupted),
            Err(Base58Error::ChecksumMismatch)
        );
    }

    #[test]
    fn test_invalid_alphabet() {
        assert!(matches!(
            decode_check("0OIl"),
            Err(Base58Error::InvalidBase58(_))
        ));
        assert_eq!(decode_check("1"), Err(Base58Error::TooShort(1)));
    }
}
