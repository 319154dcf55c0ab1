//! Type-specific transaction payloads
//!
//! The set of transaction types is closed: each tag maps to exactly one
//! payload decoder, and an unknown tag is a decode error.

use serde_json::{json, Value};

use super::types::Address;
use crate::crypto::keys::EcPoint;
use crate::io::{BinaryReader, BinaryWriter, CodecError, MAX_ARRAY_LEN, MAX_VAR_BYTES};

/// Transaction type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TransactionType {
    Bookkeeping = 0x00,
    Bookkeeper = 0x02,
    Enrollment = 0x04,
    Vote = 0x05,
    DeployCode = 0xD0,
    InvokeCode = 0xD1,
}

impl TransactionType {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(TransactionType::Bookkeeping),
            0x02 => Some(TransactionType::Bookkeeper),
            0x04 => Some(TransactionType::Enrollment),
            0x05 => Some(TransactionType::Vote),
            0xD0 => Some(TransactionType::DeployCode),
            0xD1 => Some(TransactionType::InvokeCode),
            _ => None,
        }
    }
}

/// Whether a bookkeeper is being added or removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BookkeeperAction {
    Add = 0,
    Sub = 1,
}

/// Contract deployment details
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct DeployCode {
    pub code: Vec<u8>,
    pub need_storage: bool,
    pub name: String,
    pub version: String,
    pub author: String,
    pub email: String,
    pub description: String,
}

/// Exclusive data of a transaction, one variant per type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Payload {
    Bookkeeping {
        nonce: u64,
    },
    Bookkeeper {
        issuer: EcPoint,
        action: BookkeeperAction,
        cert: Vec<u8>,
    },
    Enrollment {
        public_key: EcPoint,
    },
    Vote {
        public_keys: Vec<EcPoint>,
        account: Address,
    },
    DeployCode(DeployCode),
    InvokeCode {
        code: Vec<u8>,
    },
}

impl Payload {
    pub fn tx_type(&self) -> TransactionType {
        match self {
            Payload::Bookkeeping { .. } => TransactionType::Bookkeeping,
            Payload::Bookkeeper { .. } => TransactionType::Bookkeeper,
            Payload::Enrollment { .. } => TransactionType::Enrollment,
            Payload::Vote { .. } => TransactionType::Vote,
            Payload::DeployCode(_) => TransactionType::DeployCode,
            Payload::InvokeCode { .. } => TransactionType::InvokeCode,
        }
    }

    pub fn serialize(&self, writer: &mut BinaryWriter) {
        match self {
            Payload::Bookkeeping { nonce } => writer.write_u64(*nonce),
            Payload::Bookkeeper {
                issuer,
                action,
                cert,
            } => {
                writer.write_serializable(issuer);
                writer.write_u8(*action as u8);
                writer.write_var_bytes(cert);
            }
            Payload::Enrollment { public_key } => writer.write_serializable(public_key),
            Payload::Vote {
                public_keys,
                account,
            } => {
                writer.write_i32(public_keys.len() as i32);
                for key in public_keys {
                    writer.write_serializable(key);
                }
                writer.write_serializable(account);
            }
            Payload::DeployCode(deploy) => {
                writer.write_var_bytes(&deploy.code);
                writer.write_bool(deploy.need_storage);
                writer.write_var_string(&deploy.name);
                writer.write_var_string(&deploy.version);
                writer.write_var_string(&deploy.author);
                writer.write_var_string(&deploy.email);
                writer.write_var_string(&deploy.description);
            }
            Payload::InvokeCode { code } => writer.write_var_bytes(code),
        }
    }

    /// Decode the payload for an already-read type tag
    pub fn deserialize(
        tx_type: TransactionType,
        reader: &mut BinaryReader<'_>,
    ) -> Result<Self, CodecError> {
        let payload = match tx_type {
            TransactionType::Bookkeeping => Payload::Bookkeeping {
                nonce: reader.read_u64()?,
            },
            TransactionType::Bookkeeper => {
                let issuer = reader.read_serializable()?;
                let offset = reader.position();
                let action = match reader.read_u8()? {
                    0 => BookkeeperAction::Add,
                    1 => BookkeeperAction::Sub,
                    tag => {
                        return Err(CodecError::UnknownTag {
                            offset,
                            tag,
                            kind: "bookkeeper action",
                        })
                    }
                };
                let cert = reader.read_var_bytes(MAX_VAR_BYTES)?;
                Payload::Bookkeeper {
                    issuer,
                    action,
                    cert,
                }
            }
            TransactionType::Enrollment => Payload::Enrollment {
                public_key: reader.read_serializable()?,
            },
            TransactionType::Vote => {
                let offset = reader.position();
                let count = reader.read_i32()?;
                if count < 0 || count as u64 > MAX_ARRAY_LEN {
                    return Err(CodecError::InvalidData {
                        offset,
                        reason: format!("invalid vote key count {}", count),
                    });
                }
                let mut public_keys = Vec::new();
                for _ in 0..count {
                    public_keys.push(reader.read_serializable()?);
                }
                Payload::Vote {
                    public_keys,
                    account: reader.read_serializable()?,
                }
            }
            TransactionType::DeployCode => Payload::DeployCode(DeployCode {
                code: reader.read_var_bytes(MAX_VAR_BYTES)?,
                need_storage: reader.read_bool()?,
                name: reader.read_var_string(MAX_VAR_BYTES)?,
                version: reader.read_var_string(MAX_VAR_BYTES)?,
                author: reader.read_var_string(MAX_VAR_BYTES)?,
                email: reader.read_var_string(MAX_VAR_BYTES)?,
                description: reader.read_var_string(MAX_VAR_BYTES)?,
            }),
            TransactionType::InvokeCode => Payload::InvokeCode {
                code: reader.read_var_bytes(MAX_VAR_BYTES)?,
            },
        };
        Ok(payload)
    }

    pub fn to_json(&self) -> Value {
        match self {
            Payload::Bookkeeping { nonce } => json!({ "Nonce": nonce }),
            Payload::Bookkeeper {
                issuer,
                action,
                cert,
            } => json!({
                "Issuer": hex::encode(issuer.to_compressed()),
                "Action": *action as u8,
                "Cert": hex::encode(cert),
            }),
            Payload::Enrollment { public_key } => json!({
                "PublicKey": hex::encode(public_key.to_compressed()),
            }),
            Payload::Vote {
                public_keys,
                account,
            } => json!({
                "PubKeys": public_keys
                    .iter()
                    .map(|k| hex::encode(k.to_compressed()))
                    .collect::<Vec<_>>(),
                "Account": account.to_base58(),
            }),
            Payload::DeployCode(deploy) => json!({
                "Code": hex::encode(&deploy.code),
                "NeedStorage": deploy.need_storage,
                "Name": deploy.name,
                "CodeVersion": deploy.version,
                "Author": deploy.author,
                "Email": deploy.email,
                "Description": deploy.description,
            }),
            Payload::InvokeCode { code } => json!({ "Code": hex::encode(code) }),
        }
    }
}
