//! Transaction attributes

use serde_json::{json, Value};

use crate::io::{BinaryReader, BinaryWriter, CodecError, Serializable};

/// Largest attribute payload accepted when decoding
pub const MAX_ATTRIBUTE_DATA: u64 = 255;

/// What an attribute's data means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AttributeUsage {
    Nonce = 0x00,
    Script = 0x20,
    DescriptionUrl = 0x81,
    Description = 0x90,
}

impl AttributeUsage {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(AttributeUsage::Nonce),
            0x20 => Some(AttributeUsage::Script),
            0x81 => Some(AttributeUsage::DescriptionUrl),
            0x90 => Some(AttributeUsage::Description),
            _ => None,
        }
    }
}

/// A tagged blob attached to a transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub usage: AttributeUsage,
    pub data: Vec<u8>,
}

impl Attribute {
    pub fn new(usage: AttributeUsage, data: Vec<u8>) -> Self {
        Self { usage, data }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "Usage": self.usage as u8,
            "Data": hex::encode(&self.data),
        })
    }
}

impl Serializable for Attribute {
    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_u8(self.usage as u8);
        writer.write_var_bytes(&self.data);
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self, CodecError> {
        let offset = reader.position();
        let tag = reader.read_u8()?;
        let usage = AttributeUsage::from_byte(tag).ok_or(CodecError::UnknownTag {
            offset,
            tag,
            kind: "attribute usage",
        })?;
        let data = reader.read_var_bytes(MAX_ATTRIBUTE_DATA)?;
        Ok(Attribute { usage, data })
    }
}
