//! Signature entries of a transaction
//!
//! Each entry pairs an invocation program (the signatures) with a
//! verification program (the key set and threshold). Entries are
//! immutable; adding a signature produces a new entry.

use serde_json::{json, Value};

use crate::crypto::keys::sort_public_keys;
use crate::io::{BinaryReader, BinaryWriter, CodecError, Serializable, MAX_VAR_BYTES};
use crate::script::program::{
    get_param_info, get_program_info, program_from_multi_pubkey, program_from_params,
    program_from_pubkey, validate_threshold,
};
use crate::script::ScriptError;

/// One signer group: `m` of `public_keys` and the signatures gathered so far
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sig {
    m: usize,
    public_keys: Vec<Vec<u8>>,
    sig_data: Vec<Vec<u8>>,
    verification: Vec<u8>,
}

impl Sig {
    /// Build an entry, validating the threshold and encoding the key set
    ///
    /// Multi-key sets are stored in canonical order.
    pub fn new(
        m: usize,
        public_keys: Vec<Vec<u8>>,
        sig_data: Vec<Vec<u8>>,
    ) -> Result<Self, ScriptError> {
        validate_threshold(m, public_keys.len())?;
        let (public_keys, verification) = if public_keys.len() == 1 {
            let verification = program_from_pubkey(&public_keys[0]);
            (public_keys, verification)
        } else {
            let sorted = sort_public_keys(&public_keys)?;
            let verification = program_from_multi_pubkey(m, &sorted)?;
            (sorted, verification)
        };
        Ok(Self {
            m,
            public_keys,
            sig_data,
            verification,
        })
    }

    pub fn m(&self) -> usize {
        self.m
    }

    pub fn public_keys(&self) -> &[Vec<u8>] {
        &self.public_keys
    }

    pub fn sig_data(&self) -> &[Vec<u8>] {
        &self.sig_data
    }

    /// Script pushing the signatures
    pub fn invocation_script(&self) -> Vec<u8> {
        program_from_params(&self.sig_data)
    }

    /// Script describing the key set
    pub fn verification_script(&self) -> &[u8] {
        &self.verification
    }

    /// Copy of this entry with one more signature
    pub fn with_signature(&self, signature: Vec<u8>) -> Self {
        let mut next = self.clone();
        next.sig_data.push(signature);
        next
    }

    pub fn to_json(&self) -> Value {
        json!({
            "M": self.m,
            "PubKeys": self.public_keys.iter().map(hex::encode).collect::<Vec<_>>(),
            "SigData": self.sig_data.iter().map(hex::encode).collect::<Vec<_>>(),
        })
    }
}

fn script_error(offset: usize, err: ScriptError) -> CodecError {
    CodecError::InvalidData {
        offset,
        reason: err.to_string(),
    }
}

impl Serializable for Sig {
    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_var_bytes(&self.invocation_script());
        writer.write_var_bytes(&self.verification);
    }

    fn deserialize(reader: &mut BinaryReader<'_>) -> Result<Self, CodecError> {
        let invocation_offset = reader.position();
        let invocation = reader.read_var_bytes(MAX_VAR_BYTES)?;
        let verification_offset = reader.position();
        let verification = reader.read_var_bytes(MAX_VAR_BYTES)?;

        let sig_data =
            get_param_info(&invocation).map_err(|e| script_error(invocation_offset, e))?;
        let info =
            get_program_info(&verification).map_err(|e| script_error(verification_offset, e))?;

        Ok(Sig {
            m: info.m,
            public_keys: info.public_keys,
            sig_data,
            verification,
        })
    }
}
