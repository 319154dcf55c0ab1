//! Verification and invocation programs
//!
//! A verification program describes who may sign for an address: one
//! public key followed by `CHECKSIG`, or `m`, the sorted keys, `n` and
//! `CHECKMULTISIG`. The paired invocation program pushes the signatures.

use super::builder::{int_from_script_bytes, ScriptBuilder};
use super::opcodes::OpCode;
use super::ScriptError;
use crate::crypto::keys::sort_public_keys;
use crate::io::{BinaryReader, CodecError};

/// Largest key set a multisig program may name
pub const MULTI_SIG_MAX_PUBKEY_SIZE: usize = 1024;

/// Signer description recovered from a verification program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInfo {
    pub public_keys: Vec<Vec<u8>>,
    pub m: usize,
}

/// Invocation program: signatures sorted by hex and pushed in order
pub fn program_from_params(signatures: &[Vec<u8>]) -> Vec<u8> {
    let mut sorted = signatures.to_vec();
    sorted.sort_by_key(|s| hex::encode(s));
    let mut builder = ScriptBuilder::new();
    for signature in &sorted {
        builder.emit_push_bytes(signature);
    }
    builder.into_bytes()
}

/// Single-key verification program
pub fn program_from_pubkey(public_key: &[u8]) -> Vec<u8> {
    let mut builder = ScriptBuilder::new();
    builder.emit_push_bytes(public_key).emit(OpCode::CheckSig);
    builder.into_bytes()
}

/// Check `1 <= m <= n <= MULTI_SIG_MAX_PUBKEY_SIZE`
pub fn validate_threshold(m: usize, n: usize) -> Result<(), ScriptError> {
    if m == 0 || m > n || n > MULTI_SIG_MAX_PUBKEY_SIZE {
        return Err(ScriptError::ParamError(format!(
            "invalid multisig threshold {} of {} keys",
            m, n
        )));
    }
    Ok(())
}

/// M-of-N verification program over the canonically sorted key set
pub fn program_from_multi_pubkey(m: usize, public_keys: &[Vec<u8>]) -> Result<Vec<u8>, ScriptError> {
    validate_threshold(m, public_keys.len())?;
    let sorted = sort_public_keys(public_keys)?;

    let mut builder = ScriptBuilder::new();
    builder.emit_push_integer(m as i128);
    for key in &sorted {
        builder.emit_push_bytes(key);
    }
    builder
        .emit_push_integer(sorted.len() as i128)
        .emit(OpCode::CheckMultiSig);
    Ok(builder.into_bytes())
}

/// One pushed item of a program
enum Pushed {
    SmallInt(i64),
    Data(Vec<u8>),
}

/// Read one data push, reporting a non-push opcode as a malformed script
fn read_data_push(reader: &mut BinaryReader<'_>) -> Result<Vec<u8>, ScriptError> {
    reader.read_push_bytes().map_err(|e| match e {
        CodecError::InvalidData { offset, reason } => {
            ScriptError::MalformedScript { offset, reason }
        }
        other => other.into(),
    })
}

fn read_pushed(reader: &mut BinaryReader<'_>) -> Result<Pushed, ScriptError> {
    let offset = reader.position();
    let byte = reader.peek_u8().ok_or(ScriptError::MalformedScript {
        offset,
        reason: "unexpected end of script".to_string(),
    })?;

    if let Some(value) = OpCode::small_int(byte) {
        reader.read_u8()?;
        return Ok(Pushed::SmallInt(value));
    }
    if byte <= OpCode::PushData4 as u8 {
        return Ok(Pushed::Data(read_data_push(reader)?));
    }
    Err(ScriptError::MalformedScript {
        offset,
        reason: format!("unexpected opcode {:#04x}", byte),
    })
}

fn pushed_count(item: Pushed, offset: usize) -> Result<usize, ScriptError> {
    let value = match item {
        Pushed::SmallInt(v) => i128::from(v),
        Pushed::Data(bytes) => int_from_script_bytes(&bytes)?,
    };
    usize::try_from(value).map_err(|_| ScriptError::MalformedScript {
        offset,
        reason: format!("negative count {}", value),
    })
}

/// Recover the key set and threshold from a verification program
pub fn get_program_info(program: &[u8]) -> Result<ProgramInfo, ScriptError> {
    let (&last, body) = program.split_last().ok_or(ScriptError::MalformedScript {
        offset: 0,
        reason: "empty program".to_string(),
    })?;

    match OpCode::from_byte(last) {
        Some(OpCode::CheckSig) => {
            let mut reader = BinaryReader::new(body);
            let public_key = read_data_push(&mut reader)?;
            reader.ensure_consumed()?;
            Ok(ProgramInfo {
                public_keys: vec![public_key],
                m: 1,
            })
        }
        Some(OpCode::CheckMultiSig) => {
            let mut reader = BinaryReader::new(body);
            let mut items = Vec::new();
            while !reader.is_empty() {
                items.push((reader.position(), read_pushed(&mut reader)?));
            }
            if items.len() < 3 {
                return Err(ScriptError::MalformedScript {
                    offset: 0,
                    reason: "multisig program needs m, keys and n".to_string(),
                });
            }

            let (n_offset, n_item) = items.remove(items.len() - 1);
            let (m_offset, m_item) = items.remove(0);
            let n = pushed_count(n_item, n_offset)?;
            let m = pushed_count(m_item, m_offset)?;

            let public_keys = items
                .into_iter()
                .map(|(offset, item)| match item {
                    Pushed::Data(key) => Ok(key),
                    Pushed::SmallInt(_) => Err(ScriptError::MalformedScript {
                        offset,
                        reason: "expected a public key push".to_string(),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?;

            if public_keys.len() != n {
                return Err(ScriptError::MalformedScript {
                    offset: n_offset,
                    reason: format!("program declares {} keys but pushes {}", n, public_keys.len()),
                });
            }
            validate_threshold(m, n)?;
            Ok(ProgramInfo { public_keys, m })
        }
        _ => Err(ScriptError::MalformedScript {
            offset: program.len() - 1,
            reason: format!("unexpected final opcode {:#04x}", last),
        }),
    }
}

/// Signatures pushed by an invocation program
pub fn get_param_info(program: &[u8]) -> Result<Vec<Vec<u8>>, ScriptError> {
    let mut reader = BinaryReader::new(program);
    let mut signatures = Vec::new();
    while !reader.is_empty() {
        signatures.push(read_data_push(&mut reader)?);
    }
    Ok(signatures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::{KeyPair, Signer};

    fn keys(n: u8) -> Vec<Vec<u8>> {
        (1..=n)
            .map(|b| {
                KeyPair::from_private_key_hex(&hex::encode([b; 32]))
                    .unwrap()
                    .public_key()
            })
            .collect()
    }

    #[test]
    fn test_single_key_program() {
        let key = keys(1).remove(0);
        let program = program_from_pubkey(&key);
        assert_eq!(program.len(), 35);
        assert_eq!(program[0], 33);
        assert_eq!(program[34], OpCode::CheckSig as u8);

        let info = get_program_info(&program).unwrap();
        assert_eq!(info, ProgramInfo { public_keys: vec![key], m: 1 });
    }

    #[test]
    fn test_multisig_round_trip() {
        let set = keys(5);
        let program = program_from_multi_pubkey(3, &set).unwrap();
        assert_eq!(program[0], OpCode::Push3 as u8);
        assert_eq!(program[program.len() - 2], OpCode::Push5 as u8);

        let info = get_program_info(&program).unwrap();
        assert_eq!(info.m, 3);
        assert_eq!(info.public_keys, sort_public_keys(&set).unwrap());
    }

    #[test]
    fn test_multisig_program_ignores_input_order() {
        let set = keys(4);
        let mut reversed = set.clone();
        reversed.reverse();
        assert_eq!(
            program_from_multi_pubkey(2, &set).unwrap(),
            program_from_multi_pubkey(2, &reversed).unwrap()
        );
    }

    #[test]
    fn test_large_threshold_round_trip() {
        let set = keys(18);
        let program = program_from_multi_pubkey(17, &set).unwrap();
        assert_eq!(&program[..2], &[0x01, 0x11]);

        let info = get_program_info(&program).unwrap();
        assert_eq!(info.m, 17);
        assert_eq!(info.public_keys.len(), 18);
    }

    #[test]
    fn test_max_key_count_round_trip() {
        let set: Vec<Vec<u8>> = (0..MULTI_SIG_MAX_PUBKEY_SIZE)
            .map(|_| KeyPair::generate().public_key())
            .collect();
        let program = program_from_multi_pubkey(1000, &set).unwrap();
        assert_eq!(&program[..3], &[0x02, 0xE8, 0x03]);
        assert_eq!(&program[program.len() - 4..], &[0x02, 0x00, 0x04, 0xAE]);

        let info = get_program_info(&program).unwrap();
        assert_eq!(info.m, 1000);
        assert_eq!(info.public_keys, sort_public_keys(&set).unwrap());
    }

    #[test]
    fn test_threshold_validation() {
        let set = keys(2);
        for m in [0, 3] {
            assert!(matches!(
                program_from_multi_pubkey(m, &set),
                Err(ScriptError::ParamError(_))
            ));
        }
        assert!(validate_threshold(1, MULTI_SIG_MAX_PUBKEY_SIZE).is_ok());
        assert!(validate_threshold(1, MULTI_SIG_MAX_PUBKEY_SIZE + 1).is_err());
    }

    #[test]
    fn test_params_program_sorts_by_hex() {
        let program = program_from_params(&[vec![0x02, 0x01], vec![0x01, 0xFF]]);
        assert_eq!(program, vec![0x02, 0x01, 0xFF, 0x02, 0x02, 0x01]);
        assert_eq!(
            get_param_info(&program).unwrap(),
            vec![vec![0x01, 0xFF], vec![0x02, 0x01]]
        );
    }

    #[test]
    fn test_malformed_programs() {
        assert!(matches!(
            get_program_info(&[]),
            Err(ScriptError::MalformedScript { .. })
        ));
        assert!(matches!(
            get_program_info(&[0x51, 0x66]),
            Err(ScriptError::MalformedScript { .. })
        ));
        // declares two keys, pushes one
        let key = keys(1).remove(0);
        let mut builder = ScriptBuilder::new();
        builder
            .emit_push_integer(1)
            .emit_push_bytes(&key)
            .emit_push_integer(2)
            .emit(OpCode::CheckMultiSig);
        assert!(matches!(
            get_program_info(&builder.into_bytes()),
            Err(ScriptError::MalformedScript { .. })
        ));
    }

    #[test]
    fn test_non_push_opcode_is_malformed() {
        let mut invocation = vec![0x51];
        invocation.extend([0xAB; 81]);
        assert!(matches!(
            get_param_info(&invocation),
            Err(ScriptError::MalformedScript { offset: 0, .. })
        ));

        let mut verification = vec![0x51];
        verification.extend(keys(1).remove(0));
        verification.push(OpCode::CheckSig as u8);
        assert!(matches!(
            get_program_info(&verification),
            Err(ScriptError::MalformedScript { offset: 0, .. })
        ));
    }
}
