//! Contract call parameters and their stack encoding
//!
//! Parameters are pushed in reverse so the callee pops them in source
//! order. Arrays are packed (`<items reversed> <count> PACK`), structs are
//! built on the alt stack with `NEWSTRUCT`/`APPEND`, and maps with
//! `NEWMAP`/`SETITEM`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::builder::ScriptBuilder;
use super::opcodes::OpCode;
use super::ScriptError;
use crate::core::types::{Address, H256};

/// A value passed to a contract method
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Bool(bool),
    Int(i128),
    Bytes(Vec<u8>),
    String(String),
    Address(Address),
    H256(H256),
    Array(Vec<Param>),
    Struct(Vec<Param>),
    Map(Vec<(Param, Param)>),
}

impl Param {
    fn type_name(&self) -> &'static str {
        match self {
            Param::Bool(_) => "Boolean",
            Param::Int(_) => "Integer",
            Param::Bytes(_) => "ByteArray",
            Param::String(_) => "String",
            Param::Address(_) => "Address",
            Param::H256(_) => "Hash256",
            Param::Array(_) => "Array",
            Param::Struct(_) => "Struct",
            Param::Map(_) => "Map",
        }
    }
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Param::Bool(value)
    }
}

impl From<i128> for Param {
    fn from(value: i128) -> Self {
        Param::Int(value)
    }
}

impl From<u64> for Param {
    fn from(value: u64) -> Self {
        Param::Int(i128::from(value))
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::String(value.to_string())
    }
}

impl From<Vec<u8>> for Param {
    fn from(value: Vec<u8>) -> Self {
        Param::Bytes(value)
    }
}

impl From<Address> for Param {
    fn from(value: Address) -> Self {
        Param::Address(value)
    }
}

/// Encode a parameter list into a script
pub fn build_params(params: &[Param]) -> Result<Vec<u8>, ScriptError> {
    let mut builder = ScriptBuilder::new();
    for param in params.iter().rev() {
        emit_param(&mut builder, param)?;
    }
    Ok(builder.into_bytes())
}

/// Append the encoding of one parameter to a builder
pub fn emit_param(builder: &mut ScriptBuilder, param: &Param) -> Result<(), ScriptError> {
    match param {
        Param::Bool(value) => {
            builder.emit_push_bool(*value);
        }
        Param::Int(value) => {
            builder.emit_push_integer(*value);
        }
        Param::Bytes(bytes) => {
            builder.emit_push_bytes(bytes);
        }
        Param::String(s) => {
            builder.emit_push_bytes(s.as_bytes());
        }
        Param::Address(address) => {
            builder.emit_push_bytes(address.as_bytes());
        }
        Param::H256(hash) => {
            builder.emit_push_bytes(hash.as_bytes());
        }
        Param::Array(items) => {
            for item in items.iter().rev() {
                emit_param(builder, item)?;
            }
            builder.emit_pack(items.len());
        }
        Param::Struct(fields) => {
            builder
                .emit_push_integer(0)
                .emit(OpCode::NewStruct)
                .emit(OpCode::ToAltStack);
            for field in fields {
                emit_param(builder, field)?;
                builder
                    .emit(OpCode::DupFromAltStack)
                    .emit(OpCode::Swap)
                    .emit(OpCode::Append);
            }
            builder.emit(OpCode::FromAltStack);
        }
        Param::Map(entries) => {
            builder.emit(OpCode::NewMap).emit(OpCode::ToAltStack);
            for (key, value) in entries {
                builder.emit(OpCode::DupFromAltStack);
                match key {
                    Param::Bytes(_) | Param::String(_) | Param::Int(_) | Param::Bool(_) => {
                        emit_param(builder, key)?
                    }
                    other => {
                        return Err(ScriptError::UnsupportedParamType(format!(
                            "{} as map key",
                            other.type_name()
                        )))
                    }
                }
                emit_param(builder, value)?;
                builder.emit(OpCode::SetItem);
            }
            builder.emit(OpCode::FromAltStack);
        }
    }
    Ok(())
}

// =============================================================================
// ABI descriptions
// =============================================================================

/// A method parameter as described in a contract's ABI file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiParameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    #[serde(default)]
    pub value: Value,
}

fn abi_value_error(param: &AbiParameter, expected: &str) -> ScriptError {
    ScriptError::ParamError(format!(
        "parameter '{}' of type {} needs {} value, got {}",
        param.name, param.param_type, expected, param.value
    ))
}

fn nested_parameters(param: &AbiParameter) -> Result<Vec<AbiParameter>, ScriptError> {
    serde_json::from_value(param.value.clone())
        .map_err(|_| abi_value_error(param, "a list of typed parameters as"))
}

impl AbiParameter {
    pub fn new(name: &str, param_type: &str, value: Value) -> Self {
        Self {
            name: name.to_string(),
            param_type: param_type.to_string(),
            value,
        }
    }

    /// Convert the JSON value into a typed parameter
    pub fn to_param(&self) -> Result<Param, ScriptError> {
        let param = match self.param_type.as_str() {
            "ByteArray" => {
                let text = self.value.as_str().ok_or_else(|| abi_value_error(self, "a hex string"))?;
                Param::Bytes(hex::decode(text).map_err(|_| abi_value_error(self, "a hex string"))?)
            }
            "String" => Param::String(
                self.value
                    .as_str()
                    .ok_or_else(|| abi_value_error(self, "a string"))?
                    .to_string(),
            ),
            "Boolean" | "Bool" => match &self.value {
                Value::Bool(b) => Param::Bool(*b),
                Value::String(s) if s == "true" || s == "false" => Param::Bool(s == "true"),
                _ => return Err(abi_value_error(self, "a boolean")),
            },
            "Integer" | "Int" => {
                let parsed = match &self.value {
                    Value::Number(n) => n
                        .as_i64()
                        .map(i128::from)
                        .or_else(|| n.as_u64().map(i128::from)),
                    Value::String(s) => s.parse::<i128>().ok(),
                    _ => None,
                };
                Param::Int(parsed.ok_or_else(|| abi_value_error(self, "an integer"))?)
            }
            "Address" => {
                let text = self.value.as_str().ok_or_else(|| abi_value_error(self, "a base58 address"))?;
                Param::Address(
                    Address::from_base58(text)
                        .map_err(|_| abi_value_error(self, "a base58 address"))?,
                )
            }
            "Hash256" | "Uint256" => {
                let text = self.value.as_str().ok_or_else(|| abi_value_error(self, "a hash"))?;
                Param::H256(text.parse().map_err(|_| abi_value_error(self, "a hash"))?)
            }
            "Array" => Param::Array(
                nested_parameters(self)?
                    .iter()
                    .map(AbiParameter::to_param)
                    .collect::<Result<_, _>>()?,
            ),
            "Struct" => Param::Struct(
                nested_parameters(self)?
                    .iter()
                    .map(AbiParameter::to_param)
                    .collect::<Result<_, _>>()?,
            ),
            "Map" => {
                let entries = nested_parameters(self)?
                    .iter()
                    .map(|entry| Ok((Param::String(entry.name.clone()), entry.to_param()?)))
                    .collect::<Result<_, ScriptError>>()?;
                Param::Map(entries)
            }
            other => return Err(ScriptError::UnsupportedParamType(other.to_string())),
        };
        Ok(param)
    }
}

/// A contract method as described in a contract's ABI file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiFunction {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<AbiParameter>,
    #[serde(rename = "returntype", default)]
    pub return_type: String,
}

impl AbiFunction {
    pub fn new(name: &str, parameters: Vec<AbiParameter>) -> Self {
        Self {
            name: name.to_string(),
            parameters,
            return_type: String::new(),
        }
    }

    /// Find a parameter by name and set its value
    pub fn set_param_value(&mut self, name: &str, value: Value) -> Result<(), ScriptError> {
        let param = self
            .parameters
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| ScriptError::ParamError(format!("no parameter named '{}'", name)))?;
        param.value = value;
        Ok(())
    }

    /// Call script: the method name followed by the packed argument array
    pub fn to_script(&self) -> Result<Vec<u8>, ScriptError> {
        let args = self
            .parameters
            .iter()
            .map(AbiParameter::to_param)
            .collect::<Result<Vec<_>, _>>()?;
        build_params(&[Param::Bytes(self.name.as_bytes().to_vec()), Param::Array(args)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_params_pushed_in_reverse() {
        let script = build_params(&[Param::Int(1), Param::Int(2)]).unwrap();
        assert_eq!(script, vec![0x52, 0x51]);
    }

    #[test]
    fn test_array_pack() {
        let script = build_params(&[Param::Array(vec![
            Param::Bytes(vec![0xAA]),
            Param::Bool(true),
        ])])
        .unwrap();
        assert_eq!(script, vec![0x51, 0x01, 0xAA, 0x52, 0xC1]);
    }

    #[test]
    fn test_struct_alt_stack_sequence() {
        let script = build_params(&[Param::Struct(vec![Param::Int(5), Param::Int(17)])]).unwrap();
        assert_eq!(
            script,
            vec![
                0x00, 0xC6, 0x6B, // PUSH0 NEWSTRUCT TOALTSTACK
                0x55, 0x6A, 0x7C, 0xC8, // PUSH5 DUPFROMALTSTACK SWAP APPEND
                0x01, 0x11, 0x6A, 0x7C, 0xC8, // PUSHBYTES1 17 ...
                0x6C, // FROMALTSTACK
            ]
        );
    }

    #[test]
    fn test_map_encoding() {
        let script = build_params(&[Param::Map(vec![(
            Param::String("k".to_string()),
            Param::Int(3),
        )])])
        .unwrap();
        assert_eq!(
            script,
            vec![0xC7, 0x6B, 0x6A, 0x01, b'k', 0x53, 0xC4, 0x6C]
        );
    }

    #[test]
    fn test_map_rejects_composite_key() {
        let err = build_params(&[Param::Map(vec![(
            Param::Array(vec![]),
            Param::Int(1),
        )])])
        .unwrap_err();
        assert!(matches!(err, ScriptError::UnsupportedParamType(_)));
    }

    #[test]
    fn test_abi_function_script() {
        let function = AbiFunction::new(
            "put",
            vec![
                AbiParameter::new("key", "String", json!("a")),
                AbiParameter::new("value", "Integer", json!(17)),
            ],
        );
        let script = function.to_script().unwrap();

        let mut expected = ScriptBuilder::new();
        expected
            .emit_push_integer(17)
            .emit_push_bytes(b"a")
            .emit_pack(2)
            .emit_push_bytes(b"put");
        assert_eq!(script, expected.into_bytes());
    }

    #[test]
    fn test_abi_unknown_type_fails() {
        let param = AbiParameter::new("x", "InteropInterface", json!(null));
        assert_eq!(
            param.to_param(),
            Err(ScriptError::UnsupportedParamType(
                "InteropInterface".to_string()
            ))
        );
    }

    #[test]
    fn test_abi_nested_array() {
        let param = AbiParameter::new(
            "list",
            "Array",
            json!([
                {"type": "Boolean", "value": true},
                {"type": "ByteArray", "value": "00ff"}
            ]),
        );
        assert_eq!(
            param.to_param().unwrap(),
            Param::Array(vec![Param::Bool(true), Param::Bytes(vec![0x00, 0xFF])])
        );
    }

    #[test]
    fn test_abi_json_shape() {
        let function: AbiFunction = serde_json::from_value(json!({
            "name": "transfer",
            "parameters": [{"name": "to", "type": "Address"}],
            "returntype": "Boolean"
        }))
        .unwrap();
        assert_eq!(function.parameters[0].param_type, "Address");
        assert_eq!(function.parameters[0].value, Value::Null);
    }

    #[test]
    fn test_set_param_value() {
        let mut function = AbiFunction::new("f", vec![AbiParameter::new("a", "Integer", Value::Null)]);
        function.set_param_value("a", json!("-5")).unwrap();
        assert_eq!(function.parameters[0].to_param().unwrap(), Param::Int(-5));
        assert!(function.set_param_value("missing", json!(1)).is_err());
    }
}
