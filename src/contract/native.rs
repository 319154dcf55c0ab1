//! Native contract invocation
//!
//! Native contracts live at fixed addresses and are called through the
//! `Ontology.Native.Invoke` interop service:
//!
//! ```text
//! <args> PUSH(method) PUSH(contract address) PUSH0 SYSCALL PUSH("Ontology.Native.Invoke")
//! ```

use std::fmt;
use std::str::FromStr;

use super::ContractError;
use crate::config::SdkConfig;
use crate::core::{Address, Payload, Transaction, ADDRESS_LEN};
use crate::script::{build_params, OpCode, Param, ScriptBuilder};

/// Interop service that dispatches to native contracts
pub const NATIVE_INVOKE_NAME: &str = "Ontology.Native.Invoke";

const fn native_address(id: u8) -> Address {
    let mut bytes = [0u8; ADDRESS_LEN];
    bytes[ADDRESS_LEN - 1] = id;
    Address(bytes)
}

/// ONT token contract (`0000000000000000000000000000000000000001`)
pub const ONT_CONTRACT: Address = native_address(0x01);

/// ONG token contract (`0000000000000000000000000000000000000002`)
pub const ONG_CONTRACT: Address = native_address(0x02);

// =============================================================================
// Assets and transfer states
// =============================================================================

/// Native token assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeAsset {
    Ont,
    Ong,
}

impl NativeAsset {
    pub fn contract_address(self) -> Address {
        match self {
            NativeAsset::Ont => ONT_CONTRACT,
            NativeAsset::Ong => ONG_CONTRACT,
        }
    }
}

impl fmt::Display for NativeAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeAsset::Ont => write!(f, "ONT"),
            NativeAsset::Ong => write!(f, "ONG"),
        }
    }
}

impl FromStr for NativeAsset {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ont" => Ok(NativeAsset::Ont),
            "ong" => Ok(NativeAsset::Ong),
            _ => Err(ContractError::UnknownAsset(s.to_string())),
        }
    }
}

/// One leg of a token transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub from: Address,
    pub to: Address,
    pub value: u64,
}

impl State {
    pub fn new(from: Address, to: Address, value: u64) -> Self {
        Self { from, to, value }
    }

    fn to_param(&self) -> Param {
        Param::Struct(vec![
            Param::Address(self.from),
            Param::Address(self.to),
            Param::from(self.value),
        ])
    }
}

// =============================================================================
// Script and transaction construction
// =============================================================================

/// Build the invoke script for `method` on the native contract at `contract`
///
/// `args` is an already-encoded argument script and may be empty.
pub fn build_native_invoke(contract: &Address, method: &str, args: &[u8]) -> Vec<u8> {
    let mut builder = ScriptBuilder::new();
    if !args.is_empty() {
        builder.add(args);
    }
    builder
        .emit_push_bytes(method.as_bytes())
        .emit_push_bytes(contract.as_bytes())
        .emit_push_integer(0)
        .emit_syscall(NATIVE_INVOKE_NAME);
    builder.into_bytes()
}

/// Unsigned `InvokeCode` transaction calling a native contract
///
/// The payer is `payer` if given, else the configured default payer.
pub fn native_invoke_transaction(
    config: &SdkConfig,
    contract: &Address,
    method: &str,
    params: &[Param],
    payer: Option<Address>,
) -> Result<Transaction, ContractError> {
    let args = build_params(params)?;
    invoke_with_args(config, contract, method, &args, payer)
}

fn invoke_with_args(
    config: &SdkConfig,
    contract: &Address,
    method: &str,
    args: &[u8],
    payer: Option<Address>,
) -> Result<Transaction, ContractError> {
    let code = build_native_invoke(contract, method, args);
    let mut builder = config.transaction_builder(Payload::InvokeCode { code });
    if let Some(payer) = payer.map_or_else(|| config.payer(), |p| Ok(Some(p)))? {
        builder = builder.payer(payer);
    }
    log::debug!("Built native call {}.{}", contract.to_hex_string(), method);
    Ok(builder.build())
}

fn check_amount(amount: u64) -> Result<(), ContractError> {
    if amount == 0 {
        return Err(ContractError::InvalidAmount(
            "amount must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Transfer tokens along one or more states in a single call
pub fn transfer(
    config: &SdkConfig,
    asset: NativeAsset,
    states: &[State],
    payer: Option<Address>,
) -> Result<Transaction, ContractError> {
    if states.is_empty() {
        return Err(ContractError::InvalidAmount(
            "at least one transfer state is required".to_string(),
        ));
    }
    for state in states {
        check_amount(state.value)?;
    }
    let legs = states.iter().map(State::to_param).collect();
    native_invoke_transaction(
        config,
        &asset.contract_address(),
        "transfer",
        &[Param::Array(legs)],
        payer,
    )
}

/// Allow `spender` to move up to `amount` of `owner`'s tokens
pub fn approve(
    config: &SdkConfig,
    asset: NativeAsset,
    owner: &Address,
    spender: &Address,
    amount: u64,
    payer: Option<Address>,
) -> Result<Transaction, ContractError> {
    check_amount(amount)?;
    let state = State::new(*owner, *spender, amount);
    native_invoke_transaction(
        config,
        &asset.contract_address(),
        "approve",
        &[state.to_param()],
        payer,
    )
}

/// Move approved tokens from `from` to `to`, signed by `sender`
pub fn transfer_from(
    config: &SdkConfig,
    asset: NativeAsset,
    sender: &Address,
    from: &Address,
    to: &Address,
    amount: u64,
    payer: Option<Address>,
) -> Result<Transaction, ContractError> {
    check_amount(amount)?;
    let params = Param::Struct(vec![
        Param::Address(*sender),
        Param::Address(*from),
        Param::Address(*to),
        Param::from(amount),
    ]);
    native_invoke_transaction(
        config,
        &asset.contract_address(),
        "transferFrom",
        &[params],
        payer,
    )
}

/// Pre-execution query of an address balance (no gas, no payer)
pub fn balance_of(asset: NativeAsset, address: &Address) -> Result<Transaction, ContractError> {
    query(asset, "balanceOf", &[Param::Address(*address)])
}

/// Pre-execution query of the remaining allowance from `owner` to `spender`
pub fn allowance(
    asset: NativeAsset,
    owner: &Address,
    spender: &Address,
) -> Result<Transaction, ContractError> {
    query(
        asset,
        "allowance",
        &[Param::Struct(vec![Param::Address(*owner), Param::Address(*spender)])],
    )
}

/// Pre-execution query of token metadata (`name`, `symbol`, `decimals`, `totalSupply`)
pub fn metadata_query(asset: NativeAsset, method: &str) -> Result<Transaction, ContractError> {
    let no_args = [OpCode::Push0 as u8];
    invoke_with_args(&query_config(), &asset.contract_address(), method, &no_args, None)
}

fn query(asset: NativeAsset, method: &str, params: &[Param]) -> Result<Transaction, ContractError> {
    native_invoke_transaction(&query_config(), &asset.contract_address(), method, params, None)
}

fn query_config() -> SdkConfig {
    SdkConfig {
        gas_price: 0,
        gas_limit: 0,
        default_payer: None,
        ..SdkConfig::default()
    }
}
