//! SDK configuration
//!
//! An explicit context passed to the transaction builders and the CLI.
//! Nothing in the crate reads configuration from global state.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{Address, ParseError, Payload, TransactionBuilder, ADDRESS_VERSION};

/// Default gas price attached to new transactions
pub const DEFAULT_GAS_PRICE: u64 = 500;

/// Default gas limit attached to new transactions
pub const DEFAULT_GAS_LIMIT: u64 = 20000;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid default payer: {0}")]
    InvalidPayer(#[from] ParseError),
}

/// Settings shared by transaction construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    /// Version byte of Base58 addresses
    pub address_version: u8,
    pub gas_price: u64,
    pub gas_limit: u64,
    /// Base58 address paying for transactions when none is given
    pub default_payer: Option<String>,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            address_version: ADDRESS_VERSION,
            gas_price: DEFAULT_GAS_PRICE,
            gas_limit: DEFAULT_GAS_LIMIT,
            default_payer: None,
        }
    }
}

impl SdkConfig {
    /// Load a JSON configuration file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config: SdkConfig = serde_json::from_str(&json)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Parse the configured default payer, if any
    pub fn payer(&self) -> Result<Option<Address>, ConfigError> {
        self.default_payer
            .as_deref()
            .map(|s| Address::from_base58_with_version(s, self.address_version))
            .transpose()
            .map_err(ConfigError::from)
    }

    /// Start a transaction carrying the configured gas settings
    pub fn transaction_builder(&self, payload: Payload) -> TransactionBuilder {
        TransactionBuilder::new(payload)
            .gas_price(self.gas_price)
            .gas_limit(self.gas_limit)
    }
}
