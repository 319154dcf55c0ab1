//! CLI command handlers

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::config::SdkConfig;
use crate::contract::{native, NativeAsset, State};
use crate::core::{Address, Transaction};
use crate::crypto::keys::Signer;
use crate::crypto::{KeyPair, MerkleProof};
use crate::multisig::add_sign;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Load the configuration file if one was given, else use defaults
pub fn load_config(path: Option<&Path>) -> CliResult<SdkConfig> {
    match path {
        Some(path) => Ok(SdkConfig::load(path)?),
        None => Ok(SdkConfig::default()),
    }
}

/// Accept an address as Base58 or as (byte-reversed) hex
pub fn parse_address(s: &str, config: &SdkConfig) -> CliResult<Address> {
    let s = s.trim();
    if s.len() == 40 || (s.len() == 42 && s.starts_with("0x")) {
        Ok(Address::from_hex_string(s.trim_start_matches("0x"))?)
    } else {
        Ok(Address::from_base58_with_version(s, config.address_version)?)
    }
}

fn parse_public_key(s: &str) -> CliResult<Vec<u8>> {
    Ok(hex::decode(s.trim())?)
}

/// Generate a key pair and print it
pub fn cmd_keygen(config: &SdkConfig) -> CliResult<()> {
    let key = KeyPair::generate();

    println!("🔐 New key pair");
    println!("   🔑 Private key: {}", key.private_key_hex());
    println!("   📢 Public key:  {}", key.public_key_hex());
    println!(
        "   📍 Address:     {}",
        key.address().to_base58_with_version(config.address_version)
    );

    Ok(())
}

/// Print the single-key address of a public key
pub fn cmd_address(config: &SdkConfig, pubkey: &str) -> CliResult<()> {
    let address = Address::from_pubkey(&parse_public_key(pubkey)?);

    println!("📍 {}", address.to_base58_with_version(config.address_version));
    println!("   hex: {}", address.to_hex_string());

    Ok(())
}

/// Print the M-of-N address of a set of public keys
pub fn cmd_multisig_address(config: &SdkConfig, m: usize, pubkeys: &[String]) -> CliResult<()> {
    let keys = pubkeys
        .iter()
        .map(|k| parse_public_key(k))
        .collect::<CliResult<Vec<_>>>()?;
    let address = Address::from_multi_pubkeys(m, &keys)?;

    println!("🔏 {}-of-{} multisig address", m, keys.len());
    println!("   📍 {}", address.to_base58_with_version(config.address_version));
    println!("   hex: {}", address.to_hex_string());

    Ok(())
}

/// Decode a hex transaction and print its JSON form
pub fn cmd_decode_tx(hex_tx: &str) -> CliResult<()> {
    let tx = Transaction::from_hex(hex_tx)?;
    println!("{}", serde_json::to_string_pretty(&tx.to_json())?);
    Ok(())
}

/// Build a native token transfer; sign it when a private key is given
pub fn cmd_transfer(
    config: &SdkConfig,
    asset: &str,
    from: &str,
    to: &str,
    amount: u64,
    private_key: Option<&str>,
) -> CliResult<()> {
    let asset: NativeAsset = asset.parse()?;
    let from = parse_address(from, config)?;
    let to = parse_address(to, config)?;

    let state = State::new(from, to, amount);
    let mut tx = native::transfer(config, asset, &[state], Some(from))?;

    if let Some(private_key) = private_key {
        let key = KeyPair::from_private_key_hex(private_key)?;
        if key.address() != from {
            log::warn!(
                "Signing key address {} differs from sender {}",
                key.address(),
                from
            );
        }
        tx = add_sign(&tx, &key)?;
        log::info!("Signed with {}", hex::encode(key.public_key()));
    }

    println!("💸 {} {} from {} to {}", amount, asset, from, to);
    println!("   Hash: {}", tx.hash());
    println!("   Signatures: {}", tx.sigs.len());
    println!("{}", tx.to_hex());

    Ok(())
}

/// Read a `getmerkleproof` result and verify it
pub fn read_proof(path: &Path) -> CliResult<MerkleProof> {
    let json: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    let body = match json.get("Result") {
        Some(result) => result.clone(),
        None => json,
    };
    Ok(serde_json::from_value(body)?)
}

/// Verify a Merkle proof file
pub fn cmd_verify_proof(path: &Path) -> CliResult<()> {
    let proof = read_proof(path)?;

    println!(
        "🌳 Proof for block {} against block {}",
        proof.block_height, proof.cur_block_height
    );
    for node in proof.nodes()? {
        println!("   ├─ {:?} {}", node.direction, node.target_hash);
    }

    if proof.verify()? {
        println!("   └─ ✅ Included");
    } else {
        println!("   └─ ❌ Not included");
    }

    Ok(())
}
