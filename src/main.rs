//! ontio: command-line client for building and inspecting transactions

use clap::{Parser, Subcommand};
use ontio_core::cli;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ontio")]
#[command(version = "0.1.0")]
#[command(about = "Build, sign and inspect Ontology transactions", long_about = None)]
struct Cli {
    /// JSON configuration file (gas settings, default payer, address version)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new secp256r1 key pair
    Keygen,

    /// Derive the address of a single public key
    Address {
        /// Public key (hex)
        #[arg(short, long)]
        pubkey: String,
    },

    /// Derive the address of an M-of-N key set
    MultisigAddress {
        /// Required signatures
        #[arg(short)]
        m: usize,

        /// Public keys (hex, comma-separated)
        #[arg(long, value_delimiter = ',')]
        pubkeys: Vec<String>,
    },

    /// Decode a hex transaction and print it as JSON
    DecodeTx {
        /// Serialized transaction (hex)
        hex: String,
    },

    /// Build a native ONT/ONG transfer
    Transfer {
        /// Asset to move (ont or ong)
        #[arg(long, default_value = "ont")]
        asset: String,

        /// Sender address, also the payer
        #[arg(short, long)]
        from: String,

        /// Recipient address
        #[arg(short, long)]
        to: String,

        /// Amount in the asset's smallest unit
        #[arg(short, long)]
        amount: u64,

        /// Sender's private key (hex); the transaction is left unsigned without it
        #[arg(long)]
        private_key: Option<String>,
    },

    /// Verify a getmerkleproof result read from a file
    VerifyProof {
        /// Proof file (JSON)
        #[arg(short, long)]
        proof: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Keygen => {
            cli::cmd_keygen(&config)?;
        }

        Commands::Address { pubkey } => {
            cli::cmd_address(&config, &pubkey)?;
        }

        Commands::MultisigAddress { m, pubkeys } => {
            cli::cmd_multisig_address(&config, m, &pubkeys)?;
        }

        Commands::DecodeTx { hex } => {
            cli::cmd_decode_tx(&hex)?;
        }

        Commands::Transfer {
            asset,
            from,
            to,
            amount,
            private_key,
        } => {
            cli::cmd_transfer(&config, &asset, &from, &to, amount, private_key.as_deref())?;
        }

        Commands::VerifyProof { proof } => {
            cli::cmd_verify_proof(&proof)?;
        }
    }

    Ok(())
}
