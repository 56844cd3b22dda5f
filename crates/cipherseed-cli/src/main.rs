//! Cipherseed command line tool.
//!
//! Creates passphrase-protected seed phrases, recovers them, and
//! exports BIP-32 root keys for wallet import.

use std::io::{self, BufRead};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};

use cipherseed_core::{decode_mnemonic, new_seed, CipherSeed};
use cipherseed_hd::{MasterKey, Network};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Cipherseed — passphrase-protected wallet seed phrases.
#[derive(Parser)]
#[command(name = "cipherseed", version, about)]
struct Cli {
    /// Passphrase protecting the seed. Leave unset to use the scheme
    /// default.
    #[arg(long, global = true, env = "CIPHERSEED_PASSPHRASE")]
    passphrase: Option<String>,

    /// Target network for the exported root key.
    #[arg(long, global = true, value_enum, default_value_t = CliNetwork::Mainnet)]
    network: CliNetwork,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a fresh seed and print its 24-word phrase.
    New,
    /// Recover a seed from a phrase and report on it.
    Decode {
        /// The 24 words, as arguments or on stdin if omitted.
        words: Vec<String>,
    },
    /// Derive the BIP-32 root key directly from hex entropy.
    RootKey {
        /// 16 bytes of seed entropy, hex encoded.
        entropy: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CliNetwork {
    Mainnet,
    Testnet,
    Regtest,
}

impl From<CliNetwork> for Network {
    fn from(network: CliNetwork) -> Self {
        match network {
            CliNetwork::Mainnet => Network::Mainnet,
            CliNetwork::Testnet => Network::Testnet,
            CliNetwork::Regtest => Network::Regtest,
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    let cli = Cli::parse();
    let passphrase = cli.passphrase.clone().unwrap_or_default();
    let network = cli.network.into();

    let result = match cli.command {
        Commands::New => cmd_new(passphrase.as_bytes(), network),
        Commands::Decode { words } => cmd_decode(&words, passphrase.as_bytes(), network),
        Commands::RootKey { entropy } => cmd_root_key(&entropy, network),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_new(passphrase: &[u8], network: Network) -> Result<()> {
    let (mnemonic, seed) =
        new_seed(passphrase, Utc::now()).context("seed generation failed")?;

    println!("{mnemonic}");
    println!();
    report(&seed, network)?;
    eprintln!();
    eprintln!("Write the phrase down. It cannot be recovered if lost.");
    Ok(())
}

fn cmd_decode(words: &[String], passphrase: &[u8], network: Network) -> Result<()> {
    let phrase = read_phrase(words)?;
    let seed = decode_mnemonic(&phrase, passphrase).context("phrase recovery failed")?;
    report(&seed, network)
}

fn cmd_root_key(entropy_hex: &str, network: Network) -> Result<()> {
    let entropy = hex::decode(entropy_hex.trim()).context("entropy is not valid hex")?;
    let master = MasterKey::from_seed(&entropy).context("root key derivation failed")?;

    println!("{}", master.to_extended_key(network));
    Ok(())
}

/// Prints the standard seed report: entropy, birthday, root key.
fn report(seed: &CipherSeed, network: Network) -> Result<()> {
    println!("entropy:  {}", hex::encode(seed.entropy()));
    println!(
        "birthday: {} (day {})",
        seed.birthday_time().format("%Y-%m-%d"),
        seed.birthday()
    );

    let master =
        MasterKey::from_seed(seed.entropy()).context("root key derivation failed")?;
    println!("root key: {}", master.to_extended_key(network));
    Ok(())
}

// ---------------------------------------------------------------------------
// Input plumbing
// ---------------------------------------------------------------------------

/// Joins the phrase from argv, or reads one line from stdin when no
/// words were given.
fn read_phrase(words: &[String]) -> Result<String> {
    if !words.is_empty() {
        return Ok(words.join(" "));
    }
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read phrase from stdin")?;
    if line.trim().is_empty() {
        bail!("no phrase given (pass 24 words as arguments or on stdin)");
    }
    Ok(line)
}
