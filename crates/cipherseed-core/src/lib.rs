//! Enciphered seed codec.
//!
//! Implements the full lifecycle of a passphrase-protected wallet
//! seed:
//!
//! 1. **Creation**: 16 bytes of OS entropy, stamped with a creation
//!    day ([`seed::CipherSeed`]).
//! 2. **Encipherment**: scrypt-stretched passphrase, AEZ wide-block
//!    encryption, CRC-32C checksum — a 33-byte record.
//! 3. **Mnemonic**: the record packed into 24 dictionary words
//!    ([`mnemonic::Mnemonic`]), and back.
//!
//! The inverse pipeline recovers the seed from a phrase and
//! passphrase, failing with a distinct error for each gate: unknown
//! version, bad word, bad checksum, wrong passphrase.

pub mod mnemonic;
pub mod seed;
pub mod wordlist;

pub use mnemonic::Mnemonic;
pub use seed::{genesis_time, CipherSeed, INTERNAL_VERSION};

use chrono::{DateTime, Utc};
use cipherseed_types::Result;

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Generates a fresh seed dated `now` and enciphers it in one step.
///
/// Returns both the phrase to hand to the operator and the plaintext
/// seed, so callers can derive keys without deciphering their own
/// output.
pub fn new_seed(passphrase: &[u8], now: DateTime<Utc>) -> Result<(Mnemonic, CipherSeed)> {
    let seed = CipherSeed::new(now)?;
    let mnemonic = Mnemonic::from_cipher_seed(&seed, passphrase)?;
    Ok((mnemonic, seed))
}

/// Parses and deciphers an operator-supplied phrase in one step.
pub fn decode_mnemonic(phrase: &str, passphrase: &[u8]) -> Result<CipherSeed> {
    let mnemonic: Mnemonic = phrase.parse()?;
    mnemonic.to_cipher_seed(passphrase)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
