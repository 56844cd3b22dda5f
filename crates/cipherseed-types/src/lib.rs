//! Core shared types for the cipherseed workspace.
//!
//! This crate defines the record layout constants and the central error
//! enum used across the workspace. No other crate defines shared types —
//! everything lives here.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Record layout
// ---------------------------------------------------------------------------

/// The one external version of the enciphered seed format this
/// implementation understands. The version byte travels unencrypted at
/// the front of the record and is checked before any cryptographic work.
pub const EXTERNAL_VERSION: u8 = 0;

/// Bytes of raw seed entropy carried in the plaintext record.
pub const ENTROPY_SIZE: usize = 16;

/// Bytes of unencrypted salt embedded in the record. The salt feeds both
/// the key stretcher and the cipher's tweak.
pub const SALT_SIZE: usize = 5;

/// Bytes of ciphertext expansion added by the wide-block cipher. The
/// decrypted record must end in this many zero bytes or decryption is
/// rejected.
pub const CIPHERTEXT_EXPANSION: usize = 4;

/// Bytes of the CRC-32C checksum closing the record.
pub const CHECKSUM_SIZE: usize = 4;

/// Plaintext record size: internal version (1) + birthday (2) + entropy.
pub const DECIPHERED_SEED_SIZE: usize = 1 + 2 + ENTROPY_SIZE;

/// Full enciphered record size:
/// version (1) + ciphertext (19 + 4) + salt (5) + checksum (4) = 33 bytes,
/// exactly 24 x 11 bits once packed into mnemonic words.
pub const ENCIPHERED_SEED_SIZE: usize =
    1 + DECIPHERED_SEED_SIZE + CIPHERTEXT_EXPANSION + SALT_SIZE + CHECKSUM_SIZE;

/// Byte offset of the salt within the enciphered record.
pub const SALT_OFFSET: usize = ENCIPHERED_SEED_SIZE - CHECKSUM_SIZE - SALT_SIZE;

/// Byte offset of the checksum within the enciphered record.
pub const CHECKSUM_OFFSET: usize = ENCIPHERED_SEED_SIZE - CHECKSUM_SIZE;

/// Number of words in a mnemonic.
pub const NUM_MNEMONIC_WORDS: usize = 24;

/// Bits encoded by each mnemonic word (2048-entry dictionary).
pub const BITS_PER_WORD: usize = 11;

/// The passphrase substituted when the operator supplies none. Not a
/// secret — it exists so that "no passphrase" means the same thing to
/// every implementation of the format.
pub const DEFAULT_PASSPHRASE: &[u8] = b"aezeed";

// ---------------------------------------------------------------------------
// CipherSeedError
// ---------------------------------------------------------------------------

/// Central error type for the cipherseed workspace.
///
/// Every failure class the decode/encode pipeline can produce is a
/// distinct variant so the caller (typically the CLI) can print an
/// actionable message. The core never retries and never returns a
/// partially decoded seed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherSeedError {
    /// The record's external version byte is not in the supported set.
    /// Raised before any cryptographic work.
    #[error("unsupported enciphered seed version {version}")]
    UnsupportedVersion {
        /// The version byte found at the front of the record.
        version: u8,
    },

    /// A mnemonic did not contain exactly 24 words.
    #[error("mnemonic must be {expected} words, got {got}")]
    WrongWordCount {
        /// Required word count.
        expected: usize,
        /// Number of words actually supplied.
        got: usize,
    },

    /// A word in the mnemonic is not part of the dictionary.
    #[error("word {position} (\"{word}\") is not in the dictionary")]
    InvalidWord {
        /// One-based position of the offending word.
        position: usize,
        /// The word as supplied (after normalization).
        word: String,
    },

    /// The record's checksum did not match. The cause is deliberately
    /// ambiguous: a mistranscribed mnemonic, swapped words, and bit
    /// corruption all land here.
    #[error("mnemonic checksum mismatch")]
    ChecksumMismatch,

    /// Decryption produced no plausible plaintext. With a valid checksum
    /// this almost always means a wrong passphrase.
    #[error("decryption failed, likely due to an invalid passphrase")]
    DecryptionFailed,

    /// The decrypted plaintext carried an internal version this
    /// implementation does not understand.
    #[error("unsupported internal seed version {version}")]
    InvalidInternalVersion {
        /// Internal version byte recovered from the plaintext.
        version: u8,
    },

    /// Entropy was rejected by a downstream key derivation algorithm.
    #[error("key derivation failed: {reason}")]
    KeyDerivationFailure {
        /// Human-readable description of the derivation failure.
        reason: String,
    },

    /// Entropy input had the wrong shape (length, encoding).
    #[error("invalid entropy: {reason}")]
    InvalidEntropy {
        /// Human-readable description of what was wrong.
        reason: String,
    },

    /// A seed birthday would predate the epoch.
    #[error("seed creation time predates the genesis epoch")]
    PreGenesisBirthday,

    /// A cryptographic primitive failed internally.
    #[error("crypto error: {reason}")]
    CryptoError {
        /// Human-readable description of the failure.
        reason: String,
    },
}

/// Convenience result type using [`CipherSeedError`].
pub type Result<T> = std::result::Result<T, CipherSeedError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
