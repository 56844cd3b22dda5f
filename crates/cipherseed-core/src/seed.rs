//! The cipher seed record and its encipher/decipher pipeline.
//!
//! A plaintext seed is 19 bytes: internal version (1), birthday (2,
//! big endian) and entropy (16). Enciphering wraps it into the 33-byte
//! external record:
//!
//! ```text
//! version (1) ‖ ciphertext (23) ‖ salt (5) ‖ checksum (4)
//! ```
//!
//! The passphrase is stretched with scrypt over the embedded salt; the
//! cipher authenticates the external version and the salt as
//! associated data, so neither can be modified without detection. The
//! CRC-32C closing the record covers everything before it and catches
//! transcription errors before any key derivation runs.

use chrono::{DateTime, TimeDelta, Utc};
use cipherseed_types::{
    CipherSeedError, Result, CHECKSUM_OFFSET, CIPHERTEXT_EXPANSION, DECIPHERED_SEED_SIZE,
    DEFAULT_PASSPHRASE, ENCIPHERED_SEED_SIZE, ENTROPY_SIZE, EXTERNAL_VERSION, SALT_OFFSET,
    SALT_SIZE,
};
use cipherseed_crypto::{aez, checksum, entropy, kdf};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The one internal plaintext version this implementation produces and
/// accepts. Distinct from [`EXTERNAL_VERSION`]: the external byte can
/// be bumped to change the encipherment without touching the plaintext
/// layout, and vice versa.
pub const INTERNAL_VERSION: u8 = 0;

/// Unix timestamp of the Bitcoin genesis block, the zero point for
/// seed birthdays.
const GENESIS_UNIX_TIME: i64 = 1_231_006_505;

/// The birthday epoch as a [`DateTime`].
pub fn genesis_time() -> DateTime<Utc> {
    // 1_231_006_505 is in range for every chrono version we build with.
    DateTime::from_timestamp(GENESIS_UNIX_TIME, 0).unwrap_or_default()
}

/// Substitutes the well-known default passphrase when the operator
/// supplies an empty one. Every compatible implementation performs the
/// same substitution, so "no passphrase" seeds interoperate.
fn passphrase_or_default(passphrase: &[u8]) -> &[u8] {
    if passphrase.is_empty() {
        DEFAULT_PASSPHRASE
    } else {
        passphrase
    }
}

// ---------------------------------------------------------------------------
// CipherSeed
// ---------------------------------------------------------------------------

/// A plaintext cipher seed: versioned entropy plus its creation day.
///
/// Zeroized on drop. No Clone/Debug so the entropy cannot leak through
/// logging or accidental copies.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct CipherSeed {
    /// Plaintext layout version.
    internal_version: u8,
    /// Days since the Bitcoin genesis block at creation time.
    birthday: u16,
    /// Raw 16-byte wallet entropy.
    entropy: [u8; ENTROPY_SIZE],
}

impl CipherSeed {
    /// Creates a seed with fresh OS entropy, dating it to `now`.
    ///
    /// # Errors
    ///
    /// Returns [`CipherSeedError::PreGenesisBirthday`] if `now`
    /// predates the genesis epoch.
    pub fn new(now: DateTime<Utc>) -> Result<Self> {
        Self::from_entropy(entropy::generate_entropy(), now)
    }

    /// Creates a seed from caller-provided entropy, dating it to `now`.
    pub fn from_entropy(entropy: [u8; ENTROPY_SIZE], now: DateTime<Utc>) -> Result<Self> {
        let elapsed = now - genesis_time();
        if elapsed < TimeDelta::zero() {
            return Err(CipherSeedError::PreGenesisBirthday);
        }
        let birthday = elapsed.num_days().min(u16::MAX as i64) as u16;

        Ok(Self {
            internal_version: INTERNAL_VERSION,
            birthday,
            entropy,
        })
    }

    /// Internal plaintext version of this seed.
    pub fn internal_version(&self) -> u8 {
        self.internal_version
    }

    /// Days between the genesis epoch and the seed's creation.
    pub fn birthday(&self) -> u16 {
        self.birthday
    }

    /// The seed's creation day as a calendar timestamp.
    pub fn birthday_time(&self) -> DateTime<Utc> {
        genesis_time() + TimeDelta::days(self.birthday as i64)
    }

    /// Raw 16-byte entropy.
    pub fn entropy(&self) -> &[u8; ENTROPY_SIZE] {
        &self.entropy
    }

    /// Serializes the 19-byte plaintext record.
    fn encode(&self) -> [u8; DECIPHERED_SEED_SIZE] {
        let mut plaintext = [0u8; DECIPHERED_SEED_SIZE];
        plaintext[0] = self.internal_version;
        plaintext[1..3].copy_from_slice(&self.birthday.to_be_bytes());
        plaintext[3..].copy_from_slice(&self.entropy);
        plaintext
    }

    /// Parses a 19-byte plaintext record.
    fn decode(plaintext: &[u8; DECIPHERED_SEED_SIZE]) -> Self {
        let mut entropy = [0u8; ENTROPY_SIZE];
        entropy.copy_from_slice(&plaintext[3..]);
        Self {
            internal_version: plaintext[0],
            birthday: u16::from_be_bytes([plaintext[1], plaintext[2]]),
            entropy,
        }
    }

    /// Enciphers the seed under `passphrase` with a fresh random salt.
    pub fn encipher(&self, passphrase: &[u8]) -> Result<[u8; ENCIPHERED_SEED_SIZE]> {
        let mut salt = [0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut salt);
        self.encipher_with_salt(passphrase, &salt)
    }

    /// Enciphers with a caller-chosen salt. Fixing the salt makes the
    /// whole pipeline deterministic, which the test suites rely on;
    /// production callers go through [`Self::encipher`].
    pub fn encipher_with_salt(
        &self,
        passphrase: &[u8],
        salt: &[u8; SALT_SIZE],
    ) -> Result<[u8; ENCIPHERED_SEED_SIZE]> {
        let key = kdf::stretch_passphrase(passphrase_or_default(passphrase), salt)?;

        // The version byte and salt travel unencrypted but
        // authenticated.
        let mut ad = [0u8; 1 + SALT_SIZE];
        ad[0] = EXTERNAL_VERSION;
        ad[1..].copy_from_slice(salt);

        let mut plaintext = self.encode();
        let ciphertext = aez::encrypt(
            key.as_bytes(),
            b"",
            &[&ad],
            CIPHERTEXT_EXPANSION,
            &plaintext,
        )?;
        plaintext.zeroize();

        let mut record = [0u8; ENCIPHERED_SEED_SIZE];
        record[0] = EXTERNAL_VERSION;
        record[1..SALT_OFFSET].copy_from_slice(&ciphertext);
        record[SALT_OFFSET..CHECKSUM_OFFSET].copy_from_slice(salt);
        let sum = checksum::checksum(&record[..CHECKSUM_OFFSET]);
        record[CHECKSUM_OFFSET..].copy_from_slice(&sum);
        Ok(record)
    }

    /// Deciphers a 33-byte record back into a seed.
    ///
    /// Gates run in cost order: version byte, checksum, then the
    /// scrypt/cipher pipeline, then the plaintext version.
    ///
    /// # Errors
    ///
    /// - [`CipherSeedError::UnsupportedVersion`] for an unknown
    ///   external version byte.
    /// - [`CipherSeedError::ChecksumMismatch`] when the record was
    ///   corrupted in transcription.
    /// - [`CipherSeedError::DecryptionFailed`] when the record is
    ///   intact but the passphrase does not decrypt it.
    /// - [`CipherSeedError::InvalidInternalVersion`] when decryption
    ///   yields a plaintext layout this implementation cannot parse.
    pub fn decipher(record: &[u8; ENCIPHERED_SEED_SIZE], passphrase: &[u8]) -> Result<Self> {
        if record[0] != EXTERNAL_VERSION {
            return Err(CipherSeedError::UnsupportedVersion { version: record[0] });
        }

        checksum::verify_checksum(record)?;

        let salt = &record[SALT_OFFSET..CHECKSUM_OFFSET];
        let key = kdf::stretch_passphrase(passphrase_or_default(passphrase), salt)?;

        let mut ad = [0u8; 1 + SALT_SIZE];
        ad[0] = record[0];
        ad[1..].copy_from_slice(salt);

        let mut plaintext_vec = aez::decrypt(
            key.as_bytes(),
            b"",
            &[&ad],
            CIPHERTEXT_EXPANSION,
            &record[1..SALT_OFFSET],
        )?;
        let mut plaintext = [0u8; DECIPHERED_SEED_SIZE];
        plaintext.copy_from_slice(&plaintext_vec);
        plaintext_vec.zeroize();

        let seed = Self::decode(&plaintext);
        plaintext.zeroize();

        if seed.internal_version() != INTERNAL_VERSION {
            return Err(CipherSeedError::InvalidInternalVersion {
                version: seed.internal_version(),
            });
        }
        Ok(seed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
