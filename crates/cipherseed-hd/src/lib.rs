//! BIP-32 master key derivation from raw seed entropy.
//!
//! Turns the 16 bytes of entropy recovered from a cipher seed into a
//! wallet root key:
//!
//! 1. `I = HMAC-SHA512(key="Bitcoin seed", data=entropy)`.
//!    - Left 32 bytes → master private key.
//!    - Right 32 bytes → master chain code.
//! 2. The private key must be nonzero and below the secp256k1 group
//!    order, otherwise the entropy is rejected (BIP-32 §Master key
//!    generation).
//! 3. The pair serializes as a Base58Check `xprv`/`tprv` string for
//!    import into wallet software.
//!
//! Child derivation is out of scope here. Wallets derive their own
//! trees from the exported root.
//!
//! Reference: <https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki>

use cipherseed_types::{CipherSeedError, Result};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// HMAC-SHA512 type alias used throughout BIP-32.
type HmacSha512 = Hmac<Sha512>;

/// HMAC key for master key generation per BIP-32.
const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// Seed length bounds accepted by BIP-32 (128 to 512 bits).
const MIN_SEED_LEN: usize = 16;
const MAX_SEED_LEN: usize = 64;

/// The secp256k1 group order, big-endian. A master private key must
/// be in `[1, ORDER)`.
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36,
    0x41, 0x41,
];

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// Bitcoin network the exported root key targets.
///
/// Only affects the version bytes of the serialized extended key, not
/// the derivation itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
    Regtest,
}

impl Network {
    /// Version bytes for a serialized extended private key.
    fn xprv_version(self) -> [u8; 4] {
        match self {
            // "xprv"
            Network::Mainnet => [0x04, 0x88, 0xAD, 0xE4],
            // "tprv" (regtest shares the testnet encoding)
            Network::Testnet | Network::Regtest => [0x04, 0x35, 0x83, 0x94],
        }
    }
}

// ---------------------------------------------------------------------------
// MasterKey
// ---------------------------------------------------------------------------

/// A BIP-32 master extended private key (depth 0).
///
/// Both halves are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    key: [u8; 32],
    chain_code: [u8; 32],
}

// MasterKey does not implement Clone/Debug to prevent leakage.

impl MasterKey {
    /// Derives the master key from raw seed entropy.
    ///
    /// # Errors
    ///
    /// - [`CipherSeedError::InvalidEntropy`] if the seed length is
    ///   outside 16..=64 bytes, or the derived key falls outside the
    ///   secp256k1 group order (a ~2^-127 event on real entropy).
    /// - [`CipherSeedError::KeyDerivationFailure`] if HMAC
    ///   initialization fails.
    pub fn from_seed(seed: &[u8]) -> Result<Self> {
        if seed.len() < MIN_SEED_LEN || seed.len() > MAX_SEED_LEN {
            return Err(CipherSeedError::InvalidEntropy {
                reason: format!(
                    "seed must be {MIN_SEED_LEN}..={MAX_SEED_LEN} bytes, got {}",
                    seed.len()
                ),
            });
        }

        let mut i = hmac_sha512(MASTER_HMAC_KEY, seed)?;

        let mut key = [0u8; 32];
        let mut chain_code = [0u8; 32];
        key.copy_from_slice(&i[..32]);
        chain_code.copy_from_slice(&i[32..]);
        i.zeroize();

        if !scalar_in_range(&key) {
            key.zeroize();
            chain_code.zeroize();
            return Err(CipherSeedError::InvalidEntropy {
                reason: "derived master key is out of range, retry with fresh entropy".into(),
            });
        }

        Ok(Self { key, chain_code })
    }

    /// Returns the raw 32-byte private key.
    pub fn secret_bytes(&self) -> &[u8; 32] {
        &self.key
    }

    /// Returns the 32-byte chain code.
    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// Serializes the master key as a Base58Check extended private key
    /// string (`xprv...` on mainnet, `tprv...` elsewhere).
    ///
    /// Layout per BIP-32: version (4) || depth (1) || parent
    /// fingerprint (4) || child number (4) || chain code (32) ||
    /// 0x00 || key (32), followed by a 4-byte double-SHA256 checksum.
    pub fn to_extended_key(&self, network: Network) -> String {
        let mut payload = [0u8; 78];
        payload[0..4].copy_from_slice(&network.xprv_version());
        // depth, parent fingerprint and child number are all zero for
        // a master key; payload[4..13] stays zeroed.
        payload[13..45].copy_from_slice(&self.chain_code);
        payload[45] = 0x00;
        payload[46..78].copy_from_slice(&self.key);

        let encoded = base58check(&payload);
        payload.zeroize();
        encoded
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Returns true iff `scalar` is nonzero and strictly below the
/// secp256k1 group order (big-endian byte comparison).
fn scalar_in_range(scalar: &[u8; 32]) -> bool {
    let nonzero = scalar.iter().any(|&b| b != 0);
    nonzero && scalar[..] < SECP256K1_ORDER[..]
}

/// Computes HMAC-SHA512 and returns the 64-byte output.
fn hmac_sha512(key: &[u8], data: &[u8]) -> Result<[u8; 64]> {
    let mut mac =
        HmacSha512::new_from_slice(key).map_err(|e| CipherSeedError::KeyDerivationFailure {
            reason: format!("HMAC-SHA512 key init failed: {e}"),
        })?;
    mac.update(data);
    let result = mac.finalize().into_bytes();

    let mut output = [0u8; 64];
    output.copy_from_slice(&result);
    Ok(output)
}

/// Base58Check: payload || dSHA256(payload)[0..4], Base58-encoded.
fn base58check(payload: &[u8]) -> String {
    let first = Sha256::digest(payload);
    let second = Sha256::digest(first);

    let mut buf = Vec::with_capacity(payload.len() + 4);
    buf.extend_from_slice(payload);
    buf.extend_from_slice(&second[..4]);

    let encoded = bs58::encode(&buf).into_string();
    buf.zeroize();
    encoded
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_range_checks() {
        assert!(!scalar_in_range(&[0u8; 32]));
        assert!(!scalar_in_range(&SECP256K1_ORDER));
        assert!(!scalar_in_range(&[0xFF; 32]));

        let mut one = [0u8; 32];
        one[31] = 1;
        assert!(scalar_in_range(&one));

        let mut below_order = SECP256K1_ORDER;
        below_order[31] -= 1;
        assert!(scalar_in_range(&below_order));
    }

    #[test]
    fn rejects_short_and_long_seeds() {
        assert!(MasterKey::from_seed(&[0x01; 15]).is_err());
        assert!(MasterKey::from_seed(&[0x01; 65]).is_err());
        assert!(MasterKey::from_seed(&[0x01; 16]).is_ok());
        assert!(MasterKey::from_seed(&[0x01; 64]).is_ok());
    }

    #[test]
    fn networks_use_distinct_version_bytes() -> std::result::Result<(), CipherSeedError> {
        let master = MasterKey::from_seed(&[0x42; 16])?;
        let mainnet = master.to_extended_key(Network::Mainnet);
        let testnet = master.to_extended_key(Network::Testnet);
        let regtest = master.to_extended_key(Network::Regtest);

        assert!(mainnet.starts_with("xprv"));
        assert!(testnet.starts_with("tprv"));
        assert_eq!(testnet, regtest);
        assert_ne!(mainnet, testnet);
        Ok(())
    }

    #[test]
    fn derivation_is_deterministic() -> std::result::Result<(), CipherSeedError> {
        let a = MasterKey::from_seed(&[0x42; 16])?;
        let b = MasterKey::from_seed(&[0x42; 16])?;
        assert_eq!(a.secret_bytes(), b.secret_bytes());
        assert_eq!(a.chain_code(), b.chain_code());
        assert_eq!(
            a.to_extended_key(Network::Mainnet),
            b.to_extended_key(Network::Mainnet)
        );
        Ok(())
    }

    #[test]
    fn different_seeds_different_keys() -> std::result::Result<(), CipherSeedError> {
        let a = MasterKey::from_seed(&[0x42; 16])?;
        let b = MasterKey::from_seed(&[0x43; 16])?;
        assert_ne!(a.secret_bytes(), b.secret_bytes());
        Ok(())
    }
}
