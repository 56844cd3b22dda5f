//! BIP-32 known test vectors for master key derivation.
//!
//! Test vectors sourced from:
//! - BIP-32: <https://github.com/bitcoin/bips/blob/master/bip-0032.mediawiki>

use cipherseed_hd::{MasterKey, Network};
use cipherseed_types::CipherSeedError;

// ===================================================================
// BIP-32 Test Vector 1: 16-byte seed
// Seed (hex): 000102030405060708090a0b0c0d0e0f
// ===================================================================

#[test]
fn bip32_vector1_master_xprv() -> std::result::Result<(), CipherSeedError> {
    let seed = hex::decode("000102030405060708090a0b0c0d0e0f")
        .map_err(|e| CipherSeedError::InvalidEntropy {
            reason: e.to_string(),
        })?;
    let master = MasterKey::from_seed(&seed)?;

    assert_eq!(
        master.to_extended_key(Network::Mainnet),
        "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi"
    );
    Ok(())
}

#[test]
fn bip32_vector1_master_halves() -> std::result::Result<(), CipherSeedError> {
    let seed = hex::decode("000102030405060708090a0b0c0d0e0f")
        .map_err(|e| CipherSeedError::InvalidEntropy {
            reason: e.to_string(),
        })?;
    let master = MasterKey::from_seed(&seed)?;

    assert_eq!(
        hex::encode(master.secret_bytes()),
        "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
    );
    assert_eq!(
        hex::encode(master.chain_code()),
        "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
    );
    Ok(())
}

// ===================================================================
// BIP-32 Test Vector 2: 64-byte seed
// ===================================================================

#[test]
fn bip32_vector2_master_xprv() -> std::result::Result<(), CipherSeedError> {
    let seed = hex::decode(
        "fffcf9f6f3f0edeae7e4e1dedbd8d5d2cfccc9c6c3c0bdbab7b4b1aeaba8a5a2\
         9f9c999693908d8a8784817e7b7875726f6c696663605d5a5754514e4b484542",
    )
    .map_err(|e| CipherSeedError::InvalidEntropy {
        reason: e.to_string(),
    })?;
    let master = MasterKey::from_seed(&seed)?;

    assert_eq!(
        master.to_extended_key(Network::Mainnet),
        "xprv9s21ZrQH143K31xYSDQpPDxsXRTUcvj2iNHm5NUtrGiGG5e2DtALGdso3pGz6ssrdK4PFmM8NSpSBHNqPqm55Qn3LqFtT2emdEXVYsCzC2U"
    );
    Ok(())
}

// ===================================================================
// Network encoding
// ===================================================================

#[test]
fn testnet_prefix_is_tprv() -> std::result::Result<(), CipherSeedError> {
    let seed = hex::decode("000102030405060708090a0b0c0d0e0f")
        .map_err(|e| CipherSeedError::InvalidEntropy {
            reason: e.to_string(),
        })?;
    let master = MasterKey::from_seed(&seed)?;
    assert!(master.to_extended_key(Network::Testnet).starts_with("tprv"));
    assert!(master.to_extended_key(Network::Regtest).starts_with("tprv"));
    Ok(())
}
