//! Cryptographic primitives for the cipherseed workspace.
//!
//! This crate is the **sole** location for all cryptographic operations.
//! No other crate in the workspace may perform raw crypto directly.
//!
//! # Modules
//!
//! - [`entropy`] — seed entropy from the OS CSPRNG
//! - [`kdf`] — scrypt passphrase stretching
//! - [`aez`] — AEZ v5 wide-block authenticated encryption
//! - [`checksum`] — CRC-32C record checksum

pub mod aez;
pub mod checksum;
pub mod entropy;
pub mod kdf;
