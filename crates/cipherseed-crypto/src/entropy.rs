//! Seed entropy sourced from the operating system CSPRNG.
//!
//! Every fresh seed starts with 16 bytes from [`rand::rngs::OsRng`].
//! There is no fallback source: if the OS generator is unavailable the
//! process should fail loudly rather than degrade.

use cipherseed_types::ENTROPY_SIZE;
use rand::rngs::OsRng;
use rand::RngCore;

/// Draws [`ENTROPY_SIZE`] fresh bytes from the OS CSPRNG.
///
/// The caller owns the array and is responsible for zeroizing any
/// long-lived copies (the seed types in `cipherseed-core` do this
/// automatically).
pub fn generate_entropy() -> [u8; ENTROPY_SIZE] {
    let mut bytes = [0u8; ENTROPY_SIZE];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entropy_is_16_bytes() {
        assert_eq!(generate_entropy().len(), 16);
    }

    #[test]
    fn successive_draws_differ() {
        // A collision of two 128-bit draws means the CSPRNG is broken.
        let a = generate_entropy();
        let b = generate_entropy();
        assert_ne!(a, b);
    }

    #[test]
    fn entropy_is_not_all_zero() {
        assert_ne!(generate_entropy(), [0u8; ENTROPY_SIZE]);
    }
}
