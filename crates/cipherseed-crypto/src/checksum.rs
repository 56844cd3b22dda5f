//! CRC-32C record checksum.
//!
//! The last four bytes of an enciphered seed are the CRC-32C
//! (Castagnoli polynomial) of everything before them, stored big
//! endian. The checksum involves no secret, so it can be verified
//! before the passphrase is known; it detects transcription errors,
//! not tampering.

use cipherseed_types::{CipherSeedError, Result, CHECKSUM_SIZE};
use crc::{Crc, CRC_32_ISCSI};

/// CRC-32C (iSCSI / Castagnoli) instance shared by append and verify.
const CRC32C: Crc<u32> = Crc::<u32>::new(&CRC_32_ISCSI);

/// Computes the CRC-32C of `data` as big-endian bytes.
pub fn checksum(data: &[u8]) -> [u8; CHECKSUM_SIZE] {
    CRC32C.checksum(data).to_be_bytes()
}

/// Verifies that `record` ends in the CRC-32C of the bytes before it.
///
/// # Errors
///
/// Returns [`CipherSeedError::ChecksumMismatch`] if the record is too
/// short to hold a checksum or the stored value does not match.
pub fn verify_checksum(record: &[u8]) -> Result<()> {
    if record.len() <= CHECKSUM_SIZE {
        return Err(CipherSeedError::ChecksumMismatch);
    }
    let (payload, stored) = record.split_at(record.len() - CHECKSUM_SIZE);
    if checksum(payload) != stored {
        return Err(CipherSeedError::ChecksumMismatch);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// The Castagnoli check value: CRC-32C("123456789") = 0xE3069283.
    #[test]
    fn castagnoli_check_value() {
        assert_eq!(checksum(b"123456789"), 0xE306_9283u32.to_be_bytes());
    }

    #[test]
    fn append_then_verify() -> std::result::Result<(), CipherSeedError> {
        let mut record = b"some record payload".to_vec();
        let sum = checksum(&record);
        record.extend_from_slice(&sum);
        verify_checksum(&record)
    }

    #[test]
    fn any_flipped_bit_is_detected() {
        let mut record = vec![0xA5u8; 29];
        let sum = checksum(&record);
        record.extend_from_slice(&sum);

        for byte in 0..record.len() {
            for bit in 0..8 {
                let mut corrupted = record.clone();
                corrupted[byte] ^= 1 << bit;
                assert_eq!(
                    verify_checksum(&corrupted),
                    Err(CipherSeedError::ChecksumMismatch),
                    "flip at byte {byte} bit {bit} went undetected"
                );
            }
        }
    }

    #[test]
    fn short_record_rejected() {
        assert_eq!(
            verify_checksum(&[1, 2, 3]),
            Err(CipherSeedError::ChecksumMismatch)
        );
        assert_eq!(
            verify_checksum(&[1, 2, 3, 4]),
            Err(CipherSeedError::ChecksumMismatch)
        );
    }
}
