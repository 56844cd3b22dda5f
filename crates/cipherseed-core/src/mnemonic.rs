//! 24-word mnemonic codec for the 33-byte enciphered record.
//!
//! The record is exactly 264 bits, so it packs into 24 words of 11
//! bits each with nothing left over — there is no separate mnemonic
//! checksum, the record's own CRC plays that role. Bits are consumed
//! most significant first.

use std::fmt;
use std::str::FromStr;

use cipherseed_types::{
    CipherSeedError, Result, BITS_PER_WORD, ENCIPHERED_SEED_SIZE, NUM_MNEMONIC_WORDS,
};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::seed::CipherSeed;
use crate::wordlist::{word_to_index, WORDLIST};

// ---------------------------------------------------------------------------
// Mnemonic
// ---------------------------------------------------------------------------

/// A 24-word mnemonic phrase wrapping one enciphered seed record.
///
/// The inner string is zeroized on drop. Construction goes through
/// [`Mnemonic::from_enciphered`] or [`Mnemonic::from_str`], so a value
/// of this type always holds exactly 24 dictionary words.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Mnemonic(String);

impl Mnemonic {
    /// Returns the phrase as a single space-separated string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the individual words.
    pub fn words(&self) -> Vec<&str> {
        self.0.split_whitespace().collect()
    }

    /// Packs a 33-byte enciphered record into 24 words.
    pub fn from_enciphered(record: &[u8; ENCIPHERED_SEED_SIZE]) -> Self {
        let mut words = Vec::with_capacity(NUM_MNEMONIC_WORDS);
        for group in 0..NUM_MNEMONIC_WORDS {
            let mut index: u16 = 0;
            for bit in 0..BITS_PER_WORD {
                let position = group * BITS_PER_WORD + bit;
                let byte = record[position / 8];
                let value = (byte >> (7 - position % 8)) & 1;
                index = (index << 1) | value as u16;
            }
            // An 11-bit index is always within the 2048-word list, so
            // this indexing cannot panic.
            words.push(WORDLIST[index as usize]);
        }
        Self(words.join(" "))
    }

    /// Unpacks the phrase back into the 33-byte enciphered record.
    pub fn to_enciphered(&self) -> Result<[u8; ENCIPHERED_SEED_SIZE]> {
        let words = self.words();
        let mut record = [0u8; ENCIPHERED_SEED_SIZE];
        for (group, word) in words.iter().enumerate() {
            let index = word_to_index(word).ok_or_else(|| CipherSeedError::InvalidWord {
                position: group + 1,
                word: (*word).to_string(),
            })?;
            for bit in 0..BITS_PER_WORD {
                if (index >> (BITS_PER_WORD - 1 - bit)) & 1 == 1 {
                    let position = group * BITS_PER_WORD + bit;
                    record[position / 8] |= 1 << (7 - position % 8);
                }
            }
        }
        Ok(record)
    }

    /// Enciphers `seed` under `passphrase` and wraps it as a phrase.
    pub fn from_cipher_seed(seed: &CipherSeed, passphrase: &[u8]) -> Result<Self> {
        let record = seed.encipher(passphrase)?;
        Ok(Self::from_enciphered(&record))
    }

    /// Deciphers the phrase back into a [`CipherSeed`].
    pub fn to_cipher_seed(&self, passphrase: &[u8]) -> Result<CipherSeed> {
        let record = self.to_enciphered()?;
        CipherSeed::decipher(&record, passphrase)
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Mnemonic {
    type Err = CipherSeedError;

    /// Parses an operator-supplied phrase.
    ///
    /// Words are lowercased and whitespace is normalized before
    /// validation, so transcriptions with odd spacing or capitals are
    /// accepted. The word count and dictionary membership are checked
    /// here; the checksum is not — that happens on decipher.
    fn from_str(phrase: &str) -> Result<Self> {
        let words: Vec<String> = phrase
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect();

        if words.len() != NUM_MNEMONIC_WORDS {
            return Err(CipherSeedError::WrongWordCount {
                expected: NUM_MNEMONIC_WORDS,
                got: words.len(),
            });
        }
        for (position, word) in words.iter().enumerate() {
            if word_to_index(word).is_none() {
                return Err(CipherSeedError::InvalidWord {
                    position: position + 1,
                    word: word.clone(),
                });
            }
        }
        Ok(Self(words.join(" ")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> [u8; ENCIPHERED_SEED_SIZE] {
        let mut record = [0u8; ENCIPHERED_SEED_SIZE];
        for (i, byte) in record.iter_mut().enumerate() {
            *byte = (i as u8).wrapping_mul(41).wrapping_add(7);
        }
        record
    }

    #[test]
    fn packing_roundtrips() -> std::result::Result<(), CipherSeedError> {
        let record = sample_record();
        let mnemonic = Mnemonic::from_enciphered(&record);
        assert_eq!(mnemonic.words().len(), NUM_MNEMONIC_WORDS);
        assert_eq!(mnemonic.to_enciphered()?, record);
        Ok(())
    }

    #[test]
    fn every_record_packs_to_exactly_24_words() {
        // Extreme byte patterns hit index 0, index 2047 and a spread of
        // values in between; none may shorten the phrase.
        for fill in [0x00, 0x55, 0xAA, 0xFF] {
            let mnemonic = Mnemonic::from_enciphered(&[fill; ENCIPHERED_SEED_SIZE]);
            assert_eq!(mnemonic.words().len(), NUM_MNEMONIC_WORDS, "fill {fill:#04x}");
        }
    }

    #[test]
    fn all_zero_record_is_24_abandon() {
        let mnemonic = Mnemonic::from_enciphered(&[0u8; ENCIPHERED_SEED_SIZE]);
        for word in mnemonic.words() {
            assert_eq!(word, "abandon");
        }
    }

    #[test]
    fn all_ones_record_is_24_zoo() {
        let mnemonic = Mnemonic::from_enciphered(&[0xFF; ENCIPHERED_SEED_SIZE]);
        for word in mnemonic.words() {
            assert_eq!(word, "zoo");
        }
    }

    #[test]
    fn first_word_holds_the_top_bits() {
        // Index 1 in the leading 11 bits: 0000000000 1 00000...
        let mut record = [0u8; ENCIPHERED_SEED_SIZE];
        record[1] = 0b0010_0000;
        let mnemonic = Mnemonic::from_enciphered(&record);
        assert_eq!(mnemonic.words()[0], "ability");
    }

    #[test]
    fn parse_normalizes_case_and_whitespace() -> std::result::Result<(), CipherSeedError> {
        let record = sample_record();
        let mnemonic = Mnemonic::from_enciphered(&record);
        let sloppy = format!("  {}  ", mnemonic.as_str().to_uppercase().replace(' ', "   "));
        let parsed = Mnemonic::from_str(&sloppy)?;
        assert_eq!(parsed.to_enciphered()?, record);
        Ok(())
    }

    #[test]
    fn parse_rejects_wrong_word_count() {
        let result = Mnemonic::from_str("abandon ability able");
        assert_eq!(
            result.err(),
            Some(CipherSeedError::WrongWordCount {
                expected: 24,
                got: 3
            })
        );
    }

    #[test]
    fn parse_rejects_unknown_word_with_position() {
        let mut words = vec!["abandon"; NUM_MNEMONIC_WORDS];
        words[6] = "blorp";
        let result = Mnemonic::from_str(&words.join(" "));
        assert_eq!(
            result.err(),
            Some(CipherSeedError::InvalidWord {
                position: 7,
                word: "blorp".into(),
            })
        );
    }

    #[test]
    fn display_matches_as_str() {
        let mnemonic = Mnemonic::from_enciphered(&sample_record());
        assert_eq!(mnemonic.to_string(), mnemonic.as_str());
    }
}
