//! AEZ v5 wide-block authenticated encryption.
//!
//! AEZ is an arbitrary-input-length enciphering scheme: authenticity
//! comes not from an appended MAC tag but from ciphertext expansion —
//! the plaintext is padded with `abytes` zero bytes before enciphering,
//! and any modification of the ciphertext diffuses over the whole block
//! and destroys those zeros on decryption.
//!
//! This module implements the slice of AEZ the seed record needs:
//!
//! - BLAKE2b-384 key extraction into the `I`, `J`, `L` subkeys,
//! - the AES4/AES10 round primitives (via [`aes::hazmat::cipher_round`]),
//! - the tweak hash over `(abytes, nonce, ad...)`,
//! - AEZ-tiny, the balanced Feistel network used for inputs shorter
//!   than 32 bytes (the seed record enciphers 23), and
//! - AEZ-prf for the degenerate empty-plaintext case.
//!
//! Inputs of 32 or more bytes would take the AEZ-core path, which this
//! module deliberately does not implement; such inputs are rejected
//! with [`CipherSeedError::CryptoError`].

use aes::hazmat::cipher_round;
use blake2::digest::{Update, VariableOutput};
use blake2::Blake2bVar;
use cipherseed_types::{CipherSeedError, Result};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Extracted key material length: three 16-byte subkeys.
const EXTRACTED_KEY_SIZE: usize = 48;

/// Smallest total block AEZ-tiny handles here (two 64-bit halves).
const MIN_TINY_SIZE: usize = 16;

/// First size that would require the unimplemented AEZ-core path.
const CORE_THRESHOLD: usize = 32;

type Block16 = [u8; 16];

// ---------------------------------------------------------------------------
// Block arithmetic
// ---------------------------------------------------------------------------

#[inline]
fn xor_block(a: &Block16, b: &Block16) -> Block16 {
    let mut out = [0u8; 16];
    for (o, (x, y)) in out.iter_mut().zip(a.iter().zip(b.iter())) {
        *o = x ^ y;
    }
    out
}

#[inline]
fn xor_into(dst: &mut Block16, src: &Block16) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d ^= s;
    }
}

/// Doubling in GF(2^128) with the x^128 + x^7 + x^2 + x + 1 polynomial,
/// most significant bit first.
fn double_block(b: &Block16) -> Block16 {
    let mut out = [0u8; 16];
    let carry = b[0] >> 7;
    for i in 0..15 {
        out[i] = (b[i] << 1) | (b[i + 1] >> 7);
    }
    out[15] = b[15] << 1;
    if carry != 0 {
        out[15] ^= 0x87;
    }
    out
}

/// Scalar multiple `x * b` in GF(2^128), double-and-add.
fn mult_block(x: u64, b: &Block16) -> Block16 {
    let mut acc = [0u8; 16];
    let mut addend = *b;
    let mut x = x;
    while x != 0 {
        if x & 1 != 0 {
            xor_into(&mut acc, &addend);
        }
        addend = double_block(&addend);
        x >>= 1;
    }
    acc
}

/// One full AES encryption round (SubBytes, ShiftRows, MixColumns,
/// AddRoundKey) on a raw 16-byte state.
#[inline]
fn aes_round(state: &mut Block16, round_key: &Block16) {
    let mut block = aes::Block::clone_from_slice(state);
    cipher_round(&mut block, aes::Block::from_slice(round_key));
    state.copy_from_slice(&block);
}

// ---------------------------------------------------------------------------
// Aez
// ---------------------------------------------------------------------------

/// AEZ subkey schedule extracted from an arbitrary-length key.
///
/// Subkeys are zeroized on drop; the struct is built once per
/// encipher/decipher call and never cached.
#[derive(Zeroize, ZeroizeOnDrop)]
struct Aez {
    i: Block16,
    j: Block16,
    l: Block16,
}

impl Aez {
    /// Extract: a 48-byte key is split directly; anything else is first
    /// hashed to 48 bytes with BLAKE2b.
    fn new(key: &[u8]) -> Result<Self> {
        let mut extracted = [0u8; EXTRACTED_KEY_SIZE];
        if key.len() == EXTRACTED_KEY_SIZE {
            extracted.copy_from_slice(key);
        } else {
            let mut hasher = Blake2bVar::new(EXTRACTED_KEY_SIZE).map_err(|e| {
                CipherSeedError::CryptoError {
                    reason: format!("BLAKE2b init failed: {e}"),
                }
            })?;
            hasher.update(key);
            hasher
                .finalize_variable(&mut extracted)
                .map_err(|e| CipherSeedError::CryptoError {
                    reason: format!("BLAKE2b finalize failed: {e}"),
                })?;
        }

        let mut i = [0u8; 16];
        let mut j = [0u8; 16];
        let mut l = [0u8; 16];
        i.copy_from_slice(&extracted[0..16]);
        j.copy_from_slice(&extracted[16..32]);
        l.copy_from_slice(&extracted[32..48]);
        extracted.zeroize();

        Ok(Self { i, j, l })
    }

    /// AES4: four rounds keyed (J, I, L, 0), input pre-whitened with
    /// `offset`.
    fn aes4(&self, offset: &Block16, x: &Block16) -> Block16 {
        let mut state = xor_block(x, offset);
        aes_round(&mut state, &self.j);
        aes_round(&mut state, &self.i);
        aes_round(&mut state, &self.l);
        aes_round(&mut state, &[0u8; 16]);
        state
    }

    /// AES10: ten rounds keyed (I, J, L) repeating, closing with I.
    fn aes10(&self, offset: &Block16, x: &Block16) -> Block16 {
        let mut state = xor_block(x, offset);
        for r in 0..10 {
            let key = match r % 3 {
                0 => &self.i,
                1 => &self.j,
                _ => &self.l,
            };
            aes_round(&mut state, key);
        }
        state
    }

    /// The tweakable PRP `E` with a non-negative first index: AES4 with
    /// offset `j*J + 2^ceil(i/8)*I + (i mod 8)*L` for `j >= 1`, and the
    /// plain `i*L` offset for `j = 0`.
    fn e4(&self, j: u64, i: u64, x: &Block16) -> Block16 {
        let offset = if j == 0 {
            mult_block(i, &self.l)
        } else {
            let mut offset = mult_block(j, &self.j);
            xor_into(&mut offset, &mult_block(1 << i.div_ceil(8), &self.i));
            xor_into(&mut offset, &mult_block(i % 8, &self.l));
            offset
        };
        self.aes4(&offset, x)
    }

    /// `E` with first index -1: AES10 with offset `i*L`.
    fn e10(&self, i: u64, x: &Block16) -> Block16 {
        self.aes10(&mult_block(i, &self.l), x)
    }

    /// Absorbs one tweak (vector component `index`, zero-based) into a
    /// running sum. Full 16-byte chunks use block indices 1, 2, ...;
    /// a trailing fractional chunk, or an empty tweak, is 10*-padded
    /// and uses block index 0.
    fn hash_tweak(&self, index: u64, tweak: &[u8], sum: &mut Block16) {
        let j = index + 3;
        if tweak.is_empty() {
            let mut block = [0u8; 16];
            block[0] = 0x80;
            xor_into(sum, &self.e4(j, 0, &block));
            return;
        }

        let mut chunks = tweak.chunks_exact(16);
        let mut i = 1u64;
        for full in &mut chunks {
            let mut block = [0u8; 16];
            block.copy_from_slice(full);
            xor_into(sum, &self.e4(j, i, &block));
            i += 1;
        }
        let rem = chunks.remainder();
        if !rem.is_empty() {
            let mut block = [0u8; 16];
            block[..rem.len()].copy_from_slice(rem);
            block[rem.len()] = 0x80;
            xor_into(sum, &self.e4(j, 0, &block));
        }
    }

    /// AEZ-hash: folds the authenticator length (in bits), the nonce
    /// and each associated-data string into the 128-bit tweak value
    /// that parameterizes enciphering.
    fn hash(&self, nonce: &[u8], ad: &[&[u8]], abytes: usize) -> Block16 {
        let mut sum = [0u8; 16];

        let tau_bits = (abytes as u32) * 8;
        let mut tau_block = [0u8; 16];
        tau_block[12..16].copy_from_slice(&tau_bits.to_be_bytes());
        self.hash_tweak(0, &tau_block, &mut sum);

        self.hash_tweak(1, nonce, &mut sum);
        for (k, item) in ad.iter().enumerate() {
            self.hash_tweak(2 + k as u64, item, &mut sum);
        }
        sum
    }

    /// AEZ-prf: the keystream used when there is no plaintext at all.
    fn prf(&self, delta: &Block16, out_len: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(out_len);
        let mut counter = [0u8; 16];
        while out.len() < out_len {
            let block = self.e10(3, &xor_block(delta, &counter));
            let take = (out_len - out.len()).min(16);
            out.extend_from_slice(&block[..take]);
            // 128-bit big-endian increment
            for byte in counter.iter_mut().rev() {
                *byte = byte.wrapping_add(1);
                if *byte != 0 {
                    break;
                }
            }
        }
        out
    }

    // -- AEZ-tiny -----------------------------------------------------------

    /// Feistel round function: 10*-pads the right half, folds in the
    /// tweak value and the round counter, and runs AES4.
    fn tiny_round(&self, delta: &Block16, half: &Block16, n_bits: usize, round: u64) -> Block16 {
        let mut block = *half;
        mask_bits(&mut block, n_bits);
        set_bit(&mut block, n_bits, 1);
        xor_into(&mut block, delta);
        block[15] ^= round as u8;
        self.e4(0, 6, &block)
    }

    /// Enciphers a 16..=31-byte block in place of AEZ-core. The input
    /// is split into two equal bit-halves and run through an 8-round
    /// balanced Feistel network.
    fn encipher_tiny(&self, delta: &Block16, x: &[u8]) -> Vec<u8> {
        let n_bits = x.len() * 4;
        let (mut left, mut right) = split_halves(x, n_bits);

        for round in 0..8u64 {
            let mut new_right = self.tiny_round(delta, &right, n_bits, round);
            mask_bits(&mut new_right, n_bits);
            xor_into(&mut new_right, &left);
            left = right;
            right = new_right;
        }
        join_halves(&right, &left, n_bits, x.len())
    }

    /// Inverse of [`Self::encipher_tiny`].
    fn decipher_tiny(&self, delta: &Block16, c: &[u8]) -> Vec<u8> {
        let n_bits = c.len() * 4;
        let (mut right, mut left) = split_halves(c, n_bits);

        for round in (0..8u64).rev() {
            let old_right = left;
            let mut old_left = self.tiny_round(delta, &old_right, n_bits, round);
            mask_bits(&mut old_left, n_bits);
            xor_into(&mut old_left, &right);
            left = old_left;
            right = old_right;
        }
        join_halves(&left, &right, n_bits, c.len())
    }
}

// ---------------------------------------------------------------------------
// Bit-half plumbing
// ---------------------------------------------------------------------------

#[inline]
fn get_bit(src: &[u8], idx: usize) -> u8 {
    (src[idx / 8] >> (7 - idx % 8)) & 1
}

#[inline]
fn set_bit(dst: &mut [u8], idx: usize, bit: u8) {
    let mask = 1 << (7 - idx % 8);
    if bit != 0 {
        dst[idx / 8] |= mask;
    } else {
        dst[idx / 8] &= !mask;
    }
}

/// Zeroes every bit at position `n_bits` and beyond.
fn mask_bits(block: &mut Block16, n_bits: usize) {
    let full = n_bits / 8;
    if n_bits % 8 != 0 {
        block[full] &= 0xFF << (8 - n_bits % 8);
        for byte in block.iter_mut().skip(full + 1) {
            *byte = 0;
        }
    } else {
        for byte in block.iter_mut().skip(full) {
            *byte = 0;
        }
    }
}

/// Splits `x` into two left-aligned `n_bits`-wide halves. Halves are
/// nibble-aligned for odd input lengths, so a plain bit copy keeps the
/// code uniform.
fn split_halves(x: &[u8], n_bits: usize) -> (Block16, Block16) {
    let mut left = [0u8; 16];
    let mut right = [0u8; 16];
    for b in 0..n_bits {
        set_bit(&mut left, b, get_bit(x, b));
        set_bit(&mut right, b, get_bit(x, n_bits + b));
    }
    (left, right)
}

/// Concatenates two left-aligned `n_bits`-wide halves back into
/// `len` bytes.
fn join_halves(first: &Block16, second: &Block16, n_bits: usize, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    for b in 0..n_bits {
        set_bit(&mut out, b, get_bit(first, b));
        set_bit(&mut out, n_bits + b, get_bit(second, b));
    }
    out
}

/// Constant-time check that every byte of `bytes` is zero.
fn all_zero(bytes: &[u8]) -> bool {
    bytes.iter().fold(0u8, |acc, b| acc | b) == 0
}

/// Constant-time slice equality for same-length slices.
fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b.iter())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
}

// ---------------------------------------------------------------------------
// Encrypt / Decrypt
// ---------------------------------------------------------------------------

/// Enciphers `plaintext` under `key`, expanding it by `abytes` bytes.
///
/// The nonce and every associated-data string are authenticated via
/// the tweak; none of them travel with the ciphertext. An empty
/// plaintext yields `abytes` bytes of AEZ-prf output.
///
/// # Errors
///
/// Returns [`CipherSeedError::CryptoError`] if `plaintext.len() +
/// abytes` falls outside the supported 16..=31 byte window (and is not
/// the empty-plaintext case).
pub fn encrypt(
    key: &[u8],
    nonce: &[u8],
    ad: &[&[u8]],
    abytes: usize,
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let aez = Aez::new(key)?;
    let delta = aez.hash(nonce, ad, abytes);

    if plaintext.is_empty() {
        return Ok(aez.prf(&delta, abytes));
    }

    let total = plaintext.len() + abytes;
    check_tiny_size(total)?;

    let mut buffer = vec![0u8; total];
    buffer[..plaintext.len()].copy_from_slice(plaintext);
    let ciphertext = aez.encipher_tiny(&delta, &buffer);
    buffer.zeroize();
    Ok(ciphertext)
}

/// Deciphers `ciphertext` and verifies its `abytes` of expansion.
///
/// # Errors
///
/// - [`CipherSeedError::DecryptionFailed`] if the authenticator does
///   not verify (wrong key, wrong nonce or AD, tampered ciphertext).
/// - [`CipherSeedError::CryptoError`] if the ciphertext length falls
///   outside the supported window.
pub fn decrypt(
    key: &[u8],
    nonce: &[u8],
    ad: &[&[u8]],
    abytes: usize,
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    if ciphertext.len() < abytes {
        return Err(CipherSeedError::DecryptionFailed);
    }

    let aez = Aez::new(key)?;
    let delta = aez.hash(nonce, ad, abytes);

    if ciphertext.len() == abytes {
        // Empty plaintext: the ciphertext must equal the PRF output.
        if !ct_eq(ciphertext, &aez.prf(&delta, abytes)) {
            return Err(CipherSeedError::DecryptionFailed);
        }
        return Ok(Vec::new());
    }

    check_tiny_size(ciphertext.len())?;

    let mut buffer = aez.decipher_tiny(&delta, ciphertext);
    if !all_zero(&buffer[buffer.len() - abytes..]) {
        buffer.zeroize();
        return Err(CipherSeedError::DecryptionFailed);
    }
    buffer.truncate(buffer.len() - abytes);
    Ok(buffer)
}

fn check_tiny_size(total: usize) -> Result<()> {
    if !(MIN_TINY_SIZE..CORE_THRESHOLD).contains(&total) {
        return Err(CipherSeedError::CryptoError {
            reason: format!(
                "unsupported AEZ block size {total}, expected {MIN_TINY_SIZE}..{CORE_THRESHOLD} bytes"
            ),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 32] = [0x42; 32];
    const AD: &[&[u8]] = &[b"header bytes"];

    #[test]
    fn doubling_matches_reference() {
        // 2 * 1 = 2 in GF(2^128), MSB-first layout.
        let mut one = [0u8; 16];
        one[15] = 1;
        let mut two = [0u8; 16];
        two[15] = 2;
        assert_eq!(double_block(&one), two);

        // Doubling a block with the top bit set folds in 0x87.
        let mut high = [0u8; 16];
        high[0] = 0x80;
        let mut expected = [0u8; 16];
        expected[15] = 0x87;
        assert_eq!(double_block(&high), expected);
    }

    #[test]
    fn mult_block_is_repeated_doubling() {
        let b: Block16 = *b"0123456789abcdef";
        assert_eq!(mult_block(0, &b), [0u8; 16]);
        assert_eq!(mult_block(1, &b), b);
        assert_eq!(mult_block(2, &b), double_block(&b));
        assert_eq!(
            mult_block(3, &b),
            xor_block(&b, &double_block(&b)),
        );
        assert_eq!(mult_block(4, &b), double_block(&double_block(&b)));
    }

    #[test]
    fn halves_split_and_rejoin() {
        let x: Vec<u8> = (0..23u8).map(|v| v.wrapping_mul(37).wrapping_add(11)).collect();
        let n_bits = x.len() * 4;
        let (l, r) = split_halves(&x, n_bits);
        assert_eq!(join_halves(&l, &r, n_bits, x.len()), x);
    }

    #[test]
    fn roundtrip_19_bytes_with_expansion_4() -> std::result::Result<(), CipherSeedError> {
        let plaintext = [0xA7u8; 19];
        let ciphertext = encrypt(&KEY, b"", AD, 4, &plaintext)?;
        assert_eq!(ciphertext.len(), 23);
        assert_ne!(&ciphertext[..19], plaintext.as_slice());

        let recovered = decrypt(&KEY, b"", AD, 4, &ciphertext)?;
        assert_eq!(recovered.as_slice(), plaintext.as_slice());
        Ok(())
    }

    #[test]
    fn roundtrip_all_supported_sizes() -> std::result::Result<(), CipherSeedError> {
        for len in 16..32usize {
            let plaintext: Vec<u8> = (0..len as u8).collect();
            let ciphertext = encrypt(&KEY, b"nonce", AD, 0, &plaintext)?;
            assert_eq!(ciphertext.len(), len);
            let recovered = decrypt(&KEY, b"nonce", AD, 0, &ciphertext)?;
            assert_eq!(recovered, plaintext, "length {len}");
        }
        Ok(())
    }

    #[test]
    fn encryption_is_deterministic() -> std::result::Result<(), CipherSeedError> {
        let plaintext = [0x11u8; 19];
        let c1 = encrypt(&KEY, b"", AD, 4, &plaintext)?;
        let c2 = encrypt(&KEY, b"", AD, 4, &plaintext)?;
        assert_eq!(c1, c2);
        Ok(())
    }

    #[test]
    fn wrong_key_fails() -> std::result::Result<(), CipherSeedError> {
        let ciphertext = encrypt(&KEY, b"", AD, 4, &[0x5Au8; 19])?;
        let result = decrypt(&[0x43u8; 32], b"", AD, 4, &ciphertext);
        assert_eq!(result, Err(CipherSeedError::DecryptionFailed));
        Ok(())
    }

    #[test]
    fn wrong_ad_fails() -> std::result::Result<(), CipherSeedError> {
        let ciphertext = encrypt(&KEY, b"", AD, 4, &[0x5Au8; 19])?;
        let result = decrypt(&KEY, b"", &[b"other header"], 4, &ciphertext);
        assert_eq!(result, Err(CipherSeedError::DecryptionFailed));
        Ok(())
    }

    #[test]
    fn wrong_nonce_fails() -> std::result::Result<(), CipherSeedError> {
        let ciphertext = encrypt(&KEY, b"nonce-a", AD, 4, &[0x5Au8; 19])?;
        let result = decrypt(&KEY, b"nonce-b", AD, 4, &ciphertext);
        assert_eq!(result, Err(CipherSeedError::DecryptionFailed));
        Ok(())
    }

    #[test]
    fn every_flipped_ciphertext_bit_fails() -> std::result::Result<(), CipherSeedError> {
        let ciphertext = encrypt(&KEY, b"", AD, 4, &[0xC3u8; 19])?;
        for byte in 0..ciphertext.len() {
            for bit in 0..8 {
                let mut tampered = ciphertext.clone();
                tampered[byte] ^= 1 << bit;
                assert_eq!(
                    decrypt(&KEY, b"", AD, 4, &tampered),
                    Err(CipherSeedError::DecryptionFailed),
                    "flip at byte {byte} bit {bit} went undetected"
                );
            }
        }
        Ok(())
    }

    #[test]
    fn single_bit_flip_diffuses_widely() -> std::result::Result<(), CipherSeedError> {
        // A wide-block cipher must not behave like a stream cipher:
        // flipping one plaintext bit changes roughly half the
        // ciphertext, not one bit.
        let mut plaintext = [0x00u8; 19];
        let c1 = encrypt(&KEY, b"", AD, 4, &plaintext)?;
        plaintext[9] ^= 0x01;
        let c2 = encrypt(&KEY, b"", AD, 4, &plaintext)?;

        let differing_bits: u32 = c1
            .iter()
            .zip(c2.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum();
        assert!(differing_bits > 40, "only {differing_bits} bits changed");
        Ok(())
    }

    #[test]
    fn empty_plaintext_uses_prf() -> std::result::Result<(), CipherSeedError> {
        let ciphertext = encrypt(&KEY, b"", AD, 4, b"")?;
        assert_eq!(ciphertext.len(), 4);

        let recovered = decrypt(&KEY, b"", AD, 4, &ciphertext)?;
        assert!(recovered.is_empty());

        let mut tampered = ciphertext.clone();
        tampered[0] ^= 1;
        assert_eq!(
            decrypt(&KEY, b"", AD, 4, &tampered),
            Err(CipherSeedError::DecryptionFailed)
        );
        Ok(())
    }

    #[test]
    fn oversize_input_rejected() {
        let result = encrypt(&KEY, b"", AD, 4, &[0u8; 28]);
        assert!(matches!(result, Err(CipherSeedError::CryptoError { .. })));
    }

    #[test]
    fn undersize_input_rejected() {
        let result = encrypt(&KEY, b"", AD, 4, &[0u8; 5]);
        assert!(matches!(result, Err(CipherSeedError::CryptoError { .. })));
    }

    #[test]
    fn short_ciphertext_rejected() {
        let result = decrypt(&KEY, b"", AD, 4, &[0u8; 2]);
        assert_eq!(result, Err(CipherSeedError::DecryptionFailed));
    }

    #[test]
    fn key_extraction_accepts_any_length() -> std::result::Result<(), CipherSeedError> {
        // 48-byte keys skip extraction; everything else goes through
        // BLAKE2b. Both paths must produce a working schedule.
        for key_len in [16usize, 32, 48, 64] {
            let key = vec![0x33u8; key_len];
            let ciphertext = encrypt(&key, b"", AD, 4, &[0x77u8; 19])?;
            let recovered = decrypt(&key, b"", AD, 4, &ciphertext)?;
            assert_eq!(recovered, vec![0x77u8; 19]);
        }
        Ok(())
    }
}
