//! Cryptographically secure random generation.
//!
//! Uses the operating system's CSPRNG for all random number generation.

use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

use crate::aead::NONCE_SIZE;

/// Generates cryptographically secure random bytes.
///
/// The bytes are wrapped in `Zeroizing` so they are cleared when dropped.
pub fn generate_bytes(len: usize) -> Zeroizing<Vec<u8>> {
    let mut bytes = Zeroizing::new(vec![0u8; len]);
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Generates a random 32-byte seed.
pub fn generate_seed() -> Zeroizing<[u8; 32]> {
    let mut seed = Zeroizing::new([0u8; 32]);
    OsRng.fill_bytes(&mut *seed);
    seed
}

/// Generates a cryptographically secure random nonce for AES-GCM.
pub fn generate_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Generates a cryptographically secure random token as a hex string.
///
/// # Arguments
///
/// * `byte_len` - Number of random bytes (output string will be 2x this length)
pub fn generate_token(byte_len: usize) -> String {
    let bytes = generate_bytes(byte_len);
    hex_encode(&bytes)
}

/// Encodes bytes as lowercase hexadecimal.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";
    let mut hex = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        hex.push(HEX_CHARS[(byte >> 4) as usize] as char);
        hex.push(HEX_CHARS[(byte & 0x0F) as usize] as char);
    }
    hex
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_bytes_length() {
        for len in [0, 1, 16, 32, 64, 128] {
            let bytes = generate_bytes(len);
            assert_eq!(bytes.len(), len);
        }
    }

    #[test]
    fn test_generate_seed_unique() {
        let seed1 = generate_seed();
        let seed2 = generate_seed();
        assert_ne!(*seed1, *seed2);
    }

    #[test]
    fn test_generate_nonce_length() {
        let nonce = generate_nonce();
        assert_eq!(nonce.len(), NONCE_SIZE);
    }

    #[test]
    fn test_generate_token_hex_format() {
        let token = generate_token(16);
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_randomness_distribution() {
        let mut seen = HashSet::new();
        for _ in 0..100 {
            let token = generate_token(8);
            assert!(seen.insert(token), "duplicate token generated");
        }
    }
}
