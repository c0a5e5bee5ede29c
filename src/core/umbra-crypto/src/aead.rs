//! AES-GCM authenticated encryption.
//!
//! Supports AES-128-GCM and AES-256-GCM, selected by key length. The nonce is
//! generated per call and prepended to the output:
//! `nonce (12 bytes) || ciphertext || tag (16 bytes)`.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, Nonce, Payload},
    Aes128Gcm, Aes256Gcm,
};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::random::generate_nonce;

/// Size of an AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of an AES-128 key in bytes.
pub const KEY_SIZE_128: usize = 16;

/// Size of a GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// Size of a GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Encrypts plaintext with AES-GCM.
///
/// # Arguments
///
/// * `key` - 16- or 32-byte encryption key
/// * `plaintext` - Data to encrypt
/// * `associated_data` - Optional additional data to authenticate (not encrypted)
pub fn encrypt(
    key: &[u8],
    plaintext: &[u8],
    associated_data: Option<&[u8]>,
) -> Result<Vec<u8>, CryptoError> {
    match key.len() {
        KEY_SIZE => seal::<Aes256Gcm>(key, plaintext, associated_data),
        KEY_SIZE_128 => seal::<Aes128Gcm>(key, plaintext, associated_data),
        other => Err(invalid_key_length(other)),
    }
}

/// Decrypts ciphertext produced by [`encrypt`].
///
/// Returns the plaintext wrapped in `Zeroizing` for automatic memory cleanup.
pub fn decrypt(
    key: &[u8],
    ciphertext: &[u8],
    associated_data: Option<&[u8]>,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if !matches!(key.len(), KEY_SIZE | KEY_SIZE_128) {
        return Err(invalid_key_length(key.len()));
    }

    if ciphertext.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::InvalidInput(
            "ciphertext too short".to_string(),
        ));
    }

    if key.len() == KEY_SIZE {
        open::<Aes256Gcm>(key, ciphertext, associated_data)
    } else {
        open::<Aes128Gcm>(key, ciphertext, associated_data)
    }
}

fn seal<C>(key: &[u8], plaintext: &[u8], aad: Option<&[u8]>) -> Result<Vec<u8>, CryptoError>
where
    C: Aead + AeadCore + KeyInit,
{
    let cipher =
        C::new_from_slice(key).map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let nonce_bytes = generate_nonce();
    let nonce = Nonce::<C>::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad: aad.unwrap_or_default(),
            },
        )
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    result.extend_from_slice(&nonce_bytes);
    result.extend_from_slice(&ciphertext);

    Ok(result)
}

fn open<C>(
    key: &[u8],
    ciphertext: &[u8],
    aad: Option<&[u8]>,
) -> Result<Zeroizing<Vec<u8>>, CryptoError>
where
    C: Aead + AeadCore + KeyInit,
{
    let cipher =
        C::new_from_slice(key).map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?;

    let nonce = Nonce::<C>::from_slice(&ciphertext[..NONCE_SIZE]);
    let plaintext = cipher
        .decrypt(
            nonce,
            Payload {
                msg: &ciphertext[NONCE_SIZE..],
                aad: aad.unwrap_or_default(),
            },
        )
        .map_err(|_| CryptoError::DecryptionFailed("authentication failed".to_string()))?;

    Ok(Zeroizing::new(plaintext))
}

fn invalid_key_length(actual: usize) -> CryptoError {
    CryptoError::InvalidKey(format!(
        "expected {} or {} bytes, got {}",
        KEY_SIZE_128, KEY_SIZE, actual
    ))
}
