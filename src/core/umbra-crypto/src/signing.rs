//! Message authentication and digital signatures.
//!
//! Two schemes are available:
//! - HMAC-SHA256, keyed with symmetric material of any non-zero length
//! - Ed25519, keyed with a 32-byte seed
//!
//! Verification reports a mismatching signature as `Ok(false)`. Errors are
//! reserved for keys that cannot be used at all.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::CryptoError;

type HmacSha256 = Hmac<Sha256>;

/// Size of an Ed25519 seed in bytes.
pub const ED25519_SEED_SIZE: usize = 32;

/// Size of an Ed25519 public key in bytes.
pub const ED25519_PUBLIC_KEY_SIZE: usize = 32;

/// Size of an HMAC-SHA256 tag in bytes.
pub const HMAC_TAG_SIZE: usize = 32;

/// Computes an HMAC-SHA256 tag.
pub fn hmac_sign(key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut mac = hmac_new(key)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Verifies an HMAC-SHA256 tag in constant time.
pub fn hmac_verify(key: &[u8], data: &[u8], tag: &[u8]) -> Result<bool, CryptoError> {
    let mut mac = hmac_new(key)?;
    mac.update(data);
    Ok(mac.verify_slice(tag).is_ok())
}

fn hmac_new(key: &[u8]) -> Result<HmacSha256, CryptoError> {
    if key.is_empty() {
        return Err(CryptoError::InvalidKey("HMAC key must not be empty".to_string()));
    }
    HmacSha256::new_from_slice(key).map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

fn ed25519_signing_key(seed: &[u8]) -> Result<SigningKey, CryptoError> {
    let seed: &[u8; ED25519_SEED_SIZE] = seed.try_into().map_err(|_| {
        CryptoError::InvalidKey(format!(
            "expected {} byte Ed25519 seed, got {}",
            ED25519_SEED_SIZE,
            seed.len()
        ))
    })?;
    Ok(SigningKey::from_bytes(seed))
}

/// Derives the Ed25519 public key for a seed.
pub fn ed25519_public_key(seed: &[u8]) -> Result<Vec<u8>, CryptoError> {
    Ok(ed25519_signing_key(seed)?.verifying_key().to_bytes().to_vec())
}

/// Signs `data` with the Ed25519 key derived from `seed`.
pub fn ed25519_sign(seed: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let signing_key = ed25519_signing_key(seed)?;
    Ok(signing_key.sign(data).to_bytes().to_vec())
}

/// Verifies an Ed25519 signature against a public key.
pub fn ed25519_verify(
    public_key: &[u8],
    data: &[u8],
    signature: &[u8],
) -> Result<bool, CryptoError> {
    let public_key: &[u8; ED25519_PUBLIC_KEY_SIZE] = public_key.try_into().map_err(|_| {
        CryptoError::InvalidKey(format!(
            "expected {} byte Ed25519 public key, got {}",
            ED25519_PUBLIC_KEY_SIZE,
            public_key.len()
        ))
    })?;
    let verifying_key = VerifyingKey::from_bytes(public_key)
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

    let Ok(signature) = Signature::from_slice(signature) else {
        return Ok(false);
    };

    Ok(verifying_key.verify(data, &signature).is_ok())
}
