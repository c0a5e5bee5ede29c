//! Key derivation functions.
//!
//! Provides HKDF (HMAC-based Key Derivation Function) as specified in RFC 5869.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Largest output HKDF-SHA256 can produce.
pub const MAX_OUTPUT_LEN: usize = 255 * 32;

/// Derives a key using HKDF-SHA256.
///
/// # Arguments
///
/// * `ikm` - Input key material (the secret to derive from)
/// * `salt` - Optional salt value
/// * `info` - Context and application-specific information
/// * `length` - Desired output key length in bytes
///
/// # Returns
///
/// Derived key wrapped in `Zeroizing` for automatic memory cleanup.
pub fn derive_key(
    ikm: &[u8],
    salt: Option<&[u8]>,
    info: &[u8],
    length: usize,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if length == 0 {
        return Err(CryptoError::InvalidInput(
            "output length must be > 0".to_string(),
        ));
    }

    if length > MAX_OUTPUT_LEN {
        return Err(CryptoError::InvalidInput(
            "output length too large for HKDF-SHA256".to_string(),
        ));
    }

    let hkdf = Hkdf::<Sha256>::new(salt, ikm);

    let mut okm = Zeroizing::new(vec![0u8; length]);
    hkdf.expand(info, &mut okm)
        .map_err(|_| CryptoError::KeyGenerationFailed("HKDF expansion failed".to_string()))?;

    Ok(okm)
}
