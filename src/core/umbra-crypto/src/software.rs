//! Software reference engine.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::debug;

use crate::aead;
use crate::buffer::SecureBuffer;
use crate::config::{options, OperationConfig};
use crate::digest::DigestAlgorithm;
use crate::engine::{CryptoEngine, KeyPair};
use crate::error::CryptoError;
use crate::kdf;
use crate::random;
use crate::signing;

/// Algorithm name for Ed25519 signatures and key pairs.
pub const ED25519: &str = "Ed25519";

/// Algorithm name for HMAC-SHA256 tags.
pub const HMAC_SHA256: &str = "HMAC-SHA256";

/// [`CryptoEngine`] backed by RustCrypto and dalek primitives.
///
/// | Operation | Algorithms |
/// |---|---|
/// | encrypt / decrypt | `AES-GCM` (16- or 32-byte key) |
/// | hash | `SHA-256`, `SHA-384`, `SHA-512` |
/// | sign / verify | `Ed25519`, otherwise HMAC-SHA256 |
/// | key pairs | `Ed25519` |
/// | derivation | HKDF-SHA256 |
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareEngine;

impl SoftwareEngine {
    /// Creates the engine.
    pub fn new() -> Self {
        Self
    }

    fn require_aes(config: &OperationConfig) -> Result<(), CryptoError> {
        if config.algorithm().to_ascii_uppercase().starts_with("AES") {
            Ok(())
        } else {
            Err(CryptoError::UnsupportedAlgorithm(config.algorithm().to_string()))
        }
    }

    fn associated_data(config: &OperationConfig) -> Result<Option<Vec<u8>>, CryptoError> {
        config
            .option(options::ASSOCIATED_DATA)
            .map(|encoded| {
                BASE64.decode(encoded).map_err(|e| {
                    CryptoError::InvalidInput(format!("associatedData is not base64: {}", e))
                })
            })
            .transpose()
    }

    fn digest_for(config: &OperationConfig) -> Result<DigestAlgorithm, CryptoError> {
        if let Some(name) = config.option(options::DIGEST) {
            return DigestAlgorithm::from_name(name);
        }
        if config.algorithm().to_ascii_uppercase().starts_with("SHA") {
            return DigestAlgorithm::from_name(config.algorithm());
        }
        Ok(DigestAlgorithm::default())
    }

    fn is_ed25519(config: &OperationConfig) -> bool {
        config.algorithm().eq_ignore_ascii_case(ED25519)
    }
}

#[async_trait]
impl CryptoEngine for SoftwareEngine {
    fn name(&self) -> &'static str {
        "software"
    }

    async fn encrypt(
        &self,
        data: &[u8],
        key: &SecureBuffer,
        config: &OperationConfig,
    ) -> Result<SecureBuffer, CryptoError> {
        Self::require_aes(config)?;
        let aad = Self::associated_data(config)?;
        let ciphertext = aead::encrypt(key.as_bytes(), data, aad.as_deref())?;
        Ok(SecureBuffer::new(ciphertext))
    }

    async fn decrypt(
        &self,
        data: &[u8],
        key: &SecureBuffer,
        config: &OperationConfig,
    ) -> Result<SecureBuffer, CryptoError> {
        Self::require_aes(config)?;
        let aad = Self::associated_data(config)?;
        let plaintext = aead::decrypt(key.as_bytes(), data, aad.as_deref())?;
        Ok(SecureBuffer::from(plaintext))
    }

    async fn hash(&self, data: &[u8], config: &OperationConfig) -> Result<Vec<u8>, CryptoError> {
        let algorithm = Self::digest_for(config)?;
        Ok(algorithm.digest(data))
    }

    async fn sign(
        &self,
        data: &[u8],
        key: &SecureBuffer,
        config: &OperationConfig,
    ) -> Result<Vec<u8>, CryptoError> {
        if Self::is_ed25519(config) {
            signing::ed25519_sign(key.as_bytes(), data)
        } else {
            signing::hmac_sign(key.as_bytes(), data)
        }
    }

    async fn verify(
        &self,
        data: &[u8],
        signature: &[u8],
        key: &SecureBuffer,
        config: &OperationConfig,
    ) -> Result<bool, CryptoError> {
        if Self::is_ed25519(config) {
            let public_key = signing::ed25519_public_key(key.as_bytes())?;
            signing::ed25519_verify(&public_key, data, signature)
        } else {
            signing::hmac_verify(key.as_bytes(), data, signature)
        }
    }

    async fn generate_random(&self, length: usize) -> Result<SecureBuffer, CryptoError> {
        Ok(SecureBuffer::from(random::generate_bytes(length)))
    }

    async fn generate_key_pair(&self, config: &OperationConfig) -> Result<KeyPair, CryptoError> {
        if !Self::is_ed25519(config) {
            return Err(CryptoError::UnsupportedAlgorithm(config.algorithm().to_string()));
        }

        let seed = random::generate_seed();
        let public_key = signing::ed25519_public_key(&*seed)
            .map_err(|e| CryptoError::KeyGenerationFailed(e.to_string()))?;
        debug!(algorithm = ED25519, "Key pair generated");

        Ok(KeyPair {
            public_key,
            private_key: SecureBuffer::from_slice(&*seed),
            algorithm: ED25519.to_string(),
        })
    }

    async fn derive_key(
        &self,
        material: &SecureBuffer,
        salt: Option<&[u8]>,
        info: &[u8],
        length: usize,
    ) -> Result<SecureBuffer, CryptoError> {
        let derived = kdf::derive_key(material.as_bytes(), salt, info, length)?;
        Ok(SecureBuffer::from(derived))
    }
}
