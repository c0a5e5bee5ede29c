//! The primitive-cryptography seam.
//!
//! Everything above this crate consumes cryptography through [`CryptoEngine`],
//! so a hardware-backed or remote engine can stand in for
//! [`SoftwareEngine`](crate::SoftwareEngine).

use async_trait::async_trait;

use crate::buffer::SecureBuffer;
use crate::config::OperationConfig;
use crate::error::CryptoError;

/// A freshly generated asymmetric key pair.
#[derive(Clone)]
pub struct KeyPair {
    /// Public half, safe to share.
    pub public_key: Vec<u8>,
    /// Private half.
    pub private_key: SecureBuffer,
    /// Algorithm the pair belongs to.
    pub algorithm: String,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key_len", &self.public_key.len())
            .field("private_key", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

/// Primitive cryptography provider.
#[async_trait]
pub trait CryptoEngine: Send + Sync {
    /// Short engine name used in logs.
    fn name(&self) -> &'static str;

    /// Encrypts `data` under a symmetric key.
    async fn encrypt(
        &self,
        data: &[u8],
        key: &SecureBuffer,
        config: &OperationConfig,
    ) -> Result<SecureBuffer, CryptoError>;

    /// Decrypts `data` under a symmetric key.
    async fn decrypt(
        &self,
        data: &[u8],
        key: &SecureBuffer,
        config: &OperationConfig,
    ) -> Result<SecureBuffer, CryptoError>;

    /// Encrypts `data` to a public key.
    async fn encrypt_asymmetric(
        &self,
        _data: &[u8],
        _public_key: &[u8],
        config: &OperationConfig,
    ) -> Result<SecureBuffer, CryptoError> {
        Err(CryptoError::UnsupportedAlgorithm(format!(
            "{} (asymmetric encryption)",
            config.algorithm()
        )))
    }

    /// Decrypts `data` with a private key.
    async fn decrypt_asymmetric(
        &self,
        _data: &[u8],
        _private_key: &SecureBuffer,
        config: &OperationConfig,
    ) -> Result<SecureBuffer, CryptoError> {
        Err(CryptoError::UnsupportedAlgorithm(format!(
            "{} (asymmetric decryption)",
            config.algorithm()
        )))
    }

    /// Computes a message digest. Must be deterministic.
    async fn hash(&self, data: &[u8], config: &OperationConfig) -> Result<Vec<u8>, CryptoError>;

    /// Signs `data`.
    async fn sign(
        &self,
        data: &[u8],
        key: &SecureBuffer,
        config: &OperationConfig,
    ) -> Result<Vec<u8>, CryptoError>;

    /// Checks a signature. A mismatch is `Ok(false)`, not an error.
    async fn verify(
        &self,
        data: &[u8],
        signature: &[u8],
        key: &SecureBuffer,
        config: &OperationConfig,
    ) -> Result<bool, CryptoError>;

    /// Returns `length` bytes from a CSPRNG.
    async fn generate_random(&self, length: usize) -> Result<SecureBuffer, CryptoError>;

    /// Generates an asymmetric key pair.
    async fn generate_key_pair(&self, config: &OperationConfig) -> Result<KeyPair, CryptoError>;

    /// Derives `length` bytes of key material.
    async fn derive_key(
        &self,
        material: &SecureBuffer,
        salt: Option<&[u8]>,
        info: &[u8],
        length: usize,
    ) -> Result<SecureBuffer, CryptoError>;
}
