//! The three protocol tiers.

use async_trait::async_trait;
use umbra_crypto::SecureBuffer;
use umbra_keystore::KeyInfo;

use crate::capability::{CapabilityTier, ProtocolOperation};
use crate::error::ProtocolError;
use crate::types::{KeyPairInfo, ServiceStatus};

/// Tier 1: liveness and key synchronisation.
#[async_trait]
pub trait BasicProtocol: Send + Sync {
    /// The tier this object really implements.
    fn capability_tier(&self) -> CapabilityTier;

    /// Protocol version of [`capability_tier`](Self::capability_tier).
    fn protocol_version(&self) -> &'static str {
        self.capability_tier().protocol_version()
    }

    /// Whether calling `operation` can succeed.
    fn supports(&self, operation: ProtocolOperation) -> bool {
        self.capability_tier().supports(operation)
    }

    /// Checks that the service is reachable.
    async fn ping(&self) -> Result<(), ProtocolError>;

    /// Imports keys from a JSON key bundle. Returns how many were new.
    async fn synchronise_keys(&self, bundle: &[u8]) -> Result<usize, ProtocolError>;
}

/// Tier 2: everyday cryptography and key management.
#[async_trait]
pub trait StandardProtocol: BasicProtocol {
    /// Health and capability snapshot.
    async fn status(&self) -> Result<ServiceStatus, ProtocolError>;

    /// Stable identifier of the device or instance.
    async fn get_hardware_identifier(&self) -> Result<String, ProtocolError>;

    /// Deletes every key.
    async fn reset_security_data(&self) -> Result<(), ProtocolError>;

    /// Returns `length` random bytes.
    async fn generate_random_data(&self, length: usize) -> Result<SecureBuffer, ProtocolError>;

    /// Encrypts with the named key, or the service key when `key_id` is `None`.
    async fn encrypt_secure_data(
        &self,
        data: &[u8],
        key_id: Option<&str>,
    ) -> Result<SecureBuffer, ProtocolError>;

    /// Decrypts with the named key, or the service key when `key_id` is `None`.
    async fn decrypt_secure_data(
        &self,
        data: &[u8],
        key_id: Option<&str>,
    ) -> Result<SecureBuffer, ProtocolError>;

    /// Signs `data` with the named key.
    async fn sign(&self, data: &[u8], key_id: &str) -> Result<Vec<u8>, ProtocolError>;

    /// Verifies a signature. A mismatch is `Ok(false)`.
    async fn verify(
        &self,
        data: &[u8],
        signature: &[u8],
        key_id: &str,
    ) -> Result<bool, ProtocolError>;

    /// Stores symmetric material under `identifier`.
    async fn import_key(
        &self,
        identifier: &str,
        material: SecureBuffer,
    ) -> Result<(), ProtocolError>;

    /// Identifiers of every live key.
    async fn list_keys(&self) -> Result<Vec<String>, ProtocolError>;

    /// Metadata about one key.
    async fn get_key_info(&self, identifier: &str) -> Result<KeyInfo, ProtocolError>;

    /// Deletes one key.
    async fn delete_key(&self, identifier: &str) -> Result<(), ProtocolError>;

    /// Returns the material of one key.
    async fn export_key(&self, identifier: &str) -> Result<SecureBuffer, ProtocolError>;
}

/// Tier 3: associated data, key pairs, derivation and backups.
#[async_trait]
pub trait CompleteProtocol: StandardProtocol {
    /// Encrypts, binding `associated_data` to the ciphertext.
    async fn authenticated_encrypt(
        &self,
        data: &[u8],
        associated_data: &[u8],
        key_id: Option<&str>,
    ) -> Result<SecureBuffer, ProtocolError>;

    /// Decrypts, checking `associated_data`.
    async fn authenticated_decrypt(
        &self,
        data: &[u8],
        associated_data: &[u8],
        key_id: Option<&str>,
    ) -> Result<SecureBuffer, ProtocolError>;

    /// Generates and stores a signing key pair.
    async fn generate_key_pair(
        &self,
        identifier: Option<&str>,
    ) -> Result<KeyPairInfo, ProtocolError>;

    /// Derives `length` bytes from the named key.
    async fn derive_key(
        &self,
        key_id: &str,
        salt: Option<&[u8]>,
        info: &[u8],
        length: usize,
    ) -> Result<SecureBuffer, ProtocolError>;

    /// Produces a password-protected backup of every live key.
    async fn create_secure_backup(&self, password: &str) -> Result<Vec<u8>, ProtocolError>;

    /// Restores keys from a backup. Returns how many were restored.
    async fn restore_secure_backup(
        &self,
        backup: &[u8],
        password: &str,
    ) -> Result<usize, ProtocolError>;
}
