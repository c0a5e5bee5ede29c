//! Lifting lower-tier implementations to higher-tier interfaces.
//!
//! Operations the wrapped object implements are forwarded unchanged. The rest
//! fail with a permanent `OperationNotSupported` naming the operation.
//! `capability_tier` always reports the wrapped object's tier.

use async_trait::async_trait;
use umbra_crypto::SecureBuffer;
use umbra_keystore::KeyInfo;

use crate::capability::{CapabilityTier, ProtocolOperation as Op};
use crate::error::ProtocolError;
use crate::traits::{BasicProtocol, CompleteProtocol, StandardProtocol};
use crate::types::{KeyPairInfo, ServiceStatus};

/// Exposes a [`BasicProtocol`] object as a [`StandardProtocol`].
#[derive(Debug, Clone)]
pub struct StandardAdapter<B> {
    inner: B,
}

impl<B: BasicProtocol> StandardAdapter<B> {
    /// Wraps a basic implementation.
    pub fn wrap(inner: B) -> Self {
        Self { inner }
    }

    /// The wrapped object.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Unwraps the adapter.
    pub fn into_inner(self) -> B {
        self.inner
    }
}

#[async_trait]
impl<B: BasicProtocol> BasicProtocol for StandardAdapter<B> {
    fn capability_tier(&self) -> CapabilityTier {
        self.inner.capability_tier()
    }

    async fn ping(&self) -> Result<(), ProtocolError> {
        self.inner.ping().await
    }

    async fn synchronise_keys(&self, bundle: &[u8]) -> Result<usize, ProtocolError> {
        self.inner.synchronise_keys(bundle).await
    }
}

#[async_trait]
impl<B: BasicProtocol> StandardProtocol for StandardAdapter<B> {
    async fn status(&self) -> Result<ServiceStatus, ProtocolError> {
        Err(ProtocolError::unsupported(Op::Status))
    }

    async fn get_hardware_identifier(&self) -> Result<String, ProtocolError> {
        Err(ProtocolError::unsupported(Op::GetHardwareIdentifier))
    }

    async fn reset_security_data(&self) -> Result<(), ProtocolError> {
        Err(ProtocolError::unsupported(Op::ResetSecurityData))
    }

    async fn generate_random_data(&self, _length: usize) -> Result<SecureBuffer, ProtocolError> {
        Err(ProtocolError::unsupported(Op::GenerateRandomData))
    }

    async fn encrypt_secure_data(
        &self,
        _data: &[u8],
        _key_id: Option<&str>,
    ) -> Result<SecureBuffer, ProtocolError> {
        Err(ProtocolError::unsupported(Op::EncryptSecureData))
    }

    async fn decrypt_secure_data(
        &self,
        _data: &[u8],
        _key_id: Option<&str>,
    ) -> Result<SecureBuffer, ProtocolError> {
        Err(ProtocolError::unsupported(Op::DecryptSecureData))
    }

    async fn sign(&self, _data: &[u8], _key_id: &str) -> Result<Vec<u8>, ProtocolError> {
        Err(ProtocolError::unsupported(Op::Sign))
    }

    async fn verify(
        &self,
        _data: &[u8],
        _signature: &[u8],
        _key_id: &str,
    ) -> Result<bool, ProtocolError> {
        Err(ProtocolError::unsupported(Op::Verify))
    }

    async fn import_key(
        &self,
        _identifier: &str,
        _material: SecureBuffer,
    ) -> Result<(), ProtocolError> {
        Err(ProtocolError::unsupported(Op::ImportKey))
    }

    async fn list_keys(&self) -> Result<Vec<String>, ProtocolError> {
        Err(ProtocolError::unsupported(Op::ListKeys))
    }

    async fn get_key_info(&self, _identifier: &str) -> Result<KeyInfo, ProtocolError> {
        Err(ProtocolError::unsupported(Op::GetKeyInfo))
    }

    async fn delete_key(&self, _identifier: &str) -> Result<(), ProtocolError> {
        Err(ProtocolError::unsupported(Op::DeleteKey))
    }

    async fn export_key(&self, _identifier: &str) -> Result<SecureBuffer, ProtocolError> {
        Err(ProtocolError::unsupported(Op::ExportKey))
    }
}

/// Exposes a [`StandardProtocol`] object as a [`CompleteProtocol`].
#[derive(Debug, Clone)]
pub struct CompleteAdapter<S> {
    inner: S,
}

impl<S: StandardProtocol> CompleteAdapter<S> {
    /// Wraps a standard implementation.
    pub fn wrap(inner: S) -> Self {
        Self { inner }
    }

    /// The wrapped object.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwraps the adapter.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<B: BasicProtocol> CompleteAdapter<StandardAdapter<B>> {
    /// Lifts a basic implementation straight to the complete interface.
    pub fn from_basic(inner: B) -> Self {
        Self::wrap(StandardAdapter::wrap(inner))
    }
}

#[async_trait]
impl<S: StandardProtocol> BasicProtocol for CompleteAdapter<S> {
    fn capability_tier(&self) -> CapabilityTier {
        self.inner.capability_tier()
    }

    async fn ping(&self) -> Result<(), ProtocolError> {
        self.inner.ping().await
    }

    async fn synchronise_keys(&self, bundle: &[u8]) -> Result<usize, ProtocolError> {
        self.inner.synchronise_keys(bundle).await
    }
}

#[async_trait]
impl<S: StandardProtocol> StandardProtocol for CompleteAdapter<S> {
    async fn status(&self) -> Result<ServiceStatus, ProtocolError> {
        self.inner.status().await
    }

    async fn get_hardware_identifier(&self) -> Result<String, ProtocolError> {
        self.inner.get_hardware_identifier().await
    }

    async fn reset_security_data(&self) -> Result<(), ProtocolError> {
        self.inner.reset_security_data().await
    }

    async fn generate_random_data(&self, length: usize) -> Result<SecureBuffer, ProtocolError> {
        self.inner.generate_random_data(length).await
    }

    async fn encrypt_secure_data(
        &self,
        data: &[u8],
        key_id: Option<&str>,
    ) -> Result<SecureBuffer, ProtocolError> {
        self.inner.encrypt_secure_data(data, key_id).await
    }

    async fn decrypt_secure_data(
        &self,
        data: &[u8],
        key_id: Option<&str>,
    ) -> Result<SecureBuffer, ProtocolError> {
        self.inner.decrypt_secure_data(data, key_id).await
    }

    async fn sign(&self, data: &[u8], key_id: &str) -> Result<Vec<u8>, ProtocolError> {
        self.inner.sign(data, key_id).await
    }

    async fn verify(
        &self,
        data: &[u8],
        signature: &[u8],
        key_id: &str,
    ) -> Result<bool, ProtocolError> {
        self.inner.verify(data, signature, key_id).await
    }

    async fn import_key(
        &self,
        identifier: &str,
        material: SecureBuffer,
    ) -> Result<(), ProtocolError> {
        self.inner.import_key(identifier, material).await
    }

    async fn list_keys(&self) -> Result<Vec<String>, ProtocolError> {
        self.inner.list_keys().await
    }

    async fn get_key_info(&self, identifier: &str) -> Result<KeyInfo, ProtocolError> {
        self.inner.get_key_info(identifier).await
    }

    async fn delete_key(&self, identifier: &str) -> Result<(), ProtocolError> {
        self.inner.delete_key(identifier).await
    }

    async fn export_key(&self, identifier: &str) -> Result<SecureBuffer, ProtocolError> {
        self.inner.export_key(identifier).await
    }
}

#[async_trait]
impl<S: StandardProtocol> CompleteProtocol for CompleteAdapter<S> {
    async fn authenticated_encrypt(
        &self,
        _data: &[u8],
        _associated_data: &[u8],
        _key_id: Option<&str>,
    ) -> Result<SecureBuffer, ProtocolError> {
        Err(ProtocolError::unsupported(Op::AuthenticatedEncrypt))
    }

    async fn authenticated_decrypt(
        &self,
        _data: &[u8],
        _associated_data: &[u8],
        _key_id: Option<&str>,
    ) -> Result<SecureBuffer, ProtocolError> {
        Err(ProtocolError::unsupported(Op::AuthenticatedDecrypt))
    }

    async fn generate_key_pair(
        &self,
        _identifier: Option<&str>,
    ) -> Result<KeyPairInfo, ProtocolError> {
        Err(ProtocolError::unsupported(Op::GenerateKeyPair))
    }

    async fn derive_key(
        &self,
        _key_id: &str,
        _salt: Option<&[u8]>,
        _info: &[u8],
        _length: usize,
    ) -> Result<SecureBuffer, ProtocolError> {
        Err(ProtocolError::unsupported(Op::DeriveKey))
    }

    async fn create_secure_backup(&self, _password: &str) -> Result<Vec<u8>, ProtocolError> {
        Err(ProtocolError::unsupported(Op::CreateSecureBackup))
    }

    async fn restore_secure_backup(
        &self,
        _backup: &[u8],
        _password: &str,
    ) -> Result<usize, ProtocolError> {
        Err(ProtocolError::unsupported(Op::RestoreSecureBackup))
    }
}
