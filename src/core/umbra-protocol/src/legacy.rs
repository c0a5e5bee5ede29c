//! Bridge from legacy services to the modern protocol.
//!
//! Legacy services report failure with `None` or `false`. The bridge turns
//! each of those into an error naming the operation that failed, and gives
//! every modern operation a defined outcome even when the legacy service has
//! no equivalent.

use async_trait::async_trait;
use tracing::warn;
use umbra_crypto::SecureBuffer;
use umbra_error::{CanonicalError, ErrorKind};
use umbra_keystore::KeyInfo;

use crate::capability::{CapabilityTier, ProtocolOperation as Op};
use crate::error::{LegacyError, ProtocolError};
use crate::repr::ByteRepr;
use crate::traits::{BasicProtocol, StandardProtocol};
use crate::types::ServiceStatus;

/// The surface of an older security service.
#[async_trait]
pub trait LegacyService: Send + Sync {
    /// Byte container the service returns.
    type Bytes: ByteRepr;

    /// `true` if the service answered.
    async fn ping(&self) -> bool;

    /// Imports a key bundle. Returns how many keys were new.
    async fn synchronise_keys(&self, bundle: &[u8]) -> Result<usize, LegacyError>;

    /// Device identifier, if the service knows one.
    async fn hardware_identifier(&self) -> Option<String>;

    /// Random bytes.
    async fn random_data(&self, length: usize) -> Option<Self::Bytes>;

    /// Encrypts with the named key, or the default key.
    async fn encrypt(&self, data: &[u8], key_id: Option<&str>) -> Option<Self::Bytes>;

    /// Decrypts with the named key, or the default key.
    async fn decrypt(&self, data: &[u8], key_id: Option<&str>) -> Option<Self::Bytes>;

    /// Signs with the named key.
    async fn sign(&self, data: &[u8], key_id: &str) -> Option<Self::Bytes>;

    /// `Some(valid)` when the check ran, `None` when it could not.
    async fn verify(&self, data: &[u8], signature: &[u8], key_id: &str) -> Option<bool>;

    /// Known key identifiers.
    async fn list_keys(&self) -> Option<Vec<String>>;

    /// `true` if the key was deleted.
    async fn delete_key(&self, identifier: &str) -> bool;
}

/// Exposes a [`LegacyService`] as a [`StandardProtocol`].
#[derive(Debug, Clone)]
pub struct LegacyBridge<L> {
    legacy: L,
}

impl<L: LegacyService> LegacyBridge<L> {
    /// Wraps a legacy service.
    pub fn new(legacy: L) -> Self {
        Self { legacy }
    }

    /// The wrapped service.
    pub fn inner(&self) -> &L {
        &self.legacy
    }

    fn no_result(operation: Op) -> ProtocolError {
        let kind = match operation {
            Op::Ping | Op::Status => ErrorKind::ServiceUnavailable,
            Op::EncryptSecureData => ErrorKind::EncryptionFailed,
            Op::DecryptSecureData => ErrorKind::DecryptionFailed,
            Op::Sign => ErrorKind::SignatureFailed,
            Op::Verify => ErrorKind::VerificationFailed,
            _ => ErrorKind::InternalError,
        };
        warn!(operation = %operation, "Legacy service returned no result");
        CanonicalError::new(kind, format!("legacy {} returned no result", operation)).into()
    }

    fn no_equivalent(operation: Op) -> ProtocolError {
        ProtocolError::FeatureUnavailable(format!(
            "{} has no legacy equivalent",
            operation
        ))
    }

    fn require<T>(value: Option<T>, operation: Op) -> Result<T, ProtocolError> {
        value.ok_or_else(|| Self::no_result(operation))
    }
}

#[async_trait]
impl<L: LegacyService> BasicProtocol for LegacyBridge<L> {
    fn capability_tier(&self) -> CapabilityTier {
        CapabilityTier::Standard
    }

    async fn ping(&self) -> Result<(), ProtocolError> {
        if self.legacy.ping().await {
            Ok(())
        } else {
            Err(Self::no_result(Op::Ping))
        }
    }

    async fn synchronise_keys(&self, bundle: &[u8]) -> Result<usize, ProtocolError> {
        self.legacy
            .synchronise_keys(bundle)
            .await
            .map_err(ProtocolError::from)
    }
}

#[async_trait]
impl<L: LegacyService> StandardProtocol for LegacyBridge<L> {
    async fn status(&self) -> Result<ServiceStatus, ProtocolError> {
        if !self.legacy.ping().await {
            return Err(Self::no_result(Op::Status));
        }
        let keys = Self::require(self.legacy.list_keys().await, Op::Status)?;
        Ok(ServiceStatus::new(self.capability_tier(), keys.len(), "legacy"))
    }

    async fn get_hardware_identifier(&self) -> Result<String, ProtocolError> {
        Self::require(
            self.legacy.hardware_identifier().await,
            Op::GetHardwareIdentifier,
        )
    }

    async fn reset_security_data(&self) -> Result<(), ProtocolError> {
        Err(Self::no_equivalent(Op::ResetSecurityData))
    }

    async fn generate_random_data(&self, length: usize) -> Result<SecureBuffer, ProtocolError> {
        let bytes = Self::require(
            self.legacy.random_data(length).await,
            Op::GenerateRandomData,
        )?;
        Ok(bytes.into_secure())
    }

    async fn encrypt_secure_data(
        &self,
        data: &[u8],
        key_id: Option<&str>,
    ) -> Result<SecureBuffer, ProtocolError> {
        let bytes = Self::require(
            self.legacy.encrypt(data, key_id).await,
            Op::EncryptSecureData,
        )?;
        Ok(bytes.into_secure())
    }

    async fn decrypt_secure_data(
        &self,
        data: &[u8],
        key_id: Option<&str>,
    ) -> Result<SecureBuffer, ProtocolError> {
        let bytes = Self::require(
            self.legacy.decrypt(data, key_id).await,
            Op::DecryptSecureData,
        )?;
        Ok(bytes.into_secure())
    }

    async fn sign(&self, data: &[u8], key_id: &str) -> Result<Vec<u8>, ProtocolError> {
        let bytes = Self::require(self.legacy.sign(data, key_id).await, Op::Sign)?;
        Ok(bytes.into_secure().as_bytes().to_vec())
    }

    async fn verify(
        &self,
        data: &[u8],
        signature: &[u8],
        key_id: &str,
    ) -> Result<bool, ProtocolError> {
        Self::require(self.legacy.verify(data, signature, key_id).await, Op::Verify)
    }

    async fn import_key(
        &self,
        _identifier: &str,
        _material: SecureBuffer,
    ) -> Result<(), ProtocolError> {
        Err(Self::no_equivalent(Op::ImportKey))
    }

    async fn list_keys(&self) -> Result<Vec<String>, ProtocolError> {
        Self::require(self.legacy.list_keys().await, Op::ListKeys)
    }

    async fn get_key_info(&self, _identifier: &str) -> Result<KeyInfo, ProtocolError> {
        Err(Self::no_equivalent(Op::GetKeyInfo))
    }

    async fn delete_key(&self, identifier: &str) -> Result<(), ProtocolError> {
        if self.legacy.delete_key(identifier).await {
            Ok(())
        } else {
            Err(Self::no_result(Op::DeleteKey))
        }
    }

    async fn export_key(&self, _identifier: &str) -> Result<SecureBuffer, ProtocolError> {
        Err(Self::no_equivalent(Op::ExportKey))
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::adapter::CompleteAdapter;
    use crate::traits::CompleteProtocol;
    use umbra_error::Canonical;

    /// Answers everything, echoing input bytes back.
    struct Echo;

    #[async_trait]
    impl LegacyService for Echo {
        type Bytes = Vec<u8>;

        async fn ping(&self) -> bool {
            true
        }

        async fn synchronise_keys(&self, bundle: &[u8]) -> Result<usize, LegacyError> {
            if bundle.is_empty() {
                Err(LegacyError::InvalidData)
            } else {
                Ok(2)
            }
        }

        async fn hardware_identifier(&self) -> Option<String> {
            Some("legacy-device-01".into())
        }

        async fn random_data(&self, length: usize) -> Option<Vec<u8>> {
            Some(vec![0xAB; length])
        }

        async fn encrypt(&self, data: &[u8], _key_id: Option<&str>) -> Option<Vec<u8>> {
            Some(data.iter().map(|b| b ^ 0xFF).collect())
        }

        async fn decrypt(&self, data: &[u8], _key_id: Option<&str>) -> Option<Vec<u8>> {
            Some(data.iter().map(|b| b ^ 0xFF).collect())
        }

        async fn sign(&self, data: &[u8], _key_id: &str) -> Option<Vec<u8>> {
            Some(data.to_vec())
        }

        async fn verify(&self, data: &[u8], signature: &[u8], _key_id: &str) -> Option<bool> {
            Some(data == signature)
        }

        async fn list_keys(&self) -> Option<Vec<String>> {
            Some(vec!["a".into(), "b".into()])
        }

        async fn delete_key(&self, identifier: &str) -> bool {
            identifier == "a"
        }
    }

    /// Fails everything.
    struct Broken;

    #[async_trait]
    impl LegacyService for Broken {
        type Bytes = Box<[u8]>;

        async fn ping(&self) -> bool {
            false
        }

        async fn synchronise_keys(&self, _bundle: &[u8]) -> Result<usize, LegacyError> {
            Err(LegacyError::SessionExpired)
        }

        async fn hardware_identifier(&self) -> Option<String> {
            None
        }

        async fn random_data(&self, _length: usize) -> Option<Box<[u8]>> {
            None
        }

        async fn encrypt(&self, _data: &[u8], _key_id: Option<&str>) -> Option<Box<[u8]>> {
            None
        }

        async fn decrypt(&self, _data: &[u8], _key_id: Option<&str>) -> Option<Box<[u8]>> {
            None
        }

        async fn sign(&self, _data: &[u8], _key_id: &str) -> Option<Box<[u8]>> {
            None
        }

        async fn verify(&self, _data: &[u8], _signature: &[u8], _key_id: &str) -> Option<bool> {
            None
        }

        async fn list_keys(&self) -> Option<Vec<String>> {
            None
        }

        async fn delete_key(&self, _identifier: &str) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn test_successful_optionals_become_ok() {
        let bridge = LegacyBridge::new(Echo);
        bridge.ping().await.unwrap();
        assert_eq!(
            bridge.get_hardware_identifier().await.unwrap(),
            "legacy-device-01"
        );
        assert_eq!(bridge.generate_random_data(4).await.unwrap().len(), 4);

        let ciphertext = bridge.encrypt_secure_data(b"abc", None).await.unwrap();
        let plaintext = bridge
            .decrypt_secure_data(ciphertext.as_bytes(), None)
            .await
            .unwrap();
        assert_eq!(plaintext.as_bytes(), b"abc");

        let status = bridge.status().await.unwrap();
        assert_eq!(status.key_count, 2);
        assert_eq!(status.protocol_version, "2.0");
    }

    #[tokio::test]
    async fn test_verify_false_is_success() {
        let bridge = LegacyBridge::new(Echo);
        let signature = bridge.sign(b"msg", "k").await.unwrap();
        assert!(bridge.verify(b"msg", &signature, "k").await.unwrap());
        assert!(!bridge.verify(b"other", &signature, "k").await.unwrap());
    }

    #[tokio::test]
    async fn test_none_becomes_error_naming_operation() {
        let bridge = LegacyBridge::new(Broken);

        let err = bridge.encrypt_secure_data(b"x", None).await.unwrap_err();
        assert!(matches!(err, ProtocolError::EncryptionFailed(ref d) if d.contains("encryptSecureData")));

        let err = bridge.verify(b"x", b"y", "k").await.unwrap_err();
        assert!(matches!(err, ProtocolError::VerificationFailed(ref d) if d.contains("verify")));

        let err = bridge.get_hardware_identifier().await.unwrap_err();
        assert!(matches!(err, ProtocolError::InternalError(ref d) if d.contains("getHardwareIdentifier")));

        let err = bridge.ping().await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_false_delete_is_error() {
        let bridge = LegacyBridge::new(Echo);
        bridge.delete_key("a").await.unwrap();
        let err = bridge.delete_key("b").await.unwrap_err();
        assert!(err.to_canonical().detail().contains("deleteKey"));
    }

    #[tokio::test]
    async fn test_reset_is_permanent_service_unavailable() {
        let bridge = LegacyBridge::new(Echo);
        let err = bridge.reset_security_data().await.unwrap_err();
        let canonical = err.to_canonical();
        assert_eq!(canonical.kind(), ErrorKind::ServiceUnavailable);
        assert!(!canonical.is_retryable());
    }

    #[tokio::test]
    async fn test_legacy_errors_are_translated() {
        let bridge = LegacyBridge::new(Broken);
        let err = bridge.synchronise_keys(b"{}").await.unwrap_err();
        assert_eq!(err, ProtocolError::AuthenticationFailed("session expired".into()));

        let err = LegacyBridge::new(Echo).synchronise_keys(b"").await.unwrap_err();
        assert_eq!(err, ProtocolError::InvalidFormat("invalid data".into()));
    }

    #[tokio::test]
    async fn test_bridge_lifts_to_complete() {
        let lifted = CompleteAdapter::wrap(LegacyBridge::new(Echo));
        assert_eq!(lifted.capability_tier(), CapabilityTier::Standard);
        assert_eq!(lifted.list_keys().await.unwrap().len(), 2);
        assert!(matches!(
            lifted.derive_key("a", None, b"ctx", 32).await,
            Err(ProtocolError::UnsupportedOperation(_))
        ));
    }
}
