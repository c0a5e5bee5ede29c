//! End-to-end tests for the Umbra security core.
//!
//! These tests drive the dispatcher, the key store and the protocol tiers
//! together, the way a host application would.

// Allow unwrap() in tests - panics are acceptable for test assertions
#![allow(clippy::disallowed_methods)]

use std::sync::Once;

use async_trait::async_trait;
use tracing_subscriber::EnvFilter;
use umbra_protocol::{
    BasicProtocol, CapabilityTier, LegacyError, LegacyService, ProtocolError, StandardProtocol,
};
use umbra_security::{BackupKdfSettings, SecurityService, Settings};

// ============================================================================
// Harness
// ============================================================================

static TRACING: Once = Once::new();

/// Installs a test subscriber honouring `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Settings with a cheap backup KDF and a fixed hardware identifier.
pub fn test_settings() -> Settings {
    Settings {
        hardware_identifier: Some("integration-device".into()),
        backup_kdf: BackupKdfSettings {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        },
        ..Settings::default()
    }
}

/// A software-backed service with test settings.
pub fn service() -> SecurityService {
    init_tracing();
    SecurityService::software(test_settings())
}

// ============================================================================
// Fixtures
// ============================================================================

/// A service that only knows the basic tier.
#[derive(Debug, Default)]
pub struct Beacon;

#[async_trait]
impl BasicProtocol for Beacon {
    fn capability_tier(&self) -> CapabilityTier {
        CapabilityTier::Basic
    }

    async fn ping(&self) -> Result<(), ProtocolError> {
        Ok(())
    }

    async fn synchronise_keys(&self, _bundle: &[u8]) -> Result<usize, ProtocolError> {
        Ok(0)
    }
}

/// An old-style facade over a modern service: failures become `None`/`false`.
pub struct LegacyFacade {
    service: SecurityService,
}

impl LegacyFacade {
    /// Wraps `service`.
    pub fn new(service: SecurityService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl LegacyService for LegacyFacade {
    type Bytes = Vec<u8>;

    async fn ping(&self) -> bool {
        self.service.ping().await.is_ok()
    }

    async fn synchronise_keys(&self, bundle: &[u8]) -> Result<usize, LegacyError> {
        self.service
            .synchronise_keys(bundle)
            .await
            .map_err(|e| LegacyError::General(e.to_string()))
    }

    async fn hardware_identifier(&self) -> Option<String> {
        self.service.get_hardware_identifier().await.ok()
    }

    async fn random_data(&self, length: usize) -> Option<Vec<u8>> {
        let bytes = self.service.generate_random_data(length).await.ok()?;
        Some(bytes.as_bytes().to_vec())
    }

    async fn encrypt(&self, data: &[u8], key_id: Option<&str>) -> Option<Vec<u8>> {
        let bytes = self.service.encrypt_secure_data(data, key_id).await.ok()?;
        Some(bytes.as_bytes().to_vec())
    }

    async fn decrypt(&self, data: &[u8], key_id: Option<&str>) -> Option<Vec<u8>> {
        let bytes = self.service.decrypt_secure_data(data, key_id).await.ok()?;
        Some(bytes.as_bytes().to_vec())
    }

    async fn sign(&self, data: &[u8], key_id: &str) -> Option<Vec<u8>> {
        self.service.sign(data, key_id).await.ok()
    }

    async fn verify(&self, data: &[u8], signature: &[u8], key_id: &str) -> Option<bool> {
        self.service.verify(data, signature, key_id).await.ok()
    }

    async fn list_keys(&self) -> Option<Vec<String>> {
        self.service.list_keys().await.ok()
    }

    async fn delete_key(&self, identifier: &str) -> bool {
        self.service.delete_key(identifier).await.is_ok()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;
    use std::sync::Arc;

    use anyhow::{bail, Result};
    use umbra_crypto::{OperationConfig, SecureBuffer};
    use umbra_error::{CanonicalError, ErrorKind};
    use umbra_protocol::{CompleteAdapter, CompleteProtocol, LegacyBridge, StandardAdapter};
    use umbra_security::{
        ConfigResolver, ErrorTranslator, KeyBundle, OperationInput, Payload, SecurityOperation,
        TargetLayer,
    };

    fn config() -> OperationConfig {
        OperationConfig::default()
    }

    #[tokio::test]
    async fn test_absent_identifier_is_not_found() {
        let svc = service();
        let d = svc.dispatcher();
        let ghost = OperationInput::new().with_key_id("ghost");

        for op in [SecurityOperation::KeyRetrieval, SecurityOperation::KeyDeletion] {
            let result = d.execute(&op, &config(), Some(&ghost)).await;
            assert_eq!(result.error_kind(), Some(ErrorKind::KeyNotFound), "{op}");
            assert!(!result.error_message().unwrap_or_default().is_empty());
        }
    }

    #[tokio::test]
    async fn test_stored_material_is_retrieved_exactly() -> Result<()> {
        let svc = service();
        let d = svc.dispatcher();

        for (id, len) in [("k16", 16usize), ("k32", 32), ("k7", 7)] {
            let material: Vec<u8> = (0..len as u8).map(|b| b.wrapping_mul(31)).collect();
            let store = OperationInput::data(material.clone()).with_key_id(id);
            d.execute(&SecurityOperation::KeyStorage, &config(), Some(&store))
                .await
                .into_result()?;

            let by_id = OperationInput::new().with_key_id(id);
            let retrieved = d
                .execute(&SecurityOperation::KeyRetrieval, &config(), Some(&by_id))
                .await
                .into_result()?;
            assert_eq!(retrieved, Payload::Bytes(SecureBuffer::new(material)));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_rotate_with_reencrypt() -> Result<()> {
        let svc = service();
        let d = svc.dispatcher();
        let k1 = SecureBuffer::new(vec![0x11; 32]);
        svc.import_key("rotating", k1.clone()).await?;

        let encrypt = OperationInput::data(b"plaintext".as_slice()).with_key_id("rotating");
        let Payload::Bytes(c1) = d
            .execute(&SecurityOperation::SymmetricEncryption, &config(), Some(&encrypt))
            .await
            .into_result()?
        else {
            bail!("encryption did not return bytes");
        };

        let rotate = OperationInput::data(c1).with_key_id("rotating");
        let Payload::Rotated {
            material: k2,
            reencrypted: Some(c2),
        } = d
            .execute(&SecurityOperation::KeyRotation, &config(), Some(&rotate))
            .await
            .into_result()?
        else {
            bail!("rotation did not return re-encrypted data");
        };

        assert_ne!(k2, k1);
        assert_eq!(svc.export_key("rotating").await?, k2);

        let decrypt = OperationInput::data(c2.clone()).with_key_material(k2);
        let plaintext = d
            .execute(&SecurityOperation::SymmetricDecryption, &config(), Some(&decrypt))
            .await
            .into_result()?;
        assert_eq!(plaintext, Payload::Bytes(SecureBuffer::from(b"plaintext".as_slice())));

        let stale = OperationInput::data(c2).with_key_material(k1);
        let result = d
            .execute(&SecurityOperation::SymmetricDecryption, &config(), Some(&stale))
            .await;
        assert_eq!(result.error_kind(), Some(ErrorKind::DecryptionFailed));

        assert_eq!(svc.get_key_info("rotating").await?.version, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_hash_is_idempotent() -> Result<()> {
        let svc = service();
        let input = OperationInput::data(b"the same bytes".as_slice());
        let sha512 = config().with_algorithm("SHA-512");

        let first = svc
            .dispatcher()
            .execute(&SecurityOperation::Hashing, &sha512, Some(&input))
            .await
            .into_result()?;
        let second = svc
            .dispatcher()
            .execute(&SecurityOperation::Hashing, &sha512, Some(&input))
            .await
            .into_result()?;

        assert_eq!(first, second);
        let Payload::Bytes(digest) = first else {
            bail!("hashing did not return bytes");
        };
        assert_eq!(digest.len(), 64);
        Ok(())
    }

    #[tokio::test]
    async fn test_verification_is_never_an_error() -> Result<()> {
        let svc = service();
        svc.import_key("mac", SecureBuffer::new(vec![9; 32])).await?;
        svc.generate_key_pair(Some("ed")).await?;

        for key in ["mac", "ed"] {
            let signature = svc.sign(b"message", key).await?;
            assert!(svc.verify(b"message", &signature, key).await?, "{key}");
            assert!(!svc.verify(b"massage", &signature, key).await?, "{key}");
            assert!(!svc.verify(b"message", &[0u8; 3], key).await?, "{key}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_basic_behind_standard_adapter() -> Result<()> {
        let adapted = StandardAdapter::wrap(Beacon);
        assert_eq!(adapted.capability_tier(), CapabilityTier::Basic);
        adapted.ping().await?;

        let err = adapted.get_hardware_identifier().await.unwrap_err();
        assert!(matches!(err, ProtocolError::UnsupportedOperation(ref op) if op == "getHardwareIdentifier"));
        assert!(!err.is_retryable());

        let complete = CompleteAdapter::from_basic(Beacon);
        let err = complete.create_secure_backup("pw").await.unwrap_err();
        assert!(matches!(err, ProtocolError::UnsupportedOperation(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_legacy_bridge_over_modern_service() -> Result<()> {
        let bridge = LegacyBridge::new(LegacyFacade::new(service()));
        assert_eq!(bridge.capability_tier(), CapabilityTier::Standard);
        bridge.ping().await?;
        assert_eq!(bridge.get_hardware_identifier().await?, "integration-device");

        let ciphertext = bridge.encrypt_secure_data(b"legacy", None).await?;
        let plaintext = bridge.decrypt_secure_data(ciphertext.as_bytes(), None).await?;
        assert_eq!(plaintext.as_bytes(), b"legacy");

        let err = bridge
            .decrypt_secure_data(b"not a ciphertext", Some("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::DecryptionFailed(ref d) if d.contains("decryptSecureData")));

        let err = bridge.reset_security_data().await.unwrap_err();
        assert!(matches!(err, ProtocolError::FeatureUnavailable(_)));
        assert!(!err.is_retryable());

        let complete = CompleteAdapter::wrap(bridge);
        assert_eq!(complete.capability_tier(), CapabilityTier::Standard);
        let err = complete.derive_key("k", None, b"info", 32).await.unwrap_err();
        assert!(matches!(err, ProtocolError::UnsupportedOperation(_)));
        Ok(())
    }

    #[test]
    fn test_error_round_trip_preserves_detail() {
        let details = ["D", "key 'payments' vanished", "invalid_key_type: expected=a;received=b"];
        for kind in ErrorKind::ALL {
            for detail in details {
                for retryable in [true, false] {
                    let canonical = CanonicalError::new(kind, detail).with_retryable(retryable);
                    for layer in TargetLayer::ALL {
                        let native = ErrorTranslator::from_canonical(&canonical, layer);
                        let back = ErrorTranslator::to_canonical(&native);
                        assert_eq!(back.detail(), detail, "{kind} via {layer:?}");
                        assert_eq!(back, canonical, "{kind} via {layer:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_config_defaulting() {
        let resolver = ConfigResolver::default();

        let config = resolver.resolve(None);
        assert_eq!(config.algorithm(), "AES-GCM");
        assert_eq!(config.key_size_bits(), 256);
        assert!(config.options().is_empty());

        let partial = BTreeMap::from([("algorithm".to_string(), "ChaCha20".to_string())]);
        let config = resolver.resolve(Some(&partial));
        assert_eq!(config.algorithm(), "ChaCha20");
        assert_eq!(config.key_size_bits(), 256);
    }

    #[tokio::test]
    async fn test_symmetric_key_end_to_end() -> Result<()> {
        let svc = service();
        let d = svc.dispatcher();

        let Payload::Identifier(id) = d
            .execute(&SecurityOperation::KeyGeneration, &config(), None)
            .await
            .into_result()?
        else {
            bail!("key generation did not return an identifier");
        };
        assert_eq!(svc.get_key_info(&id).await?.key_size_bits, 256);

        let by_id = OperationInput::new().with_key_id(id.as_str());
        let encrypt = by_id.clone().with_data(b"hello".as_slice());
        let Payload::Bytes(ciphertext) = d
            .execute(&SecurityOperation::SymmetricEncryption, &config(), Some(&encrypt))
            .await
            .into_result()?
        else {
            bail!("encryption did not return bytes");
        };

        let decrypt = by_id.clone().with_data(ciphertext);
        let plaintext = d
            .execute(&SecurityOperation::SymmetricDecryption, &config(), Some(&decrypt))
            .await
            .into_result()?;
        assert_eq!(plaintext, Payload::Bytes(SecureBuffer::from(b"hello".as_slice())));

        d.execute(&SecurityOperation::KeyDeletion, &config(), Some(&by_id))
            .await
            .into_result()?;
        let result = d
            .execute(&SecurityOperation::KeyRetrieval, &config(), Some(&by_id))
            .await;
        assert_eq!(result.error_kind(), Some(ErrorKind::KeyNotFound));
        assert_eq!(result.error_code(), Some(ErrorKind::KeyNotFound.code()));
        Ok(())
    }

    #[tokio::test]
    async fn test_backup_restore_and_sync() -> Result<()> {
        let source = service();
        source.import_key("db", SecureBuffer::new(vec![4; 32])).await?;
        let pair = source.generate_key_pair(Some("release-signer")).await?;
        let ciphertext = source.encrypt_secure_data(b"row", Some("db")).await?;
        let backup = source.create_secure_backup("long passphrase").await?;

        let target = service();
        let err = target
            .restore_secure_backup(&backup, "short")
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::AuthenticationFailed(_)));

        assert_eq!(target.restore_secure_backup(&backup, "long passphrase").await?, 2);
        let plaintext = target.decrypt_secure_data(ciphertext.as_bytes(), Some("db")).await?;
        assert_eq!(plaintext.as_bytes(), b"row");
        assert_eq!(
            target.get_key_info("release-signer").await?.public_key,
            Some(pair.public_key)
        );

        let bundle = KeyBundle::from_entries(&target.keystore().snapshot().await).to_json()?;
        let third = service();
        assert_eq!(third.synchronise_keys(&bundle).await?, 2);
        assert_eq!(third.status().await?.key_count, 2);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_service_key() -> Result<()> {
        let svc = Arc::new(service());

        let mut handles = Vec::new();
        for i in 0..16u8 {
            let svc = Arc::clone(&svc);
            handles.push(tokio::spawn(async move {
                let ciphertext = svc.encrypt_secure_data(&[i; 8], None).await?;
                svc.decrypt_secure_data(ciphertext.as_bytes(), None).await
            }));
        }
        for (i, handle) in handles.into_iter().enumerate() {
            let plaintext = handle.await??;
            assert_eq!(plaintext.as_bytes(), [i as u8; 8]);
        }

        assert_eq!(svc.list_keys().await?.len(), 1);
        Ok(())
    }
}
