//! # Security Service
//!
//! The complete-tier implementation of the protocol traits, built on the
//! [`OperationDispatcher`] and a [`KeyStore`].
//!
//! ## Service key
//!
//! `encrypt_secure_data` and friends accept `None` as key identifier and
//! then use the service key: a 256-bit symmetric key generated on first use.
//! After `reset_security_data` (or deleting it) a new one is generated.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use tokio::sync::Mutex;
use tracing::{info, warn};
use umbra_crypto::config::options;
use umbra_crypto::software::ED25519;
use umbra_crypto::{random, CryptoEngine, OperationConfig, SecureBuffer, SoftwareEngine};
use umbra_error::CanonicalError;
use umbra_keystore::{KeyInfo, KeyKind, KeyStore, KeyStoreError};
use umbra_protocol::{
    BasicProtocol, CapabilityTier, CompleteProtocol, KeyPairInfo, ProtocolError,
    ProtocolOperation, ServiceStatus, StandardProtocol,
};

use crate::bundle::{self, KeyBundle};
use crate::dispatcher::OperationDispatcher;
use crate::input::OperationInput;
use crate::operation::SecurityOperation;
use crate::resolver::ConfigResolver;
use crate::result::{OperationResult, Payload};
use crate::settings::Settings;

/// Metadata label marking the service key.
pub const PURPOSE_LABEL: &str = "purpose";

/// Value of [`PURPOSE_LABEL`] on the service key.
pub const SERVICE_KEY_PURPOSE: &str = "service";

/// Length in bytes of a generated hardware identifier.
const HARDWARE_ID_BYTES: usize = 16;

/// Complete security service.
pub struct SecurityService {
    dispatcher: OperationDispatcher,
    keystore: Arc<KeyStore>,
    resolver: ConfigResolver,
    settings: Settings,
    hardware_identifier: String,
    service_key: Mutex<Option<String>>,
}

impl SecurityService {
    /// Creates a service over `engine` with an empty key store.
    pub fn new(engine: Arc<dyn CryptoEngine>, settings: Settings) -> Self {
        let keystore = Arc::new(KeyStore::new(engine));
        Self::with_keystore(keystore, settings)
    }

    /// Creates a service over the built-in [`SoftwareEngine`].
    pub fn software(settings: Settings) -> Self {
        Self::new(Arc::new(SoftwareEngine::new()), settings)
    }

    /// Creates a service over an existing key store.
    pub fn with_keystore(keystore: Arc<KeyStore>, settings: Settings) -> Self {
        let dispatcher = OperationDispatcher::new(Arc::clone(&keystore), &settings);
        let resolver = ConfigResolver::from_settings(&settings);
        let hardware_identifier = settings
            .hardware_identifier
            .clone()
            .unwrap_or_else(|| random::generate_token(HARDWARE_ID_BYTES));

        info!(
            engine = keystore.engine().name(),
            strict_config = settings.strict_config,
            "Security service created"
        );

        Self {
            dispatcher,
            keystore,
            resolver,
            settings,
            hardware_identifier,
            service_key: Mutex::new(None),
        }
    }

    /// The dispatcher.
    pub fn dispatcher(&self) -> &OperationDispatcher {
        &self.dispatcher
    }

    /// The key store.
    pub fn keystore(&self) -> &Arc<KeyStore> {
        &self.keystore
    }

    /// The configuration resolver.
    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// The settings the service was built with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Resolves `config` and dispatches `operation`.
    ///
    /// In strict mode a malformed configuration fails the operation with
    /// `InvalidInput` before anything runs.
    pub async fn execute(
        &self,
        operation: &SecurityOperation,
        config: Option<&BTreeMap<String, String>>,
        input: Option<&OperationInput>,
    ) -> OperationResult {
        match self.resolver.resolve_configured(config) {
            Ok(config) => self.dispatcher.execute(operation, &config, input).await,
            Err(error) => OperationResult::Failure(error),
        }
    }

    // ========================================================================
    // Internal
    // ========================================================================

    fn default_config(&self) -> OperationConfig {
        self.resolver.resolve(None)
    }

    async fn dispatch(
        &self,
        operation: SecurityOperation,
        config: &OperationConfig,
        input: &OperationInput,
    ) -> Result<Payload, ProtocolError> {
        self.dispatcher
            .execute(&operation, config, Some(input))
            .await
            .into_result()
            .map_err(ProtocolError::from)
    }

    fn expect_bytes(
        operation: ProtocolOperation,
        payload: Payload,
    ) -> Result<SecureBuffer, ProtocolError> {
        match payload {
            Payload::Bytes(bytes) => Ok(bytes),
            other => Err(Self::unexpected(operation, &other)),
        }
    }

    fn unexpected(operation: ProtocolOperation, payload: &Payload) -> ProtocolError {
        let kind = match payload {
            Payload::Empty => "empty",
            Payload::Bytes(_) => "bytes",
            Payload::Verified(_) => "verification",
            Payload::Identifier(_) => "identifier",
            Payload::Rotated { .. } => "rotation",
        };
        ProtocolError::InternalError(format!("{operation} produced an unexpected {kind} payload"))
    }

    /// Identifier of the service key, generating one if needed.
    async fn service_key_id(&self) -> Result<String, ProtocolError> {
        let mut current = self.service_key.lock().await;
        if let Some(id) = current.as_deref() {
            match self.keystore.get_info(id).await {
                Ok(_) => return Ok(id.to_string()),
                Err(KeyStoreError::KeyNotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        let metadata = BTreeMap::from([(
            PURPOSE_LABEL.to_string(),
            SERVICE_KEY_PURPOSE.to_string(),
        )]);
        let id = self
            .keystore
            .generate(KeyKind::Symmetric, &self.default_config(), None, metadata)
            .await?;
        info!(identifier = %id, "Service key generated");

        *current = Some(id.clone());
        Ok(id)
    }

    async fn key_or_service_key(&self, key_id: Option<&str>) -> Result<String, ProtocolError> {
        match key_id {
            Some(id) => Ok(id.to_string()),
            None => self.service_key_id().await,
        }
    }

    async fn symmetric(
        &self,
        operation: ProtocolOperation,
        data: &[u8],
        key_id: Option<&str>,
        config: &OperationConfig,
    ) -> Result<SecureBuffer, ProtocolError> {
        let dispatch = match operation {
            ProtocolOperation::EncryptSecureData | ProtocolOperation::AuthenticatedEncrypt => {
                SecurityOperation::SymmetricEncryption
            }
            _ => SecurityOperation::SymmetricDecryption,
        };
        let id = self.key_or_service_key(key_id).await?;
        let input = OperationInput::data(data).with_key_id(id);
        let payload = self.dispatch(dispatch, config, &input).await?;
        Self::expect_bytes(operation, payload)
    }

    async fn blocking<T, F>(operation: ProtocolOperation, task: F) -> Result<T, ProtocolError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, CanonicalError> + Send + 'static,
    {
        tokio::task::spawn_blocking(task)
            .await
            .map_err(|e| ProtocolError::InternalError(format!("{operation} task failed: {e}")))?
            .map_err(ProtocolError::from)
    }
}

impl std::fmt::Debug for SecurityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityService")
            .field("dispatcher", &self.dispatcher)
            .field("hardware_identifier", &self.hardware_identifier)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Basic
// ============================================================================

#[async_trait]
impl BasicProtocol for SecurityService {
    fn capability_tier(&self) -> CapabilityTier {
        CapabilityTier::Complete
    }

    async fn ping(&self) -> Result<(), ProtocolError> {
        Ok(())
    }

    async fn synchronise_keys(&self, bundle: &[u8]) -> Result<usize, ProtocolError> {
        let entries = KeyBundle::from_json(bundle)?.to_entries()?;
        let offered = entries.len();

        let mut imported = 0;
        for entry in entries {
            if self.keystore.import_if_absent(entry).await? {
                imported += 1;
            }
        }

        info!(offered, imported, "Keys synchronised");
        Ok(imported)
    }
}

// ============================================================================
// Standard
// ============================================================================

#[async_trait]
impl StandardProtocol for SecurityService {
    async fn status(&self) -> Result<ServiceStatus, ProtocolError> {
        Ok(ServiceStatus::new(
            self.capability_tier(),
            self.keystore.len().await,
            self.keystore.engine().name(),
        ))
    }

    async fn get_hardware_identifier(&self) -> Result<String, ProtocolError> {
        Ok(self.hardware_identifier.clone())
    }

    async fn reset_security_data(&self) -> Result<(), ProtocolError> {
        let mut service_key = self.service_key.lock().await;
        let purged = self.keystore.purge().await;
        *service_key = None;
        warn!(count = purged, "Security data reset");
        Ok(())
    }

    async fn generate_random_data(&self, length: usize) -> Result<SecureBuffer, ProtocolError> {
        let bits = length
            .checked_mul(8)
            .and_then(|bits| u32::try_from(bits).ok())
            .ok_or_else(|| ProtocolError::InvalidFormat(format!("length {length} is too large")))?;
        let config = self.default_config().with_key_size_bits(bits);
        let payload = self
            .dispatch(SecurityOperation::RandomGeneration, &config, &OperationInput::new())
            .await?;
        Self::expect_bytes(ProtocolOperation::GenerateRandomData, payload)
    }

    async fn encrypt_secure_data(
        &self,
        data: &[u8],
        key_id: Option<&str>,
    ) -> Result<SecureBuffer, ProtocolError> {
        let config = self.default_config();
        self.symmetric(ProtocolOperation::EncryptSecureData, data, key_id, &config)
            .await
    }

    async fn decrypt_secure_data(
        &self,
        data: &[u8],
        key_id: Option<&str>,
    ) -> Result<SecureBuffer, ProtocolError> {
        let config = self.default_config();
        self.symmetric(ProtocolOperation::DecryptSecureData, data, key_id, &config)
            .await
    }

    async fn sign(&self, data: &[u8], key_id: &str) -> Result<Vec<u8>, ProtocolError> {
        let input = OperationInput::data(data).with_key_id(key_id);
        let payload = self
            .dispatch(SecurityOperation::SignatureGeneration, &self.default_config(), &input)
            .await?;
        Self::expect_bytes(ProtocolOperation::Sign, payload).map(|sig| sig.as_bytes().to_vec())
    }

    async fn verify(
        &self,
        data: &[u8],
        signature: &[u8],
        key_id: &str,
    ) -> Result<bool, ProtocolError> {
        let input = OperationInput::data(data)
            .with_key_id(key_id)
            .with_signature(signature);
        match self
            .dispatch(SecurityOperation::SignatureVerification, &self.default_config(), &input)
            .await?
        {
            Payload::Verified(verified) => Ok(verified),
            other => Err(Self::unexpected(ProtocolOperation::Verify, &other)),
        }
    }

    async fn import_key(
        &self,
        identifier: &str,
        material: SecureBuffer,
    ) -> Result<(), ProtocolError> {
        let input = OperationInput::data(material).with_key_id(identifier);
        self.dispatch(SecurityOperation::KeyStorage, &self.default_config(), &input)
            .await
            .map(|_| ())
    }

    async fn list_keys(&self) -> Result<Vec<String>, ProtocolError> {
        Ok(self.keystore.list_identifiers().await)
    }

    async fn get_key_info(&self, identifier: &str) -> Result<KeyInfo, ProtocolError> {
        Ok(self.keystore.get_info(identifier).await?)
    }

    async fn delete_key(&self, identifier: &str) -> Result<(), ProtocolError> {
        let input = OperationInput::new().with_key_id(identifier);
        self.dispatch(SecurityOperation::KeyDeletion, &self.default_config(), &input)
            .await
            .map(|_| ())
    }

    async fn export_key(&self, identifier: &str) -> Result<SecureBuffer, ProtocolError> {
        let input = OperationInput::new().with_key_id(identifier);
        let payload = self
            .dispatch(SecurityOperation::KeyRetrieval, &self.default_config(), &input)
            .await?;
        Self::expect_bytes(ProtocolOperation::ExportKey, payload)
    }
}

// ============================================================================
// Complete
// ============================================================================

#[async_trait]
impl CompleteProtocol for SecurityService {
    async fn authenticated_encrypt(
        &self,
        data: &[u8],
        associated_data: &[u8],
        key_id: Option<&str>,
    ) -> Result<SecureBuffer, ProtocolError> {
        let config = self
            .default_config()
            .with_option(options::ASSOCIATED_DATA, BASE64.encode(associated_data));
        self.symmetric(ProtocolOperation::AuthenticatedEncrypt, data, key_id, &config)
            .await
    }

    async fn authenticated_decrypt(
        &self,
        data: &[u8],
        associated_data: &[u8],
        key_id: Option<&str>,
    ) -> Result<SecureBuffer, ProtocolError> {
        let config = self
            .default_config()
            .with_option(options::ASSOCIATED_DATA, BASE64.encode(associated_data));
        self.symmetric(ProtocolOperation::AuthenticatedDecrypt, data, key_id, &config)
            .await
    }

    async fn generate_key_pair(
        &self,
        identifier: Option<&str>,
    ) -> Result<KeyPairInfo, ProtocolError> {
        let config = self.default_config().with_algorithm(ED25519);
        let input = match identifier {
            Some(id) => OperationInput::new().with_key_id(id),
            None => OperationInput::new(),
        };
        let identifier = match self
            .dispatch(SecurityOperation::KeyGeneration, &config, &input)
            .await?
        {
            Payload::Identifier(id) => id,
            other => return Err(Self::unexpected(ProtocolOperation::GenerateKeyPair, &other)),
        };

        let public_key = self.keystore.public_key(&identifier).await?;
        Ok(KeyPairInfo {
            identifier,
            public_key,
            algorithm: ED25519.to_string(),
        })
    }

    async fn derive_key(
        &self,
        key_id: &str,
        salt: Option<&[u8]>,
        info: &[u8],
        length: usize,
    ) -> Result<SecureBuffer, ProtocolError> {
        Ok(self
            .dispatcher
            .derive_key(key_id, salt, info, length)
            .await?)
    }

    async fn create_secure_backup(&self, password: &str) -> Result<Vec<u8>, ProtocolError> {
        let entries = self.keystore.snapshot().await;
        let count = entries.len();
        let password = zeroize::Zeroizing::new(password.to_string());
        let kdf = self.settings.backup_kdf.clone();

        let backup = Self::blocking(ProtocolOperation::CreateSecureBackup, move || {
            bundle::seal_backup(&entries, &password, &kdf)
        })
        .await?;

        info!(count, "Secure backup created");
        Ok(backup)
    }

    async fn restore_secure_backup(
        &self,
        backup: &[u8],
        password: &str,
    ) -> Result<usize, ProtocolError> {
        let backup = backup.to_vec();
        let password = zeroize::Zeroizing::new(password.to_string());
        let kdf = self.settings.backup_kdf.clone();

        let entries = Self::blocking(ProtocolOperation::RestoreSecureBackup, move || {
            bundle::open_backup(&backup, &password, &kdf)
        })
        .await?;

        let mut restored = 0;
        for entry in entries {
            let identifier = entry.identifier.clone();
            match self.keystore.import(entry).await {
                Ok(()) => restored += 1,
                Err(KeyStoreError::IdentifierRetired(_)) => {
                    warn!(identifier = %identifier, "Skipping retired identifier in backup");
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(count = restored, "Secure backup restored");
        Ok(restored)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::settings::BackupKdfSettings;
    use umbra_error::ErrorKind;

    fn settings() -> Settings {
        Settings {
            hardware_identifier: Some("device-01".into()),
            backup_kdf: BackupKdfSettings {
                memory_kib: 64,
                iterations: 1,
                parallelism: 1,
            },
            ..Settings::default()
        }
    }

    fn service() -> SecurityService {
        SecurityService::software(settings())
    }

    #[tokio::test]
    async fn test_status_and_identity() {
        let svc = service();
        svc.ping().await.unwrap();
        assert_eq!(svc.protocol_version(), "3.0");
        assert_eq!(svc.get_hardware_identifier().await.unwrap(), "device-01");

        let status = svc.status().await.unwrap();
        assert_eq!(status.tier, CapabilityTier::Complete);
        assert_eq!(status.key_count, 0);
        assert_eq!(status.engine, "software");
    }

    #[tokio::test]
    async fn test_generated_hardware_identifier_is_stable() {
        let svc = SecurityService::software(Settings::default());
        let first = svc.get_hardware_identifier().await.unwrap();
        assert_eq!(first.len(), HARDWARE_ID_BYTES * 2);
        assert_eq!(svc.get_hardware_identifier().await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_encrypt_with_service_key() {
        let svc = service();
        let ciphertext = svc.encrypt_secure_data(b"secret", None).await.unwrap();
        let plaintext = svc
            .decrypt_secure_data(ciphertext.as_bytes(), None)
            .await
            .unwrap();
        assert_eq!(plaintext.as_bytes(), b"secret");

        let keys = svc.list_keys().await.unwrap();
        assert_eq!(keys.len(), 1);
        let info = svc.get_key_info(&keys[0]).await.unwrap();
        assert_eq!(
            info.metadata.get(PURPOSE_LABEL).map(String::as_str),
            Some(SERVICE_KEY_PURPOSE)
        );
    }

    #[tokio::test]
    async fn test_reset_replaces_service_key() {
        let svc = service();
        let ciphertext = svc.encrypt_secure_data(b"secret", None).await.unwrap();

        svc.reset_security_data().await.unwrap();
        assert!(svc.list_keys().await.unwrap().is_empty());

        let err = svc
            .decrypt_secure_data(ciphertext.as_bytes(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::DecryptionFailed(_)));
        assert_eq!(svc.list_keys().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_import_export_delete() {
        let svc = service();
        let material = SecureBuffer::new(vec![5u8; 32]);
        svc.import_key("imported", material.clone()).await.unwrap();
        assert_eq!(svc.export_key("imported").await.unwrap(), material);

        svc.delete_key("imported").await.unwrap();
        let err = svc.export_key("imported").await.unwrap_err();
        assert_eq!(err, ProtocolError::KeyNotFound("imported".into()));

        let err = svc.delete_key("imported").await.unwrap_err();
        assert!(matches!(err, ProtocolError::KeyNotFound(_)));
    }

    #[tokio::test]
    async fn test_sign_and_verify_with_key_pair() {
        let svc = service();
        let pair = svc.generate_key_pair(Some("signer")).await.unwrap();
        assert_eq!(pair.identifier, "signer");
        assert_eq!(pair.public_key.len(), 32);

        let signature = svc.sign(b"document", "signer").await.unwrap();
        assert!(svc.verify(b"document", &signature, "signer").await.unwrap());
        assert!(!svc.verify(b"tampered", &signature, "signer").await.unwrap());

        let err = svc.generate_key_pair(Some("signer")).await.unwrap_err();
        assert!(matches!(err, ProtocolError::KeyAlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_authenticated_encryption_binds_aad() {
        let svc = service();
        let ciphertext = svc
            .authenticated_encrypt(b"payload", b"header-v1", None)
            .await
            .unwrap();

        let plaintext = svc
            .authenticated_decrypt(ciphertext.as_bytes(), b"header-v1", None)
            .await
            .unwrap();
        assert_eq!(plaintext.as_bytes(), b"payload");

        let err = svc
            .authenticated_decrypt(ciphertext.as_bytes(), b"header-v2", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::DecryptionFailed(_)));
    }

    #[tokio::test]
    async fn test_random_and_derivation() {
        let svc = service();
        assert_eq!(svc.generate_random_data(24).await.unwrap().len(), 24);
        let err = svc.generate_random_data(0).await.unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidFormat(_)));

        svc.import_key("root", SecureBuffer::new(vec![1u8; 32]))
            .await
            .unwrap();
        let a = svc.derive_key("root", Some(b"salt"), b"ctx", 32).await.unwrap();
        let b = svc.derive_key("root", Some(b"salt"), b"ctx", 32).await.unwrap();
        let c = svc.derive_key("root", Some(b"salt"), b"other", 32).await.unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn test_backup_and_restore() {
        let source = service();
        source
            .import_key("k1", SecureBuffer::new(vec![2u8; 32]))
            .await
            .unwrap();
        source.generate_key_pair(Some("signer")).await.unwrap();
        let backup = source.create_secure_backup("hunter2").await.unwrap();

        let target = service();
        let err = target
            .restore_secure_backup(&backup, "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::AuthenticationFailed(_)));

        assert_eq!(target.restore_secure_backup(&backup, "hunter2").await.unwrap(), 2);
        assert_eq!(
            target.export_key("k1").await.unwrap(),
            SecureBuffer::new(vec![2u8; 32])
        );
        let signature = target.sign(b"doc", "signer").await.unwrap();
        assert!(source.verify(b"doc", &signature, "signer").await.unwrap());
    }

    #[tokio::test]
    async fn test_restore_skips_retired_identifiers() {
        let svc = service();
        svc.import_key("k1", SecureBuffer::new(vec![2u8; 32]))
            .await
            .unwrap();
        let backup = svc.create_secure_backup("pw").await.unwrap();

        svc.reset_security_data().await.unwrap();
        assert_eq!(svc.restore_secure_backup(&backup, "pw").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_synchronise_keys() {
        let source = service();
        source
            .import_key("shared", SecureBuffer::new(vec![8u8; 16]))
            .await
            .unwrap();
        let bundle = KeyBundle::from_entries(&source.keystore().snapshot().await)
            .to_json()
            .unwrap();

        let target = service();
        assert_eq!(target.synchronise_keys(&bundle).await.unwrap(), 1);
        assert_eq!(target.synchronise_keys(&bundle).await.unwrap(), 0);

        let err = target.synchronise_keys(b"").await.unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidFormat(_)));
        let err = target.synchronise_keys(b"[1,2").await.unwrap_err();
        assert!(matches!(err, ProtocolError::SerializationFailed(_)));
    }

    #[tokio::test]
    async fn test_rejected_sync_imports_nothing() {
        let svc = service();
        let bundle = br#"{"version":1,"keys":[
            {"identifier":"aaa","algorithm":"AES-GCM","material":"AAAA"},
            {"identifier":"bad id","algorithm":"AES-GCM","material":"AAAA"}
        ]}"#;

        let err = svc.synchronise_keys(bundle).await.unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidFormat(_)));
        assert!(svc.keystore().is_empty().await);
        assert!(svc.export_key("aaa").await.is_err());
    }

    #[tokio::test]
    async fn test_derive_key_rejects_signing_key() {
        let svc = service();
        svc.generate_key_pair(Some("sig")).await.unwrap();

        let err = svc.derive_key("sig", None, b"x", 32).await.unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::InvalidKeyType { ref received, .. } if received == "signing"
        ));
    }

    #[tokio::test]
    async fn test_execute_resolves_configuration() {
        let svc = service();
        let partial = BTreeMap::from([("keySizeInBits".to_string(), "128".to_string())]);
        let result = svc
            .execute(&SecurityOperation::RandomGeneration, Some(&partial), None)
            .await;
        assert_eq!(result.bytes().unwrap().len(), 16);

        let strict = SecurityService::software(Settings {
            strict_config: true,
            ..settings()
        });
        let partial = BTreeMap::from([("keySizeInBits".to_string(), "lots".to_string())]);
        let result = strict
            .execute(&SecurityOperation::RandomGeneration, Some(&partial), None)
            .await;
        assert_eq!(result.error_kind(), Some(ErrorKind::InvalidInput));
    }
}
