//! # Operation Dispatcher
//!
//! Routes a [`SecurityOperation`] to the crypto engine or the key store
//! and folds the outcome into an [`OperationResult`].
//!
//! ## Key references
//!
//! Operations that need a key take it from the [`OperationInput`]:
//! a stored key by identifier, or raw material. When the input names no
//! key, the `keyIdentifier` option of the [`OperationConfig`] is used.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use umbra_crypto::config::options;
use umbra_crypto::software::ED25519;
use umbra_crypto::{CryptoEngine, CryptoError, OperationConfig, SecureBuffer};
use umbra_error::{Canonical, CanonicalError, ErrorKind};
use umbra_keystore::{KeyKind, KeyStore};

use crate::input::{KeyReference, OperationInput};
use crate::operation::SecurityOperation;
use crate::result::{OperationResult, Payload};
use crate::settings::Settings;

/// Operation name reported for key derivation.
const KEY_DERIVATION: &str = "keyDerivation";

/// Executes security operations against one engine and one key store.
pub struct OperationDispatcher {
    keystore: Arc<KeyStore>,
    engine: Arc<dyn CryptoEngine>,
    timeout: Duration,
}

/// A resolved key plus the algorithm it was stored for.
struct ResolvedKey {
    material: SecureBuffer,
    kind: KeyKind,
    algorithm: Option<String>,
}

impl OperationDispatcher {
    /// Creates a dispatcher over `keystore`, using the store's engine.
    pub fn new(keystore: Arc<KeyStore>, settings: &Settings) -> Self {
        let engine = Arc::clone(keystore.engine());
        Self {
            keystore,
            engine,
            timeout: settings.operation_timeout(),
        }
    }

    /// Overrides the default timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The key store operations are forwarded to.
    pub fn keystore(&self) -> &Arc<KeyStore> {
        &self.keystore
    }

    /// Default timeout applied by [`execute`](Self::execute).
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Executes `operation` under the default timeout.
    pub async fn execute(
        &self,
        operation: &SecurityOperation,
        config: &OperationConfig,
        input: Option<&OperationInput>,
    ) -> OperationResult {
        self.execute_with_timeout(operation, config, input, self.timeout)
            .await
    }

    /// Executes `operation`, failing with `Timeout` after `timeout`.
    ///
    /// A timed-out operation is dropped at its current suspension point.
    /// Key store mutations only happen after their last await, so nothing
    /// is left half-applied.
    pub async fn execute_with_timeout(
        &self,
        operation: &SecurityOperation,
        config: &OperationConfig,
        input: Option<&OperationInput>,
        timeout: Duration,
    ) -> OperationResult {
        debug!(operation = %operation, algorithm = %config.algorithm(), "Dispatching operation");

        Self::bounded(operation, timeout, self.run(operation, config, input))
            .await
            .into()
    }

    /// Derives `length` bytes from the stored symmetric key `key_id`.
    ///
    /// Runs under the default timeout like any dispatched operation.
    pub async fn derive_key(
        &self,
        key_id: &str,
        salt: Option<&[u8]>,
        info: &[u8],
        length: usize,
    ) -> Result<SecureBuffer, CanonicalError> {
        debug!(operation = KEY_DERIVATION, key_id = %key_id, length, "Dispatching operation");

        let derive = async {
            let entry = self
                .keystore
                .export(key_id)
                .await
                .map_err(|e| e.to_canonical())?;
            if entry.kind != KeyKind::Symmetric {
                return Err(Self::wrong_kind(KeyKind::Symmetric, entry.kind));
            }
            self.engine
                .derive_key(&entry.material, salt, info, length)
                .await
                .map_err(|e| e.to_canonical())
        };

        Self::bounded(KEY_DERIVATION, self.timeout, derive).await
    }

    async fn bounded<T>(
        operation: impl std::fmt::Display,
        timeout: Duration,
        work: impl std::future::Future<Output = Result<T, CanonicalError>>,
    ) -> Result<T, CanonicalError> {
        let outcome = match tokio::time::timeout(timeout, work).await {
            Ok(outcome) => outcome,
            Err(_) => Err(CanonicalError::new(
                ErrorKind::Timeout,
                format!("{operation} timed out after {}ms", timeout.as_millis()),
            )),
        };

        if let Err(error) = &outcome {
            warn!(
                operation = %operation,
                kind = %error.kind(),
                retryable = error.is_retryable(),
                "Operation failed"
            );
        }

        outcome
    }

    // ========================================================================
    // Routing
    // ========================================================================

    async fn run(
        &self,
        operation: &SecurityOperation,
        config: &OperationConfig,
        input: Option<&OperationInput>,
    ) -> Result<Payload, CanonicalError> {
        use SecurityOperation as Op;

        match operation {
            Op::RandomGeneration => {
                let length = config.key_size_bytes().ok_or_else(|| {
                    CanonicalError::invalid_input(format!(
                        "{operation}: key size must be a positive multiple of 8 bits, got {}",
                        config.key_size_bits()
                    ))
                })?;
                let bytes = self
                    .engine
                    .generate_random(length)
                    .await
                    .map_err(|e| e.to_canonical())?;
                Ok(Payload::Bytes(bytes))
            }

            Op::SymmetricEncryption | Op::SymmetricDecryption => {
                let data = Self::data(operation, input)?;
                let key = self.resolve_key(operation, config, input).await?;
                if key.kind != KeyKind::Symmetric {
                    return Err(Self::wrong_kind(KeyKind::Symmetric, key.kind));
                }
                let result = if matches!(operation, Op::SymmetricEncryption) {
                    self.engine.encrypt(data, &key.material, config).await
                } else {
                    self.engine.decrypt(data, &key.material, config).await
                };
                result.map(Payload::Bytes).map_err(|e| e.to_canonical())
            }

            Op::AsymmetricEncryption => {
                let data = Self::data(operation, input)?;
                let public_key = match input.and_then(OperationInput::key) {
                    Some(KeyReference::Material(material)) => material.as_bytes().to_vec(),
                    _ => {
                        let id = Self::key_identifier(operation, config, input)?;
                        self.keystore
                            .public_key(&id)
                            .await
                            .map_err(|e| e.to_canonical())?
                    }
                };
                self.engine
                    .encrypt_asymmetric(data, &public_key, config)
                    .await
                    .map(Payload::Bytes)
                    .map_err(|e| e.to_canonical())
            }

            Op::AsymmetricDecryption => {
                let data = Self::data(operation, input)?;
                let key = self.resolve_key(operation, config, input).await?;
                self.engine
                    .decrypt_asymmetric(data, &key.material, config)
                    .await
                    .map(Payload::Bytes)
                    .map_err(|e| e.to_canonical())
            }

            Op::Hashing => {
                let data = Self::data(operation, input)?;
                let digest = self
                    .engine
                    .hash(data, config)
                    .await
                    .map_err(|e| e.to_canonical())?;
                Ok(Payload::Bytes(SecureBuffer::new(digest)))
            }

            Op::SignatureGeneration => {
                let data = Self::data(operation, input)?;
                let key = self.resolve_key(operation, config, input).await?;
                let config = key.signing_config(config);
                let signature = self
                    .engine
                    .sign(data, &key.material, &config)
                    .await
                    .map_err(|e| e.to_canonical())?;
                Ok(Payload::Bytes(SecureBuffer::new(signature)))
            }

            Op::SignatureVerification => {
                let data = Self::data(operation, input)?;
                let signature = input.and_then(OperationInput::signature).ok_or_else(|| {
                    CanonicalError::invalid_input(format!("{operation} requires a signature"))
                })?;
                let key = self.resolve_key(operation, config, input).await?;
                let config = key.signing_config(config);
                let verified = self
                    .engine
                    .verify(data, signature, &key.material, &config)
                    .await
                    .map_err(|e| e.to_canonical())?;
                Ok(Payload::Verified(verified))
            }

            Op::KeyGeneration => {
                let kind = if config.algorithm().eq_ignore_ascii_case(ED25519) {
                    KeyKind::Signing
                } else {
                    KeyKind::Symmetric
                };
                let identifier = input
                    .and_then(OperationInput::key_id)
                    .or_else(|| config.option(options::KEY_IDENTIFIER));
                let metadata = input
                    .map(|input| input.metadata().clone())
                    .unwrap_or_default();
                let identifier = self
                    .keystore
                    .generate(kind, config, identifier, metadata)
                    .await
                    .map_err(|e| e.to_canonical())?;
                Ok(Payload::Identifier(identifier))
            }

            Op::KeyStorage => {
                let material = Self::data(operation, input)?;
                let id = Self::key_identifier(operation, config, input)?;
                self.keystore
                    .store(SecureBuffer::from_slice(material), &id)
                    .await
                    .map_err(|e| e.to_canonical())?;
                Ok(Payload::Empty)
            }

            Op::KeyRetrieval => {
                let id = Self::key_identifier(operation, config, input)?;
                self.keystore
                    .retrieve(&id)
                    .await
                    .map(Payload::Bytes)
                    .map_err(|e| e.to_canonical())
            }

            Op::KeyRotation => {
                let id = Self::key_identifier(operation, config, input)?;
                let data = input
                    .and_then(OperationInput::payload)
                    .map(SecureBuffer::as_bytes);
                let rotation = self
                    .keystore
                    .rotate(&id, data, config)
                    .await
                    .map_err(|e| e.to_canonical())?;
                Ok(Payload::Rotated {
                    material: rotation.material,
                    reencrypted: rotation.reencrypted,
                })
            }

            Op::KeyDeletion => {
                let id = Self::key_identifier(operation, config, input)?;
                self.keystore
                    .delete(&id)
                    .await
                    .map_err(|e| e.to_canonical())?;
                Ok(Payload::Empty)
            }

            Op::Custom(name) if name.is_empty() => Err(CanonicalError::not_supported("custom")),
            Op::Custom(name) => Err(CanonicalError::not_supported(name.as_str())),
        }
    }

    // ========================================================================
    // Input helpers
    // ========================================================================

    fn data<'a>(
        operation: &SecurityOperation,
        input: Option<&'a OperationInput>,
    ) -> Result<&'a [u8], CanonicalError> {
        input
            .and_then(OperationInput::payload)
            .map(SecureBuffer::as_bytes)
            .ok_or_else(|| CanonicalError::invalid_input(format!("{operation} requires input data")))
    }

    fn key_identifier(
        operation: &SecurityOperation,
        config: &OperationConfig,
        input: Option<&OperationInput>,
    ) -> Result<String, CanonicalError> {
        input
            .and_then(OperationInput::key_id)
            .or_else(|| config.option(options::KEY_IDENTIFIER))
            .map(str::to_string)
            .ok_or_else(|| {
                CanonicalError::invalid_input(format!("{operation} requires a key identifier"))
            })
    }

    async fn resolve_key(
        &self,
        operation: &SecurityOperation,
        config: &OperationConfig,
        input: Option<&OperationInput>,
    ) -> Result<ResolvedKey, CanonicalError> {
        if let Some(KeyReference::Material(material)) = input.and_then(OperationInput::key) {
            return Ok(ResolvedKey {
                material: material.clone(),
                kind: KeyKind::Symmetric,
                algorithm: None,
            });
        }

        let id = Self::key_identifier(operation, config, input)?;
        let entry = self
            .keystore
            .export(&id)
            .await
            .map_err(|e| e.to_canonical())?;
        Ok(ResolvedKey {
            material: entry.material,
            kind: entry.kind,
            algorithm: Some(entry.algorithm),
        })
    }

    fn wrong_kind(expected: KeyKind, received: KeyKind) -> CanonicalError {
        CryptoError::InvalidKeyType {
            expected: expected.to_string(),
            received: received.to_string(),
        }
        .to_canonical()
    }
}

impl ResolvedKey {
    /// Stored signing keys are used with the algorithm they were made for.
    fn signing_config(&self, config: &OperationConfig) -> OperationConfig {
        match (&self.kind, &self.algorithm) {
            (KeyKind::Signing, Some(algorithm)) => config.with_algorithm(algorithm.as_str()),
            _ => config.clone(),
        }
    }
}

impl std::fmt::Debug for OperationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationDispatcher")
            .field("engine", &self.engine.name())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
