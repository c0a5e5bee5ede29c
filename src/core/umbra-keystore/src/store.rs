//! The key store.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use umbra_crypto::{CryptoEngine, CryptoError, OperationConfig, SecureBuffer};

use crate::error::KeyStoreError;
use crate::record::{KeyEntry, KeyInfo, KeyKind, KeyRecord, KeyStatus, Rotation};

/// Longest accepted identifier.
pub const MAX_IDENTIFIER_LEN: usize = 128;

type Shard = Arc<Mutex<KeyRecord>>;

/// Sole owner of every key record.
///
/// The index is guarded by a `RwLock`; each record sits behind its own
/// `Mutex`. A record lock is never held while waiting for the index lock.
pub struct KeyStore {
    engine: Arc<dyn CryptoEngine>,
    records: RwLock<HashMap<String, Shard>>,
}

impl KeyStore {
    /// Creates an empty store that generates material with `engine`.
    pub fn new(engine: Arc<dyn CryptoEngine>) -> Self {
        info!(engine = engine.name(), "KeyStore initialized");
        Self {
            engine,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// The engine used for generation and re-encryption.
    pub fn engine(&self) -> &Arc<dyn CryptoEngine> {
        &self.engine
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn now() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }

    /// Checks that `identifier` is acceptable as a key identifier.
    pub fn validate_identifier(identifier: &str) -> Result<(), KeyStoreError> {
        if identifier.is_empty() {
            return Err(KeyStoreError::InvalidIdentifier(
                "identifier cannot be empty".into(),
            ));
        }
        if identifier.len() > MAX_IDENTIFIER_LEN {
            return Err(KeyStoreError::InvalidIdentifier(format!(
                "identifier too long (max {} chars)",
                MAX_IDENTIFIER_LEN
            )));
        }
        if !identifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(KeyStoreError::InvalidIdentifier(
                "identifier can only contain alphanumeric characters, '-', '_' and '.'".into(),
            ));
        }
        Ok(())
    }

    async fn shard(&self, identifier: &str) -> Result<Shard, KeyStoreError> {
        self.records
            .read()
            .await
            .get(identifier)
            .cloned()
            .ok_or_else(|| KeyStoreError::KeyNotFound(identifier.to_string()))
    }

    async fn shards(&self) -> Vec<Shard> {
        self.records.read().await.values().cloned().collect()
    }

    /// Inserts a new record, failing if the identifier was ever used.
    async fn insert_new(&self, record: KeyRecord) -> Result<(), KeyStoreError> {
        let mut records = self.records.write().await;
        match records.entry(record.identifier.clone()) {
            Entry::Occupied(_) => Err(KeyStoreError::KeyAlreadyExists(record.identifier)),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(record)));
                Ok(())
            }
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Generates a new key and returns its identifier.
    ///
    /// Symmetric keys take their length from `config.key_size_bits()`;
    /// signing keys come from the engine's key-pair generator. When
    /// `identifier` is `None` a UUID is synthesized.
    pub async fn generate(
        &self,
        kind: KeyKind,
        config: &OperationConfig,
        identifier: Option<&str>,
        metadata: BTreeMap<String, String>,
    ) -> Result<String, KeyStoreError> {
        let identifier = match identifier {
            Some(id) => {
                Self::validate_identifier(id)?;
                if self.records.read().await.contains_key(id) {
                    return Err(KeyStoreError::KeyAlreadyExists(id.to_string()));
                }
                id.to_string()
            }
            None => uuid::Uuid::new_v4().to_string(),
        };

        let (material, public_key, algorithm) = match kind {
            KeyKind::Symmetric => {
                let length = config.key_size_bytes().ok_or_else(|| {
                    CryptoError::InvalidInput(format!(
                        "key size must be a positive multiple of 8 bits, got {}",
                        config.key_size_bits()
                    ))
                })?;
                let material = self.engine.generate_random(length).await?;
                (material, None, config.algorithm().to_string())
            }
            KeyKind::Signing => {
                let pair = self.engine.generate_key_pair(config).await?;
                (pair.private_key, Some(pair.public_key), pair.algorithm)
            }
        };

        let entry = KeyEntry {
            identifier: identifier.clone(),
            kind,
            algorithm,
            material,
            public_key,
            metadata,
        };
        self.insert_new(KeyRecord::from_entry(entry, Self::now()))
            .await?;

        info!(identifier = %identifier, kind = %kind, "Key generated");

        Ok(identifier)
    }

    /// Stores raw symmetric material, overwriting any live key under `identifier`.
    ///
    /// The overwritten key is replaced whole: a signing key stored over
    /// becomes a symmetric key with the default algorithm and no public key.
    pub async fn store(
        &self,
        material: SecureBuffer,
        identifier: &str,
    ) -> Result<(), KeyStoreError> {
        let algorithm = umbra_crypto::config::DEFAULT_ALGORITHM;
        self.import(KeyEntry::symmetric(identifier, algorithm, material))
            .await
    }

    /// Stores a full key entry, overwriting any live key under the same identifier.
    ///
    /// Overwriting keeps the creation time and bumps the version.
    pub async fn import(&self, entry: KeyEntry) -> Result<(), KeyStoreError> {
        Self::validate_identifier(&entry.identifier)?;
        let now = Self::now();

        let existing = {
            let mut records = self.records.write().await;
            match records.entry(entry.identifier.clone()) {
                Entry::Occupied(slot) => slot.get().clone(),
                Entry::Vacant(slot) => {
                    let identifier = entry.identifier.clone();
                    slot.insert(Arc::new(Mutex::new(KeyRecord::from_entry(entry, now))));
                    info!(identifier = %identifier, "Key imported");
                    return Ok(());
                }
            }
        };

        let mut record = existing.lock().await;
        if !record.status.is_live() {
            return Err(KeyStoreError::IdentifierRetired(entry.identifier));
        }

        record.material = entry.material;
        record.kind = entry.kind;
        record.algorithm = entry.algorithm;
        record.public_key = entry.public_key;
        record.metadata = entry.metadata;
        record.version += 1;
        record.updated_at = now;

        info!(identifier = %record.identifier, version = record.version, "Key overwritten");

        Ok(())
    }

    /// Imports an entry only if its identifier has never been used.
    ///
    /// Returns `false` when the identifier is taken (live or tombstoned).
    pub async fn import_if_absent(&self, entry: KeyEntry) -> Result<bool, KeyStoreError> {
        Self::validate_identifier(&entry.identifier)?;
        let identifier = entry.identifier.clone();
        match self
            .insert_new(KeyRecord::from_entry(entry, Self::now()))
            .await
        {
            Ok(()) => {
                info!(identifier = %identifier, "Key imported");
                Ok(true)
            }
            Err(KeyStoreError::KeyAlreadyExists(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Returns a copy of the current material.
    pub async fn retrieve(&self, identifier: &str) -> Result<SecureBuffer, KeyStoreError> {
        let shard = self.shard(identifier).await?;
        let record = shard.lock().await;
        if !record.status.is_live() {
            return Err(KeyStoreError::KeyNotFound(identifier.to_string()));
        }
        debug!(identifier = %identifier, "Key retrieved");
        Ok(record.material.clone())
    }

    /// Returns metadata about a live key.
    pub async fn get_info(&self, identifier: &str) -> Result<KeyInfo, KeyStoreError> {
        let shard = self.shard(identifier).await?;
        let record = shard.lock().await;
        if !record.status.is_live() {
            return Err(KeyStoreError::KeyNotFound(identifier.to_string()));
        }
        Ok(record.info())
    }

    /// Returns the full entry of a live key.
    pub async fn export(&self, identifier: &str) -> Result<KeyEntry, KeyStoreError> {
        let shard = self.shard(identifier).await?;
        let record = shard.lock().await;
        if !record.status.is_live() {
            return Err(KeyStoreError::KeyNotFound(identifier.to_string()));
        }
        debug!(identifier = %identifier, "Key exported");
        Ok(record.entry())
    }

    /// Returns the public key of a live signing key.
    pub async fn public_key(&self, identifier: &str) -> Result<Vec<u8>, KeyStoreError> {
        let shard = self.shard(identifier).await?;
        let record = shard.lock().await;
        if !record.status.is_live() {
            return Err(KeyStoreError::KeyNotFound(identifier.to_string()));
        }
        match (&record.kind, &record.public_key) {
            (KeyKind::Signing, Some(public_key)) => Ok(public_key.clone()),
            _ => Err(CryptoError::InvalidKeyType {
                expected: KeyKind::Signing.to_string(),
                received: record.kind.to_string(),
            }
            .into()),
        }
    }

    /// Deletes a key, leaving a tombstone.
    pub async fn delete(&self, identifier: &str) -> Result<(), KeyStoreError> {
        let shard = self.shard(identifier).await?;
        let mut record = shard.lock().await;
        if !record.status.is_live() {
            return Err(KeyStoreError::KeyNotFound(identifier.to_string()));
        }
        record.tombstone(Self::now());

        warn!(identifier = %identifier, "Key deleted");

        Ok(())
    }

    /// Replaces the material under `identifier`.
    ///
    /// New material has the same length as the old one (symmetric keys) or
    /// comes from a fresh key pair (signing keys). When `data` is given it is
    /// decrypted with the old key and encrypted with the new one using
    /// `config`.
    ///
    /// Every engine call completes before the record is touched, so dropping
    /// the future part way leaves the record unchanged.
    pub async fn rotate(
        &self,
        identifier: &str,
        data: Option<&[u8]>,
        config: &OperationConfig,
    ) -> Result<Rotation, KeyStoreError> {
        let shard = self.shard(identifier).await?;
        let mut record = shard.lock().await;
        if !record.status.is_live() {
            return Err(KeyStoreError::KeyNotFound(identifier.to_string()));
        }

        let (material, public_key) = match record.kind {
            KeyKind::Symmetric => {
                let material = self.engine.generate_random(record.material.len()).await?;
                (material, None)
            }
            KeyKind::Signing => {
                let pair = self
                    .engine
                    .generate_key_pair(&config.with_algorithm(record.algorithm.as_str()))
                    .await?;
                (pair.private_key, Some(pair.public_key))
            }
        };

        let reencrypted = match data {
            Some(ciphertext) => {
                if record.kind != KeyKind::Symmetric {
                    return Err(CryptoError::InvalidKeyType {
                        expected: KeyKind::Symmetric.to_string(),
                        received: record.kind.to_string(),
                    }
                    .into());
                }
                let plaintext = self
                    .engine
                    .decrypt(ciphertext, &record.material, config)
                    .await?;
                let ciphertext = self
                    .engine
                    .encrypt(plaintext.as_bytes(), &material, config)
                    .await?;
                Some(ciphertext)
            }
            None => None,
        };

        // Old material is dropped, and wiped, by the assignment.
        record.material = material.clone();
        record.public_key = public_key;
        record.status = KeyStatus::Rotated;
        record.version += 1;
        record.updated_at = Self::now();

        info!(
            identifier = %identifier,
            version = record.version,
            reencrypted = reencrypted.is_some(),
            "Key rotated"
        );

        Ok(Rotation {
            material,
            reencrypted,
            version: record.version,
        })
    }

    // ========================================================================
    // Bulk
    // ========================================================================

    /// Identifiers of every live key, in no particular order.
    pub async fn list_identifiers(&self) -> Vec<String> {
        let mut identifiers = Vec::new();
        for shard in self.shards().await {
            let record = shard.lock().await;
            if record.status.is_live() {
                identifiers.push(record.identifier.clone());
            }
        }
        identifiers
    }

    /// Number of live keys.
    pub async fn len(&self) -> usize {
        self.list_identifiers().await.len()
    }

    /// Whether no live keys remain.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Copies of every live key.
    pub async fn snapshot(&self) -> Vec<KeyEntry> {
        let mut entries = Vec::new();
        for shard in self.shards().await {
            let record = shard.lock().await;
            if record.status.is_live() {
                entries.push(record.entry());
            }
        }
        entries
    }

    /// Tombstones every live key and returns how many were deleted.
    pub async fn purge(&self) -> usize {
        let now = Self::now();
        let mut purged = 0;
        for shard in self.shards().await {
            let mut record = shard.lock().await;
            if record.status.is_live() {
                record.tombstone(now);
                purged += 1;
            }
        }

        warn!(count = purged, "KeyStore purged");

        purged
    }
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore")
            .field("engine", &self.engine.name())
            .finish_non_exhaustive()
    }
}
