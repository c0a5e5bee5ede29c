//! Key bundles and password-protected backups.
//!
//! A key bundle is JSON:
//!
//! ```json
//! {"version":1,"keys":[{"identifier":"k1","kind":"symmetric","algorithm":"AES-GCM","material":"<base64>"}]}
//! ```
//!
//! Synchronisation exchanges bundles in the clear. Backups seal a bundle:
//!
//! ```text
//! "UMBK" | version (1 byte) | salt (16 bytes) | AES-256-GCM ciphertext
//! ```
//!
//! The AES key is derived from the password with Argon2id. The header is
//! bound to the ciphertext as associated data.

use std::collections::BTreeMap;

use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use umbra_crypto::{aead, random, SecureBuffer};
use umbra_error::{Canonical, CanonicalError, ErrorKind};
use umbra_keystore::{KeyEntry, KeyKind, KeyStore};
use zeroize::{Zeroize, Zeroizing};

use crate::settings::BackupKdfSettings;

/// Current bundle format version.
pub const BUNDLE_VERSION: u32 = 1;

/// Magic prefix of a sealed backup.
pub const BACKUP_MAGIC: &[u8; 4] = b"UMBK";

/// Current backup format version.
pub const BACKUP_VERSION: u8 = 1;

/// Salt length for the backup KDF.
pub const BACKUP_SALT_SIZE: usize = 16;

const HEADER_SIZE: usize = BACKUP_MAGIC.len() + 1 + BACKUP_SALT_SIZE;

// ============================================================================
// Bundle
// ============================================================================

/// A serializable set of keys.
#[derive(Debug, Serialize, Deserialize)]
pub struct KeyBundle {
    /// Format version.
    pub version: u32,
    /// The keys.
    pub keys: Vec<BundledKey>,
}

/// One key inside a [`KeyBundle`].
#[derive(Serialize, Deserialize)]
pub struct BundledKey {
    /// Key identifier.
    pub identifier: String,
    /// Key kind.
    #[serde(default)]
    pub kind: KeyKind,
    /// Algorithm the material is meant for.
    pub algorithm: String,
    /// Base64 secret material.
    material: String,
    /// Base64 public key of signing keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    /// Caller labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl Drop for BundledKey {
    fn drop(&mut self) {
        self.material.zeroize();
    }
}

impl std::fmt::Debug for BundledKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundledKey")
            .field("identifier", &self.identifier)
            .field("kind", &self.kind)
            .field("algorithm", &self.algorithm)
            .field("material", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl BundledKey {
    fn from_entry(entry: &KeyEntry) -> Self {
        Self {
            identifier: entry.identifier.clone(),
            kind: entry.kind,
            algorithm: entry.algorithm.clone(),
            material: BASE64.encode(entry.material.as_bytes()),
            public_key: entry.public_key.as_ref().map(|pk| BASE64.encode(pk)),
            metadata: entry.metadata.clone(),
        }
    }

    fn to_entry(&self) -> Result<KeyEntry, CanonicalError> {
        let material = Zeroizing::new(BASE64.decode(&self.material).map_err(|e| {
            malformed(format!("material of '{}' is not base64: {e}", self.identifier))
        })?);
        if material.is_empty() {
            return Err(malformed(format!("material of '{}' is empty", self.identifier)));
        }
        let public_key = self
            .public_key
            .as_ref()
            .map(|pk| BASE64.decode(pk))
            .transpose()
            .map_err(|e| {
                malformed(format!("public key of '{}' is not base64: {e}", self.identifier))
            })?;

        Ok(KeyEntry {
            identifier: self.identifier.clone(),
            kind: self.kind,
            algorithm: self.algorithm.clone(),
            material: SecureBuffer::from(material),
            public_key,
            metadata: self.metadata.clone(),
        })
    }
}

impl KeyBundle {
    /// Bundles `entries` at the current version.
    pub fn from_entries(entries: &[KeyEntry]) -> Self {
        Self {
            version: BUNDLE_VERSION,
            keys: entries.iter().map(BundledKey::from_entry).collect(),
        }
    }

    /// Decodes every key.
    ///
    /// Fails without returning anything if any identifier is unacceptable
    /// to the key store, so a bundle is either imported whole or not at all.
    pub fn to_entries(&self) -> Result<Vec<KeyEntry>, CanonicalError> {
        for key in &self.keys {
            KeyStore::validate_identifier(&key.identifier).map_err(|e| e.to_canonical())?;
        }
        self.keys.iter().map(BundledKey::to_entry).collect()
    }

    /// Serializes to JSON. The output holds secret material.
    pub fn to_json(&self) -> Result<Zeroizing<Vec<u8>>, CanonicalError> {
        serde_json::to_vec(self)
            .map(Zeroizing::new)
            .map_err(|e| malformed(format!("failed to encode key bundle: {e}")))
    }

    /// Parses JSON. Empty input is `InvalidInput`; anything unreadable is
    /// `SerializationFailed`.
    pub fn from_json(bytes: &[u8]) -> Result<Self, CanonicalError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(CanonicalError::invalid_input("key bundle is empty"));
        }
        let bundle: Self = serde_json::from_slice(bytes)
            .map_err(|e| malformed(format!("invalid key bundle: {e}")))?;
        if bundle.version != BUNDLE_VERSION {
            return Err(malformed(format!(
                "unsupported key bundle version {}",
                bundle.version
            )));
        }
        Ok(bundle)
    }
}

// ============================================================================
// Backup
// ============================================================================

/// Seals `entries` under `password`.
pub fn seal_backup(
    entries: &[KeyEntry],
    password: &str,
    kdf: &BackupKdfSettings,
) -> Result<Vec<u8>, CanonicalError> {
    if password.is_empty() {
        return Err(CanonicalError::invalid_input("backup password is empty"));
    }

    let plaintext = KeyBundle::from_entries(entries).to_json()?;
    let salt = random::generate_bytes(BACKUP_SALT_SIZE);

    let mut header = Vec::with_capacity(HEADER_SIZE);
    header.extend_from_slice(BACKUP_MAGIC);
    header.push(BACKUP_VERSION);
    header.extend_from_slice(&salt);

    let key = derive_backup_key(password, &salt, kdf)?;
    let ciphertext = aead::encrypt(key.as_slice(), &plaintext, Some(header.as_slice()))
        .map_err(|e| CanonicalError::new(ErrorKind::EncryptionFailed, e.to_string()))?;

    let mut backup = header;
    backup.extend_from_slice(&ciphertext);
    Ok(backup)
}

/// Opens a backup produced by [`seal_backup`].
///
/// A wrong password is `AuthenticationFailed`; a truncated or foreign
/// blob is `SerializationFailed`.
pub fn open_backup(
    backup: &[u8],
    password: &str,
    kdf: &BackupKdfSettings,
) -> Result<Vec<KeyEntry>, CanonicalError> {
    if backup.is_empty() {
        return Err(CanonicalError::invalid_input("backup is empty"));
    }
    if backup.len() < HEADER_SIZE + aead::NONCE_SIZE + aead::TAG_SIZE {
        return Err(malformed("backup is truncated"));
    }

    let (header, ciphertext) = backup.split_at(HEADER_SIZE);
    if &header[..BACKUP_MAGIC.len()] != BACKUP_MAGIC {
        return Err(malformed("not an umbra backup"));
    }
    let version = header[BACKUP_MAGIC.len()];
    if version != BACKUP_VERSION {
        return Err(malformed(format!("unsupported backup version {version}")));
    }
    let salt = &header[BACKUP_MAGIC.len() + 1..];

    let key = derive_backup_key(password, salt, kdf)?;
    let plaintext = aead::decrypt(key.as_slice(), ciphertext, Some(header)).map_err(|_| {
        CanonicalError::new(
            ErrorKind::AuthenticationFailed,
            "backup password is incorrect or the backup is corrupted",
        )
    })?;

    KeyBundle::from_json(&plaintext)?.to_entries()
}

fn derive_backup_key(
    password: &str,
    salt: &[u8],
    kdf: &BackupKdfSettings,
) -> Result<Zeroizing<[u8; aead::KEY_SIZE]>, CanonicalError> {
    let params = Params::new(
        kdf.memory_kib,
        kdf.iterations,
        kdf.parallelism,
        Some(aead::KEY_SIZE),
    )
    .map_err(|e| CanonicalError::invalid_input(format!("invalid backup KDF settings: {e}")))?;

    let mut key = Zeroizing::new([0u8; aead::KEY_SIZE]);
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password_into(password.as_bytes(), salt, key.as_mut_slice())
        .map_err(|e| CanonicalError::internal(format!("backup key derivation failed: {e}")))?;
    Ok(key)
}

fn malformed(detail: impl Into<String>) -> CanonicalError {
    CanonicalError::new(ErrorKind::SerializationFailed, detail)
}
