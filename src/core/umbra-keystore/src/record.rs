//! Key records and their public views.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use umbra_crypto::SecureBuffer;

use crate::error::KeyStoreError;

/// What a key is used for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    /// Secret key for encryption and MACs.
    #[default]
    Symmetric,
    /// Private half of a signing key pair.
    Signing,
}

impl std::fmt::Display for KeyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Symmetric => write!(f, "symmetric"),
            Self::Signing => write!(f, "signing"),
        }
    }
}

impl FromStr for KeyKind {
    type Err = KeyStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "symmetric" => Ok(Self::Symmetric),
            "signing" => Ok(Self::Signing),
            _ => Err(KeyStoreError::Crypto(umbra_crypto::CryptoError::InvalidInput(
                format!("unknown key kind: {}", s),
            ))),
        }
    }
}

/// Lifecycle state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStatus {
    /// Created and never rotated.
    Active,
    /// Material replaced at least once.
    Rotated,
    /// Tombstone; material is zeroed.
    Deleted,
}

impl KeyStatus {
    /// Whether the record still holds usable material.
    pub fn is_live(self) -> bool {
        !matches!(self, Self::Deleted)
    }
}

/// Stored representation of one managed key.
#[derive(Debug)]
pub(crate) struct KeyRecord {
    pub(crate) identifier: String,
    pub(crate) material: SecureBuffer,
    pub(crate) kind: KeyKind,
    pub(crate) algorithm: String,
    pub(crate) status: KeyStatus,
    pub(crate) version: u32,
    pub(crate) public_key: Option<Vec<u8>>,
    pub(crate) metadata: BTreeMap<String, String>,
    pub(crate) created_at: u64,
    pub(crate) updated_at: u64,
}

impl KeyRecord {
    pub(crate) fn from_entry(entry: KeyEntry, now: u64) -> Self {
        Self {
            identifier: entry.identifier,
            material: entry.material,
            kind: entry.kind,
            algorithm: entry.algorithm,
            status: KeyStatus::Active,
            version: 1,
            public_key: entry.public_key,
            metadata: entry.metadata,
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn info(&self) -> KeyInfo {
        KeyInfo {
            identifier: self.identifier.clone(),
            kind: self.kind,
            algorithm: self.algorithm.clone(),
            status: self.status,
            version: self.version,
            key_size_bits: self.material.len() * 8,
            public_key: self.public_key.clone(),
            metadata: self.metadata.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub(crate) fn entry(&self) -> KeyEntry {
        KeyEntry {
            identifier: self.identifier.clone(),
            kind: self.kind,
            algorithm: self.algorithm.clone(),
            material: self.material.clone(),
            public_key: self.public_key.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Zeroes the material and marks the record as a tombstone.
    pub(crate) fn tombstone(&mut self, now: u64) {
        // Dropping the old buffer wipes it.
        self.material = SecureBuffer::default();
        self.public_key = None;
        self.status = KeyStatus::Deleted;
        self.updated_at = now;
    }
}

/// A key together with everything needed to recreate its record.
///
/// Used for import, export, backups and synchronisation.
#[derive(Debug, Clone)]
pub struct KeyEntry {
    /// Unique identifier.
    pub identifier: String,
    /// Key kind.
    pub kind: KeyKind,
    /// Algorithm the material is meant for.
    pub algorithm: String,
    /// Secret material.
    pub material: SecureBuffer,
    /// Public half for signing keys.
    pub public_key: Option<Vec<u8>>,
    /// Caller-supplied labels.
    pub metadata: BTreeMap<String, String>,
}

impl KeyEntry {
    /// A symmetric key with no metadata.
    pub fn symmetric(
        identifier: impl Into<String>,
        algorithm: impl Into<String>,
        material: SecureBuffer,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            kind: KeyKind::Symmetric,
            algorithm: algorithm.into(),
            material,
            public_key: None,
            metadata: BTreeMap::new(),
        }
    }
}

/// Metadata about a key, without its secret material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    /// Unique identifier.
    pub identifier: String,
    /// Key kind.
    pub kind: KeyKind,
    /// Algorithm the material is meant for.
    pub algorithm: String,
    /// Lifecycle state.
    pub status: KeyStatus,
    /// Starts at 1, incremented by each rotation.
    pub version: u32,
    /// Length of the secret material in bits.
    pub key_size_bits: usize,
    /// Public half for signing keys.
    pub public_key: Option<Vec<u8>>,
    /// Caller-supplied labels.
    pub metadata: BTreeMap<String, String>,
    /// Creation timestamp (Unix seconds).
    pub created_at: u64,
    /// Last update timestamp (Unix seconds).
    pub updated_at: u64,
}

/// Outcome of a rotation.
#[derive(Debug, Clone)]
pub struct Rotation {
    /// The new material now stored under the identifier.
    pub material: SecureBuffer,
    /// Caller data re-encrypted under the new material, if any was supplied.
    pub reencrypted: Option<SecureBuffer>,
    /// Version after rotation.
    pub version: u32,
}
