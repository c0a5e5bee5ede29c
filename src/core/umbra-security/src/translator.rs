//! Translation between layer errors and [`CanonicalError`].

use std::error::Error as StdError;

use umbra_crypto::{BufferError, CryptoError};
use umbra_error::{Canonical, CanonicalError, ErrorKind};
use umbra_keystore::KeyStoreError;
use umbra_protocol::{LegacyError, ProtocolError};

use crate::error::SettingsError;

/// The layers that own an error representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetLayer {
    /// Secure buffer accessors.
    Buffer,
    /// Crypto engines.
    Crypto,
    /// The key store.
    KeyStore,
    /// The modern protocol boundary.
    Protocol,
    /// The legacy service boundary.
    Legacy,
}

impl TargetLayer {
    /// Every layer.
    pub const ALL: [TargetLayer; 5] = [
        Self::Buffer,
        Self::Crypto,
        Self::KeyStore,
        Self::Protocol,
        Self::Legacy,
    ];
}

/// An error from one of the [`TargetLayer`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerError {
    /// Secure buffer error.
    Buffer(BufferError),
    /// Crypto engine error.
    Crypto(CryptoError),
    /// Key store error.
    KeyStore(KeyStoreError),
    /// Protocol error.
    Protocol(ProtocolError),
    /// Legacy service error.
    Legacy(LegacyError),
}

impl LayerError {
    /// The layer the error belongs to.
    pub fn layer(&self) -> TargetLayer {
        match self {
            Self::Buffer(_) => TargetLayer::Buffer,
            Self::Crypto(_) => TargetLayer::Crypto,
            Self::KeyStore(_) => TargetLayer::KeyStore,
            Self::Protocol(_) => TargetLayer::Protocol,
            Self::Legacy(_) => TargetLayer::Legacy,
        }
    }
}

impl std::fmt::Display for LayerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buffer(e) => e.fmt(f),
            Self::Crypto(e) => e.fmt(f),
            Self::KeyStore(e) => e.fmt(f),
            Self::Protocol(e) => e.fmt(f),
            Self::Legacy(e) => e.fmt(f),
        }
    }
}

impl StdError for LayerError {}

impl From<BufferError> for LayerError {
    fn from(e: BufferError) -> Self {
        Self::Buffer(e)
    }
}

impl From<CryptoError> for LayerError {
    fn from(e: CryptoError) -> Self {
        Self::Crypto(e)
    }
}

impl From<KeyStoreError> for LayerError {
    fn from(e: KeyStoreError) -> Self {
        Self::KeyStore(e)
    }
}

impl From<ProtocolError> for LayerError {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

impl From<LegacyError> for LayerError {
    fn from(e: LegacyError) -> Self {
        Self::Legacy(e)
    }
}

/// Converts errors between layers through their canonical form.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorTranslator;

impl ErrorTranslator {
    /// Converts a layer error to its canonical form.
    pub fn to_canonical(error: &LayerError) -> CanonicalError {
        match error {
            LayerError::Buffer(e) => e.to_canonical(),
            LayerError::Crypto(e) => e.to_canonical(),
            LayerError::KeyStore(e) => e.to_canonical(),
            LayerError::Protocol(e) => e.to_canonical(),
            LayerError::Legacy(e) => e.to_canonical(),
        }
    }

    /// Rebuilds a canonical error as an error of `target`.
    pub fn from_canonical(error: &CanonicalError, target: TargetLayer) -> LayerError {
        match target {
            TargetLayer::Buffer => LayerError::Buffer(BufferError::from_canonical(error)),
            TargetLayer::Crypto => LayerError::Crypto(CryptoError::from_canonical(error)),
            TargetLayer::KeyStore => LayerError::KeyStore(KeyStoreError::from_canonical(error)),
            TargetLayer::Protocol => LayerError::Protocol(ProtocolError::from_canonical(error)),
            TargetLayer::Legacy => LayerError::Legacy(LegacyError::from_canonical(error)),
        }
    }

    /// Moves an error from its own layer to `target`.
    pub fn translate(error: &LayerError, target: TargetLayer) -> LayerError {
        Self::from_canonical(&Self::to_canonical(error), target)
    }

    /// Classifies any error.
    ///
    /// Known error types map through their layer. Anything else becomes
    /// `Unknown` carrying the error's description.
    pub fn canonicalize(error: &(dyn StdError + 'static)) -> CanonicalError {
        if let Some(e) = error.downcast_ref::<CanonicalError>() {
            return e.clone();
        }
        if let Some(e) = error.downcast_ref::<LayerError>() {
            return Self::to_canonical(e);
        }
        if let Some(e) = error.downcast_ref::<BufferError>() {
            return e.to_canonical();
        }
        if let Some(e) = error.downcast_ref::<CryptoError>() {
            return e.to_canonical();
        }
        if let Some(e) = error.downcast_ref::<KeyStoreError>() {
            return e.to_canonical();
        }
        if let Some(e) = error.downcast_ref::<ProtocolError>() {
            return e.to_canonical();
        }
        if let Some(e) = error.downcast_ref::<LegacyError>() {
            return e.to_canonical();
        }
        if let Some(e) = error.downcast_ref::<SettingsError>() {
            return CanonicalError::from(e);
        }
        if let Some(e) = error.downcast_ref::<serde_json::Error>() {
            return CanonicalError::new(ErrorKind::SerializationFailed, e.to_string());
        }
        CanonicalError::new(ErrorKind::Unknown, error.to_string())
    }
}
