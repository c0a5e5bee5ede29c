//! KeyStore error types.

use thiserror::Error;
use umbra_crypto::CryptoError;
use umbra_error::{detail, Canonical, CanonicalError, ErrorKind};

const TAG_IDENTIFIER_RETIRED: &str = "identifier_retired";
const TAG_INVALID_IDENTIFIER: &str = "invalid_identifier";

/// Errors that can occur in the KeyStore.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyStoreError {
    /// No live key under the identifier.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// The identifier is already taken.
    #[error("key already exists: {0}")]
    KeyAlreadyExists(String),

    /// The identifier belongs to a deleted key and cannot be reused.
    #[error("identifier retired: {0}")]
    IdentifierRetired(String),

    /// Malformed identifier.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Engine failure while producing or using material.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// An error from another layer carried through unchanged.
    #[error("{0}")]
    Canonical(CanonicalError),
}

impl Canonical for KeyStoreError {
    fn to_canonical(&self) -> CanonicalError {
        match self {
            Self::KeyNotFound(id) => CanonicalError::new(ErrorKind::KeyNotFound, id.as_str()),
            Self::KeyAlreadyExists(id) => {
                CanonicalError::new(ErrorKind::KeyAlreadyExists, id.as_str())
            }
            Self::IdentifierRetired(id) => CanonicalError::new(
                ErrorKind::InvalidState,
                detail::tagged(TAG_IDENTIFIER_RETIRED, id),
            ),
            Self::InvalidIdentifier(reason) => CanonicalError::new(
                ErrorKind::InvalidInput,
                detail::tagged(TAG_INVALID_IDENTIFIER, reason),
            ),
            Self::Crypto(e) => e.to_canonical(),
            Self::Canonical(e) => e.clone(),
        }
    }

    fn from_canonical(error: &CanonicalError) -> Self {
        if !error.has_default_retry() {
            return Self::Canonical(error.clone());
        }

        let reason = error.detail().to_string();
        match error.kind() {
            ErrorKind::KeyNotFound => Self::KeyNotFound(reason),
            ErrorKind::KeyAlreadyExists => Self::KeyAlreadyExists(reason),
            ErrorKind::InvalidState => match error.tagged_text(TAG_IDENTIFIER_RETIRED) {
                Some(id) => Self::IdentifierRetired(id.to_string()),
                None => Self::Canonical(error.clone()),
            },
            ErrorKind::InvalidInput => match error.tagged_text(TAG_INVALID_IDENTIFIER) {
                Some(text) => Self::InvalidIdentifier(text.to_string()),
                None => Self::Crypto(CryptoError::from_canonical(error)),
            },
            ErrorKind::EncryptionFailed
            | ErrorKind::DecryptionFailed
            | ErrorKind::SignatureFailed
            | ErrorKind::VerificationFailed
            | ErrorKind::KeyGenerationFailed
            | ErrorKind::OperationNotSupported => Self::Crypto(CryptoError::from_canonical(error)),
            _ => Self::Canonical(error.clone()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_keeps_identifier() {
        let canonical = KeyStoreError::KeyNotFound("payments".into()).to_canonical();
        assert_eq!(canonical.kind(), ErrorKind::KeyNotFound);
        assert_eq!(canonical.detail(), "payments");
        assert_eq!(
            KeyStoreError::from_canonical(&canonical),
            KeyStoreError::KeyNotFound("payments".into())
        );
    }

    #[test]
    fn test_retired_identifier_is_invalid_state() {
        let original = KeyStoreError::IdentifierRetired("old".into());
        let canonical = original.to_canonical();
        assert_eq!(canonical.kind(), ErrorKind::InvalidState);
        assert_eq!(KeyStoreError::from_canonical(&canonical), original);
    }

    #[test]
    fn test_crypto_errors_pass_through() {
        let original = KeyStoreError::Crypto(CryptoError::DecryptionFailed("tag".into()));
        let canonical = original.to_canonical();
        assert_eq!(canonical.kind(), ErrorKind::DecryptionFailed);
        assert_eq!(KeyStoreError::from_canonical(&canonical), original);
    }

    #[test]
    fn test_every_kind_round_trips() {
        for kind in ErrorKind::ALL {
            for detail in ["reason text", "identifier_retired: x", "invalid_key: short"] {
                let canonical = CanonicalError::new(kind, detail);
                let native = KeyStoreError::from_canonical(&canonical);
                assert_eq!(native.to_canonical(), canonical, "kind {kind}");
            }
        }
    }
}
