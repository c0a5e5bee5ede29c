//! Boundary error types.
//!
//! [`ProtocolError`] is what callers of the protocol traits see.
//! [`LegacyError`] is what older services raise. Both convert losslessly
//! to and from [`CanonicalError`].

use thiserror::Error;
use umbra_crypto::CryptoError;
use umbra_error::{Canonical, CanonicalError, ErrorKind};
use umbra_keystore::KeyStoreError;

const TAG_INVALID_KEY_TYPE: &str = "invalid_key_type";
const TAG_NOT_IMPLEMENTED: &str = "not_implemented";
const TAG_OPERATION_FAILED: &str = "operation_failed";

const UNAUTHORIZED: &str = "unauthorized";
const INVALID_CREDENTIALS: &str = "invalid credentials";
const SESSION_EXPIRED: &str = "session expired";
const INVALID_DATA: &str = "invalid data";

/// Errors returned by protocol operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Malformed request.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// Key of the wrong type for the operation.
    #[error("invalid key type: expected {expected}, received {received}")]
    InvalidKeyType {
        /// Expected key type.
        expected: String,
        /// Key type that was supplied.
        received: String,
    },

    /// The implementation does not define the operation. Never retryable.
    #[error("operation not supported: {0}")]
    UnsupportedOperation(String),

    /// The service is temporarily unable to answer. Retryable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The service will never offer the feature. Not retryable.
    #[error("feature unavailable: {0}")]
    FeatureUnavailable(String),

    /// The operation did not complete in time.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed.
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// Signing failed.
    #[error("signature failed: {0}")]
    SignatureFailed(String),

    /// Verification could not be carried out.
    #[error("verification failed: {0}")]
    VerificationFailed(String),

    /// Key generation failed.
    #[error("key generation failed: {0}")]
    KeyGenerationFailed(String),

    /// No such key.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Key identifier already in use.
    #[error("key already exists: {0}")]
    KeyAlreadyExists(String),

    /// Caller could not be authenticated.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Caller is not allowed to do this.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Target state forbids the operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Encoding or decoding failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(String),

    /// Internal failure.
    #[error("internal error: {0}")]
    InternalError(String),

    /// Unclassified failure.
    #[error("unknown error: {0}")]
    Unknown(String),

    /// Canonical error with a non-default retry classification.
    #[error("{0}")]
    Canonical(CanonicalError),
}

impl ProtocolError {
    /// Permanent failure for an operation the implementation does not define.
    pub fn unsupported(operation: impl std::fmt::Display) -> Self {
        Self::UnsupportedOperation(operation.to_string())
    }

    /// Whether retrying may succeed.
    pub fn is_retryable(&self) -> bool {
        self.to_canonical().is_retryable()
    }
}

impl Canonical for ProtocolError {
    fn to_canonical(&self) -> CanonicalError {
        match self {
            Self::InvalidFormat(r) => CanonicalError::new(ErrorKind::InvalidInput, r.as_str()),
            Self::InvalidKeyType { expected, received } => CanonicalError::structured(
                ErrorKind::InvalidInput,
                TAG_INVALID_KEY_TYPE,
                &[("expected", expected.as_str()), ("received", received.as_str())],
            ),
            Self::UnsupportedOperation(op) => CanonicalError::not_supported(op.as_str()),
            Self::ServiceUnavailable(r) => {
                CanonicalError::transient(ErrorKind::ServiceUnavailable, r.as_str())
            }
            Self::FeatureUnavailable(r) => {
                CanonicalError::permanent(ErrorKind::ServiceUnavailable, r.as_str())
            }
            Self::Timeout(r) => CanonicalError::new(ErrorKind::Timeout, r.as_str()),
            Self::EncryptionFailed(r) => {
                CanonicalError::new(ErrorKind::EncryptionFailed, r.as_str())
            }
            Self::DecryptionFailed(r) => {
                CanonicalError::new(ErrorKind::DecryptionFailed, r.as_str())
            }
            Self::SignatureFailed(r) => CanonicalError::new(ErrorKind::SignatureFailed, r.as_str()),
            Self::VerificationFailed(r) => {
                CanonicalError::new(ErrorKind::VerificationFailed, r.as_str())
            }
            Self::KeyGenerationFailed(r) => {
                CanonicalError::new(ErrorKind::KeyGenerationFailed, r.as_str())
            }
            Self::KeyNotFound(r) => CanonicalError::new(ErrorKind::KeyNotFound, r.as_str()),
            Self::KeyAlreadyExists(r) => {
                CanonicalError::new(ErrorKind::KeyAlreadyExists, r.as_str())
            }
            Self::AuthenticationFailed(r) => {
                CanonicalError::new(ErrorKind::AuthenticationFailed, r.as_str())
            }
            Self::AccessDenied(r) => CanonicalError::new(ErrorKind::AuthorizationDenied, r.as_str()),
            Self::InvalidState(r) => CanonicalError::new(ErrorKind::InvalidState, r.as_str()),
            Self::SerializationFailed(r) => {
                CanonicalError::new(ErrorKind::SerializationFailed, r.as_str())
            }
            Self::InternalError(r) => CanonicalError::new(ErrorKind::InternalError, r.as_str()),
            Self::Unknown(r) => CanonicalError::new(ErrorKind::Unknown, r.as_str()),
            Self::Canonical(e) => e.clone(),
        }
    }

    fn from_canonical(error: &CanonicalError) -> Self {
        let reason = error.detail().to_string();

        if error.kind() == ErrorKind::ServiceUnavailable {
            return if error.is_retryable() {
                Self::ServiceUnavailable(reason)
            } else {
                Self::FeatureUnavailable(reason)
            };
        }

        if !error.has_default_retry() {
            return Self::Canonical(error.clone());
        }

        match error.kind() {
            ErrorKind::InvalidInput => {
                if let Some(fields) = error.fields(TAG_INVALID_KEY_TYPE) {
                    if let Some(values) = fields.exact(&["expected", "received"]) {
                        return Self::InvalidKeyType {
                            expected: values[0].to_string(),
                            received: values[1].to_string(),
                        };
                    }
                }
                Self::InvalidFormat(reason)
            }
            ErrorKind::OperationNotSupported => Self::UnsupportedOperation(reason),
            ErrorKind::Timeout => Self::Timeout(reason),
            ErrorKind::EncryptionFailed => Self::EncryptionFailed(reason),
            ErrorKind::DecryptionFailed => Self::DecryptionFailed(reason),
            ErrorKind::SignatureFailed => Self::SignatureFailed(reason),
            ErrorKind::VerificationFailed => Self::VerificationFailed(reason),
            ErrorKind::KeyGenerationFailed => Self::KeyGenerationFailed(reason),
            ErrorKind::KeyNotFound => Self::KeyNotFound(reason),
            ErrorKind::KeyAlreadyExists => Self::KeyAlreadyExists(reason),
            ErrorKind::AuthenticationFailed => Self::AuthenticationFailed(reason),
            ErrorKind::AuthorizationDenied => Self::AccessDenied(reason),
            ErrorKind::InvalidState => Self::InvalidState(reason),
            ErrorKind::SerializationFailed => Self::SerializationFailed(reason),
            ErrorKind::InternalError => Self::InternalError(reason),
            ErrorKind::Unknown => Self::Unknown(reason),
            ErrorKind::ServiceUnavailable => Self::ServiceUnavailable(reason),
        }
    }
}

impl From<CanonicalError> for ProtocolError {
    fn from(error: CanonicalError) -> Self {
        Self::from_canonical(&error)
    }
}

impl From<CryptoError> for ProtocolError {
    fn from(error: CryptoError) -> Self {
        Self::from_canonical(&error.to_canonical())
    }
}

impl From<KeyStoreError> for ProtocolError {
    fn from(error: KeyStoreError) -> Self {
        Self::from_canonical(&error.to_canonical())
    }
}

impl From<LegacyError> for ProtocolError {
    fn from(error: LegacyError) -> Self {
        Self::from_canonical(&error.to_canonical())
    }
}

/// Errors raised by legacy services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LegacyError {
    /// No credentials were presented.
    #[error("unauthorized")]
    Unauthorized,

    /// Credentials were presented but lack the permission.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Credentials were rejected.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The session has expired.
    #[error("session expired")]
    SessionExpired,

    /// The legacy service never implemented this feature.
    #[error("not implemented: {feature}")]
    NotImplemented {
        /// Feature name.
        feature: String,
    },

    /// The request payload was rejected.
    #[error("invalid data")]
    InvalidData,

    /// The operation ran and failed.
    #[error("operation failed: {reason}")]
    OperationFailed {
        /// Failure description.
        reason: String,
    },

    /// Any other failure.
    #[error("{0}")]
    General(String),

    /// An error from another layer carried through unchanged.
    #[error("{0}")]
    Canonical(CanonicalError),
}

impl Canonical for LegacyError {
    fn to_canonical(&self) -> CanonicalError {
        match self {
            Self::Unauthorized => CanonicalError::new(ErrorKind::AuthenticationFailed, UNAUTHORIZED),
            Self::AccessDenied(reason) => {
                CanonicalError::new(ErrorKind::AuthorizationDenied, reason.as_str())
            }
            Self::InvalidCredentials => {
                CanonicalError::new(ErrorKind::AuthenticationFailed, INVALID_CREDENTIALS)
            }
            Self::SessionExpired => {
                CanonicalError::new(ErrorKind::AuthenticationFailed, SESSION_EXPIRED)
            }
            Self::NotImplemented { feature } => CanonicalError::structured(
                ErrorKind::OperationNotSupported,
                TAG_NOT_IMPLEMENTED,
                &[("feature", feature.as_str())],
            ),
            Self::InvalidData => CanonicalError::new(ErrorKind::InvalidInput, INVALID_DATA),
            Self::OperationFailed { reason } => CanonicalError::new(
                ErrorKind::InternalError,
                umbra_error::detail::tagged(TAG_OPERATION_FAILED, reason),
            ),
            Self::General(reason) => CanonicalError::new(ErrorKind::InternalError, reason.as_str()),
            Self::Canonical(e) => e.clone(),
        }
    }

    fn from_canonical(error: &CanonicalError) -> Self {
        if !error.has_default_retry() {
            return Self::Canonical(error.clone());
        }

        let detail = error.detail();
        match error.kind() {
            ErrorKind::AuthenticationFailed => match detail {
                UNAUTHORIZED => Self::Unauthorized,
                INVALID_CREDENTIALS => Self::InvalidCredentials,
                SESSION_EXPIRED => Self::SessionExpired,
                _ => Self::Canonical(error.clone()),
            },
            ErrorKind::AuthorizationDenied => Self::AccessDenied(detail.to_string()),
            ErrorKind::OperationNotSupported => error
                .fields(TAG_NOT_IMPLEMENTED)
                .and_then(|fields| {
                    fields.exact(&["feature"]).map(|values| Self::NotImplemented {
                        feature: values[0].to_string(),
                    })
                })
                .unwrap_or_else(|| Self::Canonical(error.clone())),
            ErrorKind::InvalidInput if detail == INVALID_DATA => Self::InvalidData,
            ErrorKind::InternalError => match error.tagged_text(TAG_OPERATION_FAILED) {
                Some(reason) => Self::OperationFailed {
                    reason: reason.to_string(),
                },
                None => Self::General(detail.to_string()),
            },
            _ => Self::Canonical(error.clone()),
        }
    }
}
