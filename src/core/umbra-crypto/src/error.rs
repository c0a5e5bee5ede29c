//! Cryptographic and secure-buffer error types.

use thiserror::Error;
use umbra_error::{detail, Canonical, CanonicalError, ErrorKind};

const TAG_INVALID_KEY: &str = "invalid_key";
const TAG_INVALID_KEY_TYPE: &str = "invalid_key_type";
const TAG_UNSUPPORTED_ALGORITHM: &str = "unsupported_algorithm";
const TAG_OUT_OF_RANGE: &str = "out_of_range";
const TAG_LENGTH_MISMATCH: &str = "length_mismatch";

/// Errors raised by [`SecureBuffer`](crate::SecureBuffer) accessors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    /// Index access outside the buffer.
    #[error("index {index} out of range for buffer of length {len}")]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Buffer length.
        len: usize,
    },

    /// A buffer of a different length was expected.
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// An error from another layer carried through unchanged.
    #[error("{0}")]
    Canonical(CanonicalError),
}

impl BufferError {
    fn from_structured(error: &CanonicalError) -> Option<Self> {
        if error.kind() != ErrorKind::InvalidInput || !error.has_default_retry() {
            return None;
        }

        if let Some(fields) = error.fields(TAG_OUT_OF_RANGE) {
            fields.exact(&["index", "len"])?;
            return Some(Self::OutOfRange {
                index: fields.number("index")?,
                len: fields.number("len")?,
            });
        }

        let fields = error.fields(TAG_LENGTH_MISMATCH)?;
        fields.exact(&["expected", "actual"])?;
        Some(Self::LengthMismatch {
            expected: fields.number("expected")?,
            actual: fields.number("actual")?,
        })
    }
}

impl Canonical for BufferError {
    fn to_canonical(&self) -> CanonicalError {
        match self {
            Self::OutOfRange { index, len } => CanonicalError::structured(
                ErrorKind::InvalidInput,
                TAG_OUT_OF_RANGE,
                &[
                    ("index", index.to_string().as_str()),
                    ("len", len.to_string().as_str()),
                ],
            ),
            Self::LengthMismatch { expected, actual } => CanonicalError::structured(
                ErrorKind::InvalidInput,
                TAG_LENGTH_MISMATCH,
                &[
                    ("expected", expected.to_string().as_str()),
                    ("actual", actual.to_string().as_str()),
                ],
            ),
            Self::Canonical(error) => error.clone(),
        }
    }

    fn from_canonical(error: &CanonicalError) -> Self {
        Self::from_structured(error).unwrap_or_else(|| Self::Canonical(error.clone()))
    }
}

/// Errors that can occur during cryptographic operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Key generation failed.
    #[error("key generation failed: {0}")]
    KeyGenerationFailed(String),

    /// Encryption failed.
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed.
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// Signature creation failed.
    #[error("signature creation failed: {0}")]
    SignatureFailed(String),

    /// Signature verification could not be performed.
    ///
    /// A signature that simply does not match is not an error.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Invalid key format or size.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Key of the wrong type for the requested operation.
    #[error("invalid key type: expected {expected}, received {received}")]
    InvalidKeyType {
        /// Expected key type.
        expected: String,
        /// Key type that was supplied.
        received: String,
    },

    /// Invalid input data.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The engine does not implement the requested algorithm.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Secure buffer error.
    #[error("buffer error: {0}")]
    Buffer(#[from] BufferError),

    /// An error from another layer carried through unchanged.
    #[error("{0}")]
    Canonical(CanonicalError),
}

impl Canonical for CryptoError {
    fn to_canonical(&self) -> CanonicalError {
        match self {
            Self::KeyGenerationFailed(reason) => {
                CanonicalError::new(ErrorKind::KeyGenerationFailed, reason.as_str())
            }
            Self::EncryptionFailed(reason) => {
                CanonicalError::new(ErrorKind::EncryptionFailed, reason.as_str())
            }
            Self::DecryptionFailed(reason) => {
                CanonicalError::new(ErrorKind::DecryptionFailed, reason.as_str())
            }
            Self::SignatureFailed(reason) => {
                CanonicalError::new(ErrorKind::SignatureFailed, reason.as_str())
            }
            Self::VerificationFailed(reason) => {
                CanonicalError::new(ErrorKind::VerificationFailed, reason.as_str())
            }
            Self::InvalidKey(reason) => CanonicalError::new(
                ErrorKind::InvalidInput,
                detail::tagged(TAG_INVALID_KEY, reason),
            ),
            Self::InvalidKeyType { expected, received } => CanonicalError::structured(
                ErrorKind::InvalidInput,
                TAG_INVALID_KEY_TYPE,
                &[("expected", expected.as_str()), ("received", received.as_str())],
            ),
            Self::InvalidInput(reason) => {
                CanonicalError::new(ErrorKind::InvalidInput, reason.as_str())
            }
            Self::UnsupportedAlgorithm(name) => CanonicalError::new(
                ErrorKind::OperationNotSupported,
                detail::tagged(TAG_UNSUPPORTED_ALGORITHM, name),
            ),
            Self::Buffer(e) => e.to_canonical(),
            Self::Canonical(e) => e.clone(),
        }
    }

    fn from_canonical(error: &CanonicalError) -> Self {
        if !error.has_default_retry() {
            return Self::Canonical(error.clone());
        }

        let reason = error.detail().to_string();
        match error.kind() {
            ErrorKind::KeyGenerationFailed => Self::KeyGenerationFailed(reason),
            ErrorKind::EncryptionFailed => Self::EncryptionFailed(reason),
            ErrorKind::DecryptionFailed => Self::DecryptionFailed(reason),
            ErrorKind::SignatureFailed => Self::SignatureFailed(reason),
            ErrorKind::VerificationFailed => Self::VerificationFailed(reason),
            ErrorKind::InvalidInput => {
                if let Some(fields) = error.fields(TAG_INVALID_KEY_TYPE) {
                    if let Some(values) = fields.exact(&["expected", "received"]) {
                        return Self::InvalidKeyType {
                            expected: values[0].to_string(),
                            received: values[1].to_string(),
                        };
                    }
                }
                if let Some(text) = error.tagged_text(TAG_INVALID_KEY) {
                    return Self::InvalidKey(text.to_string());
                }
                if let Some(buffer) = BufferError::from_structured(error) {
                    return Self::Buffer(buffer);
                }
                Self::InvalidInput(reason)
            }
            ErrorKind::OperationNotSupported => match error.tagged_text(TAG_UNSUPPORTED_ALGORITHM)
            {
                Some(name) => Self::UnsupportedAlgorithm(name.to_string()),
                None => Self::Canonical(error.clone()),
            },
            _ => Self::Canonical(error.clone()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_key_type_survives_round_trip() {
        let original = CryptoError::InvalidKeyType {
            expected: "symmetric".into(),
            received: "signing".into(),
        };
        let canonical = original.to_canonical();
        assert_eq!(canonical.kind(), ErrorKind::InvalidInput);
        assert_eq!(
            canonical.detail(),
            "invalid_key_type: expected=symmetric;received=signing"
        );
        assert_eq!(CryptoError::from_canonical(&canonical), original);
    }

    #[test]
    fn test_buffer_error_survives_round_trip() {
        let original = CryptoError::Buffer(BufferError::OutOfRange { index: 9, len: 4 });
        let canonical = original.to_canonical();
        assert_eq!(CryptoError::from_canonical(&canonical), original);
    }

    #[test]
    fn test_unsupported_algorithm_is_permanent() {
        let canonical = CryptoError::UnsupportedAlgorithm("RSA-OAEP".into()).to_canonical();
        assert_eq!(canonical.kind(), ErrorKind::OperationNotSupported);
        assert!(!canonical.is_retryable());
        assert!(canonical.detail().contains("RSA-OAEP"));
    }

    #[test]
    fn test_every_kind_round_trips_through_crypto_layer() {
        for kind in ErrorKind::ALL {
            let canonical = CanonicalError::new(kind, "reason text");
            let native = CryptoError::from_canonical(&canonical);
            assert_eq!(native.to_canonical(), canonical, "kind {kind}");
        }
    }

    #[test]
    fn test_every_kind_round_trips_through_buffer_layer() {
        for kind in ErrorKind::ALL {
            let canonical = CanonicalError::new(kind, "reason text");
            let native = BufferError::from_canonical(&canonical);
            assert_eq!(native.to_canonical(), canonical, "kind {kind}");
        }
    }

    #[test]
    fn test_non_default_retry_is_preserved() {
        let canonical = CanonicalError::permanent(ErrorKind::Timeout, "gave up");
        let native = CryptoError::from_canonical(&canonical);
        assert_eq!(native.to_canonical(), canonical);
    }
}
