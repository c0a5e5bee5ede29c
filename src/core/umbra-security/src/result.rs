//! Dispatch outcomes.

use umbra_crypto::SecureBuffer;
use umbra_error::{CanonicalError, ErrorKind};

/// What a successful operation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Nothing (store, delete).
    Empty,
    /// Bytes (ciphertext, plaintext, digest, signature, key material).
    Bytes(SecureBuffer),
    /// Outcome of a signature check.
    Verified(bool),
    /// Identifier of a generated key.
    Identifier(String),
    /// New material and, when requested, re-encrypted data.
    Rotated {
        /// Material now stored under the identifier.
        material: SecureBuffer,
        /// Caller data re-encrypted under `material`.
        reencrypted: Option<SecureBuffer>,
    },
}

/// Outcome of one dispatch: either a payload or an error, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// The operation succeeded.
    Success(Payload),
    /// The operation failed.
    Failure(CanonicalError),
}

impl OperationResult {
    /// Whether the operation succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The payload of a success.
    pub fn data(&self) -> Option<&Payload> {
        match self {
            Self::Success(payload) => Some(payload),
            Self::Failure(_) => None,
        }
    }

    /// The bytes of a success carrying bytes.
    pub fn bytes(&self) -> Option<&SecureBuffer> {
        match self.data() {
            Some(Payload::Bytes(bytes)) => Some(bytes),
            _ => None,
        }
    }

    /// The error of a failure.
    pub fn error(&self) -> Option<&CanonicalError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// The error kind of a failure.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error().map(CanonicalError::kind)
    }

    /// The numeric code of a failure.
    pub fn error_code(&self) -> Option<u32> {
        self.error().map(|e| e.kind().code())
    }

    /// The reason text of a failure.
    pub fn error_message(&self) -> Option<&str> {
        self.error().map(CanonicalError::detail)
    }

    /// Converts into a standard `Result`.
    pub fn into_result(self) -> Result<Payload, CanonicalError> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::Failure(error) => Err(error),
        }
    }
}

impl From<Result<Payload, CanonicalError>> for OperationResult {
    fn from(result: Result<Payload, CanonicalError>) -> Self {
        match result {
            Ok(payload) => Self::Success(payload),
            Err(error) => Self::Failure(error),
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_success_has_no_error_fields() {
        let result = OperationResult::Success(Payload::Verified(false));
        assert!(result.is_success());
        assert_eq!(result.data(), Some(&Payload::Verified(false)));
        assert_eq!(result.error_code(), None);
        assert_eq!(result.error_message(), None);
    }

    #[test]
    fn test_failure_has_no_data() {
        let result = OperationResult::Failure(CanonicalError::new(ErrorKind::KeyNotFound, "k"));
        assert!(!result.is_success());
        assert_eq!(result.data(), None);
        assert_eq!(result.error_code(), Some(ErrorKind::KeyNotFound.code()));
        assert_eq!(result.error_message(), Some("k"));
    }
}
