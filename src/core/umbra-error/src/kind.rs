//! Canonical error kinds.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The closed set of canonical error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// The caller supplied missing or malformed input.
    InvalidInput,
    /// Encryption failed inside the engine.
    EncryptionFailed,
    /// Decryption failed inside the engine.
    DecryptionFailed,
    /// Signature creation failed.
    SignatureFailed,
    /// Signature verification could not be carried out.
    VerificationFailed,
    /// Key material could not be generated.
    KeyGenerationFailed,
    /// No key exists under the requested identifier.
    KeyNotFound,
    /// A key already exists under the requested identifier.
    KeyAlreadyExists,
    /// The caller could not be authenticated.
    AuthenticationFailed,
    /// The caller is not allowed to perform the operation.
    AuthorizationDenied,
    /// The operation did not finish in time.
    Timeout,
    /// The service cannot currently serve the request.
    ServiceUnavailable,
    /// The operation is not supported by this implementation.
    OperationNotSupported,
    /// The target is in a state that forbids the operation.
    InvalidState,
    /// Data could not be serialized or deserialized.
    SerializationFailed,
    /// An internal invariant failed.
    InternalError,
    /// An error that no layer could classify.
    Unknown,
}

impl ErrorKind {
    /// Every kind, in declaration order.
    pub const ALL: [ErrorKind; 17] = [
        ErrorKind::InvalidInput,
        ErrorKind::EncryptionFailed,
        ErrorKind::DecryptionFailed,
        ErrorKind::SignatureFailed,
        ErrorKind::VerificationFailed,
        ErrorKind::KeyGenerationFailed,
        ErrorKind::KeyNotFound,
        ErrorKind::KeyAlreadyExists,
        ErrorKind::AuthenticationFailed,
        ErrorKind::AuthorizationDenied,
        ErrorKind::Timeout,
        ErrorKind::ServiceUnavailable,
        ErrorKind::OperationNotSupported,
        ErrorKind::InvalidState,
        ErrorKind::SerializationFailed,
        ErrorKind::InternalError,
        ErrorKind::Unknown,
    ];

    /// Stable camelCase name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalidInput",
            Self::EncryptionFailed => "encryptionFailed",
            Self::DecryptionFailed => "decryptionFailed",
            Self::SignatureFailed => "signatureFailed",
            Self::VerificationFailed => "verificationFailed",
            Self::KeyGenerationFailed => "keyGenerationFailed",
            Self::KeyNotFound => "keyNotFound",
            Self::KeyAlreadyExists => "keyAlreadyExists",
            Self::AuthenticationFailed => "authenticationFailed",
            Self::AuthorizationDenied => "authorizationDenied",
            Self::Timeout => "timeout",
            Self::ServiceUnavailable => "serviceUnavailable",
            Self::OperationNotSupported => "operationNotSupported",
            Self::InvalidState => "invalidState",
            Self::SerializationFailed => "serializationFailed",
            Self::InternalError => "internalError",
            Self::Unknown => "unknown",
        }
    }

    /// Stable numeric code reported in operation results.
    pub fn code(self) -> u32 {
        match self {
            Self::InvalidInput => 1001,
            Self::EncryptionFailed => 1101,
            Self::DecryptionFailed => 1102,
            Self::SignatureFailed => 1103,
            Self::VerificationFailed => 1104,
            Self::KeyGenerationFailed => 1201,
            Self::KeyNotFound => 1202,
            Self::KeyAlreadyExists => 1203,
            Self::AuthenticationFailed => 1301,
            Self::AuthorizationDenied => 1302,
            Self::Timeout => 1401,
            Self::ServiceUnavailable => 1402,
            Self::OperationNotSupported => 1501,
            Self::InvalidState => 1502,
            Self::SerializationFailed => 1601,
            Self::InternalError => 1901,
            Self::Unknown => 1999,
        }
    }

    /// Whether an error of this kind is worth retrying unless stated otherwise.
    pub fn retryable_by_default(self) -> bool {
        matches!(self, Self::Timeout | Self::ServiceUnavailable)
    }

    /// Message used when an error of this kind carries no reason text.
    pub fn default_detail(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid input",
            Self::EncryptionFailed => "encryption failed",
            Self::DecryptionFailed => "decryption failed",
            Self::SignatureFailed => "signature creation failed",
            Self::VerificationFailed => "signature verification failed",
            Self::KeyGenerationFailed => "key generation failed",
            Self::KeyNotFound => "key not found",
            Self::KeyAlreadyExists => "key already exists",
            Self::AuthenticationFailed => "authentication failed",
            Self::AuthorizationDenied => "authorization denied",
            Self::Timeout => "operation timed out",
            Self::ServiceUnavailable => "service unavailable",
            Self::OperationNotSupported => "operation not supported",
            Self::InvalidState => "invalid state",
            Self::SerializationFailed => "serialization failed",
            Self::InternalError => "internal error",
            Self::Unknown => "unknown error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ErrorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown error kind: {s}"))
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_are_unique() {
        let codes: HashSet<u32> = ErrorKind::ALL.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), ErrorKind::ALL.len());
    }

    #[test]
    fn test_name_parses_back() {
        for kind in ErrorKind::ALL {
            assert_eq!(kind.name().parse::<ErrorKind>().unwrap(), kind);
        }
        assert!("noSuchKind".parse::<ErrorKind>().is_err());
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let json = serde_json::to_string(&ErrorKind::OperationNotSupported).unwrap();
        assert_eq!(json, "\"operationNotSupported\"");
    }

    #[test]
    fn test_only_transient_kinds_are_retryable() {
        let retryable: Vec<ErrorKind> = ErrorKind::ALL
            .into_iter()
            .filter(|k| k.retryable_by_default())
            .collect();
        assert_eq!(
            retryable,
            vec![ErrorKind::Timeout, ErrorKind::ServiceUnavailable]
        );
    }
}
