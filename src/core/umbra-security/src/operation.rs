//! The operations the dispatcher understands.

use std::convert::Infallible;
use std::str::FromStr;

/// A security operation tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SecurityOperation {
    /// Fill a buffer with CSPRNG output.
    RandomGeneration,
    /// Encrypt with a symmetric key.
    SymmetricEncryption,
    /// Decrypt with a symmetric key.
    SymmetricDecryption,
    /// Encrypt to a public key.
    AsymmetricEncryption,
    /// Decrypt with a private key.
    AsymmetricDecryption,
    /// Compute a digest.
    Hashing,
    /// Sign data.
    SignatureGeneration,
    /// Check a signature.
    SignatureVerification,
    /// Create a key in the store.
    KeyGeneration,
    /// Put caller material in the store.
    KeyStorage,
    /// Read material from the store.
    KeyRetrieval,
    /// Replace a key's material.
    KeyRotation,
    /// Delete a key.
    KeyDeletion,
    /// An operation this crate has no built-in meaning for.
    Custom(String),
}

impl SecurityOperation {
    /// Every built-in operation.
    pub const BUILT_IN: [SecurityOperation; 13] = [
        Self::RandomGeneration,
        Self::SymmetricEncryption,
        Self::SymmetricDecryption,
        Self::AsymmetricEncryption,
        Self::AsymmetricDecryption,
        Self::Hashing,
        Self::SignatureGeneration,
        Self::SignatureVerification,
        Self::KeyGeneration,
        Self::KeyStorage,
        Self::KeyRetrieval,
        Self::KeyRotation,
        Self::KeyDeletion,
    ];

    /// Stable camelCase name used in errors and logs.
    pub fn name(&self) -> &str {
        match self {
            Self::RandomGeneration => "randomGeneration",
            Self::SymmetricEncryption => "symmetricEncryption",
            Self::SymmetricDecryption => "symmetricDecryption",
            Self::AsymmetricEncryption => "asymmetricEncryption",
            Self::AsymmetricDecryption => "asymmetricDecryption",
            Self::Hashing => "hashing",
            Self::SignatureGeneration => "signatureGeneration",
            Self::SignatureVerification => "signatureVerification",
            Self::KeyGeneration => "keyGeneration",
            Self::KeyStorage => "keyStorage",
            Self::KeyRetrieval => "keyRetrieval",
            Self::KeyRotation => "keyRotation",
            Self::KeyDeletion => "keyDeletion",
            Self::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for SecurityOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SecurityOperation {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::BUILT_IN
            .iter()
            .find(|op| op.name() == s)
            .cloned()
            .unwrap_or_else(|| Self::Custom(s.to_string())))
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_names_parse_back() {
        for op in SecurityOperation::BUILT_IN {
            assert_eq!(op.name().parse::<SecurityOperation>().unwrap(), op);
        }
    }

    #[test]
    fn test_unknown_name_is_custom() {
        let op: SecurityOperation = "quantumTeleport".parse().unwrap();
        assert_eq!(op, SecurityOperation::Custom("quantumTeleport".into()));
        assert_eq!(op.to_string(), "quantumTeleport");
    }
}
