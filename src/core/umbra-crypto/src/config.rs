//! Immutable per-operation configuration.

use std::collections::BTreeMap;

/// Algorithm used when a configuration does not name one.
pub const DEFAULT_ALGORITHM: &str = "AES-GCM";

/// Key size used when a configuration does not give one.
pub const DEFAULT_KEY_SIZE_BITS: u32 = 256;

/// Well-known option keys.
pub mod options {
    /// Base64-encoded associated data for AEAD operations.
    pub const ASSOCIATED_DATA: &str = "associatedData";
    /// Identifier of the key an operation should use.
    pub const KEY_IDENTIFIER: &str = "keyIdentifier";
    /// Digest algorithm for hashing (`SHA-256`, `SHA-384`, `SHA-512`).
    pub const DIGEST: &str = "digest";
}

/// Algorithm, key size and free-form options for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationConfig {
    algorithm: String,
    key_size_bits: u32,
    options: BTreeMap<String, String>,
}

impl OperationConfig {
    /// Creates a configuration without options.
    pub fn new(algorithm: impl Into<String>, key_size_bits: u32) -> Self {
        Self {
            algorithm: algorithm.into(),
            key_size_bits,
            options: BTreeMap::new(),
        }
    }

    /// Creates a configuration from all of its parts.
    pub fn from_parts(
        algorithm: impl Into<String>,
        key_size_bits: u32,
        options: BTreeMap<String, String>,
    ) -> Self {
        Self {
            algorithm: algorithm.into(),
            key_size_bits,
            options,
        }
    }

    /// Returns a copy of this configuration with one more option.
    #[must_use]
    pub fn with_option(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.options.insert(key.into(), value.into());
        next
    }

    /// Returns a copy of this configuration using another algorithm.
    #[must_use]
    pub fn with_algorithm(&self, algorithm: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.algorithm = algorithm.into();
        next
    }

    /// Returns a copy of this configuration using another key size.
    #[must_use]
    pub fn with_key_size_bits(&self, key_size_bits: u32) -> Self {
        let mut next = self.clone();
        next.key_size_bits = key_size_bits;
        next
    }

    /// Algorithm name.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Key size in bits.
    pub fn key_size_bits(&self) -> u32 {
        self.key_size_bits
    }

    /// All options.
    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }

    /// A single option by key.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Key size in whole bytes, if the bit count is a positive multiple of 8.
    pub fn key_size_bytes(&self) -> Option<usize> {
        (self.key_size_bits > 0 && self.key_size_bits % 8 == 0)
            .then(|| (self.key_size_bits / 8) as usize)
    }
}

impl Default for OperationConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ALGORITHM, DEFAULT_KEY_SIZE_BITS)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = OperationConfig::default();
        assert_eq!(config.algorithm(), "AES-GCM");
        assert_eq!(config.key_size_bits(), 256);
        assert!(config.options().is_empty());
    }

    #[test]
    fn test_with_option_leaves_original_untouched() {
        let base = OperationConfig::default();
        let extended = base.with_option(options::DIGEST, "SHA-512");
        assert_eq!(base.option(options::DIGEST), None);
        assert_eq!(extended.option(options::DIGEST), Some("SHA-512"));
    }

    #[test]
    fn test_key_size_bytes() {
        assert_eq!(OperationConfig::new("AES-GCM", 256).key_size_bytes(), Some(32));
        assert_eq!(OperationConfig::new("AES-GCM", 0).key_size_bytes(), None);
        assert_eq!(OperationConfig::new("AES-GCM", 12).key_size_bytes(), None);
    }
}
