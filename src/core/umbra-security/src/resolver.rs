//! Building an [`OperationConfig`] from loosely typed key/value pairs.

use std::collections::BTreeMap;

use tracing::debug;
use umbra_crypto::OperationConfig;
use umbra_error::CanonicalError;

use crate::settings::Settings;

/// Key naming the algorithm.
pub const ALGORITHM_KEY: &str = "algorithm";

/// Key naming the key size in bits.
pub const KEY_SIZE_KEY: &str = "keySizeInBits";

/// Fills in defaults for partial configurations.
///
/// `algorithm` and `keySizeInBits` are consumed; every other pair is copied
/// into the options verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigResolver {
    default_algorithm: String,
    default_key_size_bits: u32,
    strict: bool,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl ConfigResolver {
    /// A resolver using the defaults and strictness from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            default_algorithm: settings.default_algorithm.clone(),
            default_key_size_bits: settings.default_key_size_bits,
            strict: settings.strict_config,
        }
    }

    /// Whether [`resolve_configured`](Self::resolve_configured) is strict.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Resolves leniently: a non-numeric key size falls back to the default.
    pub fn resolve(&self, partial: Option<&BTreeMap<String, String>>) -> OperationConfig {
        let mut algorithm = self.default_algorithm.clone();
        let mut key_size_bits = self.default_key_size_bits;
        let mut options = BTreeMap::new();

        for (key, value) in partial.into_iter().flatten() {
            match key.as_str() {
                ALGORITHM_KEY => algorithm = value.clone(),
                KEY_SIZE_KEY => match value.trim().parse() {
                    Ok(bits) => key_size_bits = bits,
                    Err(_) => {
                        debug!(value = %value, "Ignoring non-numeric key size");
                    }
                },
                _ => {
                    options.insert(key.clone(), value.clone());
                }
            }
        }

        debug!(algorithm = %algorithm, key_size_bits, "Configuration resolved");

        OperationConfig::from_parts(algorithm, key_size_bits, options)
    }

    /// Resolves strictly: an empty algorithm or a non-numeric or zero key
    /// size is `InvalidInput`.
    pub fn resolve_strict(
        &self,
        partial: Option<&BTreeMap<String, String>>,
    ) -> Result<OperationConfig, CanonicalError> {
        if let Some(partial) = partial {
            if let Some(algorithm) = partial.get(ALGORITHM_KEY) {
                if algorithm.trim().is_empty() {
                    return Err(CanonicalError::invalid_input("algorithm cannot be empty"));
                }
            }
            if let Some(value) = partial.get(KEY_SIZE_KEY) {
                match value.trim().parse::<u32>() {
                    Ok(bits) if bits > 0 => {}
                    _ => {
                        return Err(CanonicalError::invalid_input(format!(
                            "{} must be a positive integer, got {:?}",
                            KEY_SIZE_KEY, value
                        )))
                    }
                }
            }
        }
        Ok(self.resolve(partial))
    }

    /// Resolves with the strictness chosen in the settings.
    pub fn resolve_configured(
        &self,
        partial: Option<&BTreeMap<String, String>>,
    ) -> Result<OperationConfig, CanonicalError> {
        if self.strict {
            self.resolve_strict(partial)
        } else {
            Ok(self.resolve(partial))
        }
    }
}
