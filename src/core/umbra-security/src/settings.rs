//! Service settings.
//!
//! Loaded from TOML, then overridden by environment variables:
//!
//! | Variable | Field |
//! |---|---|
//! | `UMBRA_OPERATION_TIMEOUT_SECS` | `operation_timeout_secs` |
//! | `UMBRA_STRICT_CONFIG` | `strict_config` |

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use umbra_crypto::config::{DEFAULT_ALGORITHM, DEFAULT_KEY_SIZE_BITS};

use crate::error::SettingsError;

/// Environment variable overriding `operation_timeout_secs`.
pub const ENV_OPERATION_TIMEOUT_SECS: &str = "UMBRA_OPERATION_TIMEOUT_SECS";

/// Environment variable overriding `strict_config`.
pub const ENV_STRICT_CONFIG: &str = "UMBRA_STRICT_CONFIG";

/// Argon2id cost parameters for backup encryption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupKdfSettings {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for BackupKdfSettings {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Settings for [`SecurityService`](crate::SecurityService) and the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Algorithm used when a request names none.
    pub default_algorithm: String,
    /// Key size used when a request gives none.
    pub default_key_size_bits: u32,
    /// Default per-operation timeout.
    pub operation_timeout_secs: u64,
    /// Reject malformed configuration values instead of defaulting them.
    pub strict_config: bool,
    /// Fixed hardware identifier. A random one is generated when unset.
    pub hardware_identifier: Option<String>,
    /// Backup key derivation cost.
    pub backup_kdf: BackupKdfSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_algorithm: DEFAULT_ALGORITHM.to_string(),
            default_key_size_bits: DEFAULT_KEY_SIZE_BITS,
            operation_timeout_secs: 30,
            strict_config: false,
            hardware_identifier: None,
            backup_kdf: BackupKdfSettings::default(),
        }
    }
}

impl Settings {
    /// Parses settings from TOML. Missing fields take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads a TOML file and applies environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let settings = Self::from_toml_str(&contents)?.with_env_overrides()?;
        debug!(path = %path.display(), "Settings loaded");
        Ok(settings)
    }

    /// Applies overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, SettingsError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `lookup`, which maps variable names to values.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SettingsError> {
        if let Some(value) = lookup(ENV_OPERATION_TIMEOUT_SECS) {
            self.operation_timeout_secs =
                value.trim().parse().map_err(|_| SettingsError::InvalidEnv {
                    name: ENV_OPERATION_TIMEOUT_SECS.to_string(),
                    value: value.clone(),
                })?;
        }

        if let Some(value) = lookup(ENV_STRICT_CONFIG) {
            self.strict_config = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(SettingsError::InvalidEnv {
                        name: ENV_STRICT_CONFIG.to_string(),
                        value,
                    })
                }
            };
        }

        self.validate()?;
        Ok(self)
    }

    /// Default operation timeout.
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.default_algorithm.is_empty() {
            return Err(SettingsError::Invalid(
                "default_algorithm cannot be empty".into(),
            ));
        }
        if self.default_key_size_bits == 0 || self.default_key_size_bits % 8 != 0 {
            return Err(SettingsError::Invalid(format!(
                "default_key_size_bits must be a positive multiple of 8, got {}",
                self.default_key_size_bits
            )));
        }
        if self.operation_timeout_secs == 0 {
            return Err(SettingsError::Invalid(
                "operation_timeout_secs must be > 0".into(),
            ));
        }
        Ok(())
    }
}
