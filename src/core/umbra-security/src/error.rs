//! Settings error types.

use thiserror::Error;
use umbra_error::{CanonicalError, ErrorKind};

/// Errors raised while loading [`Settings`](crate::Settings).
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings file {path}: {source}")]
    Read {
        /// File path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for [`Settings`](crate::Settings).
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment override could not be parsed.
    #[error("invalid value for {name}: {value}")]
    InvalidEnv {
        /// Variable name.
        name: String,
        /// Rejected value.
        value: String,
    },

    /// A value is out of range.
    #[error("invalid settings: {0}")]
    Invalid(String),
}

impl From<&SettingsError> for CanonicalError {
    fn from(error: &SettingsError) -> Self {
        let kind = match error {
            SettingsError::Parse(_) => ErrorKind::SerializationFailed,
            SettingsError::Read { .. } => ErrorKind::ServiceUnavailable,
            SettingsError::InvalidEnv { .. } | SettingsError::Invalid(_) => ErrorKind::InvalidInput,
        };
        CanonicalError::permanent(kind, error.to_string())
    }
}
