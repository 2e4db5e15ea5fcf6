//! Errors surfaced while loading and validating configuration

use thiserror::Error;

/// Error produced by the configuration loader and validators
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required configuration file is missing
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// A value failed a semantic check
    #[error("invalid configuration: {field}: {message}")]
    ValidationError {
        /// Dotted path of the offending setting, e.g. `database.url`
        field: String,
        /// What was wrong with the value
        message: String,
    },

    /// Conflicting override sources were given at once
    #[error("conflicting configuration sources: {0}")]
    MutualExclusivityError(String),

    /// The loaded configuration could not be deserialized
    #[error("malformed configuration: {0}")]
    ParseError(String),

    /// Error bubbled up from the underlying config crate
    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn file_not_found(path: impl Into<String>) -> Self {
        ConfigError::FileNotFound(path.into())
    }

    pub fn mutual_exclusivity(message: impl Into<String>) -> Self {
        ConfigError::MutualExclusivityError(message.into())
    }
}
