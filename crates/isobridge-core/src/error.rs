//! Error types for isobridge input handling

use thiserror::Error;

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Error type for reading declarations, configuration and writing output
///
/// User-facing problems with annotated declarations are reported as
/// diagnostics through [`crate::CompilationContext`]; this type covers input
/// that cannot be read at all.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A type reference string could not be parsed
    #[error("invalid type reference `{input}`: {reason}")]
    InvalidType { input: String, reason: String },

    /// The round description is not valid JSON or misses required fields
    #[error("invalid round description: {0}")]
    InvalidRound(String),

    /// The configuration file could not be parsed
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Unknown log level name
    #[error("unknown log level: {0}")]
    UnknownLogLevel(String),

    /// A generated file could not be written
    #[error("failed to write `{path}`: {reason}")]
    WriteFailed { path: String, reason: String },

    /// I/O error while reading input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::InvalidRound(err.to_string())
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(err: toml::de::Error) -> Self {
        CoreError::ConfigError(err.to_string())
    }
}
