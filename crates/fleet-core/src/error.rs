//! Error types for fleet core parsing.

use thiserror::Error;

/// Result type alias for fleet core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while loading configuration or decoding input records.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("invalid delay unit: {0} (expected minutes, hours or days)")]
    InvalidDelayUnit(String),

    #[error("invalid output format: {0} (expected text or json)")]
    InvalidOutputFormat(String),
}
