//! Error types for schema loading.

use std::path::PathBuf;

/// Errors that can occur while loading a property schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema file could not be read.
    #[error("failed to read schema {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The schema text is not valid TOML or does not match the schema layout.
    #[error("invalid schema: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Convenience alias for schema results.
pub type SchemaResult<T> = Result<T, SchemaError>;
