use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which revision of a file an operation needed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Previous,
    Current,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Previous => write!(f, "previous"),
            Self::Current => write!(f, "current"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("malformed source: {0}")]
    Decode(#[from] bal_lua::DecodeError),

    #[error("schema error: {0}")]
    Schema(#[from] bal_schema::SchemaError),

    #[error("{path}: {side} revision is missing")]
    MissingRevision { path: String, side: Side },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk snapshot: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

impl AnalyzeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` when the file content itself is at fault, as opposed
    /// to the environment.
    pub fn is_malformed_source(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

pub type AnalyzeResult<T> = Result<T, AnalyzeError>;
