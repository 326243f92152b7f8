//! Error types for the table-literal decoder.

/// Malformed source: the text is not a decodable table literal.
///
/// Fatal for the file being decoded, never for its siblings.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// The byte stream could not be tokenized.
    #[error("lex error at line {line}: {message}")]
    Lex { line: u32, message: String },

    /// The token stream does not form a valid chunk.
    #[error("parse error at line {line}: {message}")]
    Parse { line: u32, message: String },

    /// The chunk has no `return` statement.
    #[error("source has no return statement")]
    MissingReturn,

    /// The returned expression does not reduce to a table.
    #[error("return value at line {line} is not a table (found {found})")]
    NotATable { line: u32, found: String },
}

impl DecodeError {
    pub(crate) fn lex(line: u32, message: impl Into<String>) -> Self {
        Self::Lex {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn parse(line: u32, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Convenience alias for decoder results.
pub type DecodeResult<T> = Result<T, DecodeError>;
