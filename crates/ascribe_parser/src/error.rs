//! Parse error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during parsing or conversion.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The source text is invalid.
    #[error("Invalid source: {message}")]
    InvalidSource {
        /// Error message.
        message: String,
        /// 1-indexed line where the error occurred.
        line: Option<usize>,
    },

    /// An include directive could not be read.
    #[error("Failed to include {}: {source}", path.display())]
    Include {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Includes nested deeper than the allowed maximum.
    #[error("Maximum include depth of {0} exceeded")]
    IncludeDepth(usize),

    /// The converter does not support the requested backend.
    #[error("Unsupported backend: {0}")]
    UnsupportedBackend(String),

    /// An internal parser error occurred.
    #[error("Internal parser error: {0}")]
    Internal(String),
}

impl ParseError {
    /// Creates a new invalid source error.
    pub fn invalid_source(message: impl Into<String>) -> Self {
        Self::InvalidSource {
            message: message.into(),
            line: None,
        }
    }

    /// Creates a new invalid source error at a line.
    pub fn invalid_source_at(message: impl Into<String>, line: usize) -> Self {
        Self::InvalidSource {
            message: message.into(),
            line: Some(line),
        }
    }

    /// Creates a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
