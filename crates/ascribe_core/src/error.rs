//! Transformer error types.

use thiserror::Error;

/// Errors that can occur while transforming a document.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Parse or conversion error.
    #[error("Parse error: {0}")]
    Parse(#[from] ascribe_parser::ParseError),

    /// Cache error.
    #[error("Cache error: {0}")]
    Cache(#[from] ascribe_cache::CacheError),

    /// A blocking parse or convert task panicked or was cancelled.
    #[error("Task error: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TransformError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
