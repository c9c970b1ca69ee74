//! Cache error types.

use thiserror::Error;

/// Errors that can occur when building a memo store.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The store must hold at least one entry.
    #[error("Cache capacity must be at least 1, got {0}")]
    InvalidCapacity(usize),
}
