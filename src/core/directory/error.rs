//! Directory Error Types

use thiserror::Error;

/// Errors that can occur while resolving directory queries.
///
/// Empty input and "no match" are not errors: both resolve to an empty
/// result. Only store failures and configuration problems surface here.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The backing store is unreachable or a query failed.
    #[error("Store error: {0}")]
    Store(String),

    #[error("Synonym source parse failed: {0}")]
    SynonymParse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DirectoryError {
    /// Create a store error with the given message.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type alias for directory operations
pub type DirectoryResult<T> = Result<T, DirectoryError>;
