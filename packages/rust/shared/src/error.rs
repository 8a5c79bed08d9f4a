//! Error types for wikigraph.
//!
//! Library crates use [`WikigraphError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all wikigraph operations.
#[derive(Debug, thiserror::Error)]
pub enum WikigraphError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network or HTTP failure during extraction.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Neo4j connection or statement-execution failure during load.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (malformed response, invalid parameter, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, WikigraphError>;

impl WikigraphError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = WikigraphError::Fetch("HTTP 404 Not Found".into());
        assert_eq!(err.to_string(), "fetch error: HTTP 404 Not Found");

        let err = WikigraphError::config("NEO4J_URI is empty");
        assert!(err.to_string().contains("NEO4J_URI"));

        let err = WikigraphError::Persistence("connection refused".into());
        assert!(err.to_string().starts_with("persistence error"));
    }
}
