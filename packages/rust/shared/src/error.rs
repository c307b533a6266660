//! Error types for SiteForge.
//!
//! Library crates use [`SiteForgeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all SiteForge operations.
#[derive(Debug, thiserror::Error)]
pub enum SiteForgeError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error during discovery or extraction.
    #[error("network error: {0}")]
    Network(String),

    /// HTML, XML, or JSON parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Pipeline state persistence error.
    #[error("state error: {0}")]
    State(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (missing field, invalid format, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A stage name that is not part of the pipeline's fixed order.
    /// Indicates a caller bug, not a runtime condition to recover from.
    #[error("unknown stage: {0}")]
    UnknownStage(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SiteForgeError>;

impl SiteForgeError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
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
        let err = SiteForgeError::config("missing output directory");
        assert_eq!(err.to_string(), "config error: missing output directory");

        let err = SiteForgeError::UnknownStage("deploy".into());
        assert_eq!(err.to_string(), "unknown stage: deploy");
    }
}
