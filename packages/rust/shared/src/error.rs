//! Error types for swinventory.
//!
//! Library crates use [`InventoryError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all swinventory operations.
///
/// Every variant is fatal for the current invocation: no partial inventory
/// is ever emitted after one of these is raised.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// Configuration missing, malformed, or inconsistent.
    #[error("config error: {message}")]
    Config { message: String },

    /// A configured field name is absent from a record.
    #[error("missing field '{field}' in record #{record}")]
    MissingField { field: String, record: usize },

    /// Network, auth, or transport failure talking to SolarWinds.
    #[error("remote fetch failed: {0}")]
    RemoteFetch(String),

    /// The query response is not a well-formed record list.
    #[error("malformed response: {message}")]
    MalformedResponse { message: String },

    /// Assembled document violates an inventory invariant.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, InventoryError>;

impl InventoryError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a missing-field error for the record at `record` (zero-based).
    pub fn missing_field(field: impl Into<String>, record: usize) -> Self {
        Self::MissingField {
            field: field.into(),
            record,
        }
    }

    /// Create a malformed-response error from any displayable message.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse {
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
