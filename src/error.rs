//! Error types for change-audit
//!
//! Only genuine failures live here. Skipped events, unsupported operations
//! and "nothing changed" are ordinary outcomes, not errors.

use thiserror::Error;

/// The main error type for audit operations
#[derive(Error, Debug)]
pub enum AuditError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Audit store write or read failures
    #[error("Storage error: {0}")]
    Storage(String),

    /// A change event that could not be parsed or interpreted
    #[error("Invalid change event: {0}")]
    InvalidEvent(String),
}

impl AuditError {
    /// Check if this is a storage error
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<std::io::Error> for AuditError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for audit operations
pub type AuditResult<T> = Result<T, AuditError>;
