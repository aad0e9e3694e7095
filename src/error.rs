//! Custom error types for cardkeeper
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for cardkeeper operations
#[derive(Error, Debug)]
pub enum KeeperError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal cryptographic errors (cipher setup, password hashing)
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Backup envelope could not be decrypted.
    ///
    /// Covers every failure mode of decoding a backup file (bad base64,
    /// truncated envelope, authentication failure, wrong password,
    /// unparseable plaintext) so that callers cannot tell a wrong
    /// password apart from a corrupted file.
    #[error("Invalid password or corrupted backup file")]
    InvalidEnvelope,

    /// Decrypted backup payload is missing its data section
    #[error("Invalid backup file structure")]
    InvalidStructure,
}

impl KeeperError {
    /// Create a "not found" error for backups
    pub fn backup_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backup",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for KeeperError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for KeeperError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for cardkeeper operations
pub type KeeperResult<T> = Result<T, KeeperError>;
