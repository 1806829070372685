//! Error types for Memoria
//!
//! Provides a unified error type for all store operations.
//!
//! A corrupt artifact is deliberately absent here: it is absorbed by the
//! store as a missing document and reported through logging and
//! [`StoreStats`](crate::stats::StoreStats).

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using MemoriaError
pub type Result<T> = std::result::Result<T, MemoriaError>;

/// Unified error type for Memoria operations
#[derive(Debug, Error)]
pub enum MemoriaError {
    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    /// A durable write, directory creation, removal or read failed.
    /// The operation has definitely not taken effect.
    #[error("Storage error at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A blocking I/O task panicked or was cancelled before completing
    #[error("Storage task failed: {0}")]
    Task(String),

    // -------------------------------------------------------------------------
    // Document Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Document under key '{key}' is not a sequence")]
    NotASequence { key: String },

    #[error("Update rejected: {0}")]
    Update(String),

    // -------------------------------------------------------------------------
    // Naming Errors
    // -------------------------------------------------------------------------
    #[error("Invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },

    #[error("Invalid namespace '{name}': {reason}")]
    InvalidNamespace { name: String, reason: &'static str },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MemoriaError {
    /// Wrap an I/O error with the path it happened on
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// True for failures of the durable layer (the caller should treat the
    /// operation as failed, e.g. map it to a 5xx)
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Task(_))
    }
}

impl From<serde_json::Error> for MemoriaError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<tokio::task::JoinError> for MemoriaError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Task(e.to_string())
    }
}
