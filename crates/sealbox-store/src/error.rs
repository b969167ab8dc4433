//! Error types for the store client.

use thiserror::Error;

use sealbox_core::ContentAddress;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A transient backend fault (timeout, connection reset, 5xx-class
    /// response). Eligible for retry.
    #[error("transient store failure: {0}")]
    Transient(String),

    /// Retries exhausted against a transiently failing backend.
    #[error("store unavailable after {attempts} attempts")]
    Unavailable { attempts: u32 },

    /// The address is unknown to the backend.
    #[error("content not found: {0}")]
    NotFound(ContentAddress),

    /// The payload exceeds the backend's size limit. Never retried.
    #[error("payload of {size} bytes exceeds limit of {limit}")]
    PayloadTooLarge { size: usize, limit: usize },

    /// The request is structurally invalid. Never retried.
    #[error("malformed store request: {0}")]
    MalformedRequest(String),

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Schema migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Only [`StoreError::Transient`] qualifies; everything else either
    /// reflects a caller mistake or a terminal backend state.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
