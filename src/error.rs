//! Error types for Stockpile
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using StockError
pub type Result<T> = std::result::Result<T, StockError>;

/// Unified error type for Stockpile operations
///
/// A missing id (remove/update) and a colliding id (add) are not errors:
/// the store reports them as `Ok(false)`.
#[derive(Debug, Error)]
pub enum StockError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    /// The backing file could not be turned into records.
    ///
    /// `recoverable` is true when the file was readable but its contents were
    /// not (syntax or shape). It is false when the file itself could not be
    /// read. Either way a store opening this file starts empty.
    #[error("Decode error: {reason}")]
    Decode { reason: String, recoverable: bool },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    // -------------------------------------------------------------------------
    // Persistence Errors
    // -------------------------------------------------------------------------
    #[error("Failed to save {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Input Errors
    // -------------------------------------------------------------------------
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StockError {
    /// True for decode failures that mean "the contents are bad" rather than
    /// "the file could not be read".
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StockError::Decode { recoverable: true, .. })
    }
}
