//! Error types for CaskDB
//!
//! Provides a unified error type for all operations. A missing key is not an
//! error: `DiskStore::get` returns `Ok(None)` for it.

use thiserror::Error;

/// Result type alias using CaskError
pub type Result<T> = std::result::Result<T, CaskError>;

/// Unified error type for CaskDB operations
#[derive(Debug, Error)]
pub enum CaskError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("Record too large: {size} bytes (max {max})")]
    RecordTooLarge { size: u64, max: u64 },

    // -------------------------------------------------------------------------
    // Index Errors
    // -------------------------------------------------------------------------
    #[error("Stale index entry for key {key:?} at position {position}: {reason}")]
    StaleIndexEntry {
        key: String,
        position: u64,
        reason: String,
    },

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Store is closed")]
    Closed,

    #[error("Store is read-only")]
    ReadOnly,

    // -------------------------------------------------------------------------
    // Clock Errors
    // -------------------------------------------------------------------------
    #[error("Timestamp error: {0}")]
    Timestamp(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CaskError {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        CaskError::CorruptRecord(reason.into())
    }
}
