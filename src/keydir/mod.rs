//! KeyDir Module
//!
//! In-memory index from key to the location of its latest record.
//!
//! ## Responsibilities
//! - One entry per live key, latest write wins
//! - Rebuilt from the data file on every open, never persisted
//!
//! ## Data Structure Choice
//! A plain `HashMap`: point lookups only, no ordering needed. The owning
//! `DiskStore` serializes access, so the map carries no lock of its own.
//! Memory grows linearly with the number of distinct keys.

mod table;

pub use table::KeyDir;

/// Location of a key's most recent record in the data file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEntry {
    /// Byte offset of the record header
    pub position: u64,
    /// Header + key + value size in bytes
    pub total_size: u32,
    /// Seconds since the unix epoch when the record was written
    pub timestamp: u32,
}

impl KeyEntry {
    pub fn new(position: u64, total_size: u32, timestamp: u32) -> Self {
        Self {
            position,
            total_size,
            timestamp,
        }
    }
}
