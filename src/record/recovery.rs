//! Recovery
//!
//! Rebuilds the key directory by replaying the data file on open.

use std::fs::File;
use std::path::Path;

use crate::error::Result;
use crate::keydir::{KeyDir, KeyEntry};

use super::scanner::RecordScanner;

/// Rebuilds a `KeyDir` from a data file
pub struct Recovery;

/// Result of a recovery operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of complete records replayed
    pub records_scanned: u64,

    /// Number of distinct keys indexed
    pub live_keys: usize,

    /// End of the last complete record (logical end of file)
    pub valid_len: u64,

    /// Bytes after `valid_len` belonging to a torn record
    pub bytes_discarded: u64,

    /// Whether a torn record was found at the tail
    pub was_truncated: bool,
}

impl Recovery {
    /// Replay every complete record in `file`
    ///
    /// Records are applied in file order, so a later record for a key
    /// replaces an earlier one. A torn trailing record is left out of the
    /// index and reported through `was_truncated`; the file itself is not
    /// modified here.
    pub fn recover(file: &File) -> Result<(KeyDir, RecoveryResult)> {
        let mut keydir = KeyDir::new();
        let mut scanner = RecordScanner::new(file)?;
        let mut records_scanned = 0u64;

        while let Some(record) = scanner.next_record()? {
            let total_size = record.record_size() as u32;
            let entry = KeyEntry::new(record.position, total_size, record.header.timestamp);

            tracing::trace!(key = %record.key, position = record.position, "replayed record");
            keydir.put(record.key, entry);
            records_scanned += 1;
        }

        let result = RecoveryResult {
            records_scanned,
            live_keys: keydir.len(),
            valid_len: scanner.valid_len(),
            bytes_discarded: scanner.file_len() - scanner.valid_len(),
            was_truncated: scanner.was_truncated(),
        };

        Ok((keydir, result))
    }

    /// Verify a data file without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        let file = File::open(path)?;
        let (_, result) = Self::recover(&file)?;
        Ok(result)
    }
}
