//! Record Module
//!
//! On-disk record format, the append-only data file and startup recovery.
//!
//! ## Responsibilities
//! - Encode/decode a single (timestamp, key, value) record
//! - Append records at the file tail, rolling back torn writes
//! - Replay the file on open to rebuild the key directory
//! - Drop a partially written record at the tail
//!
//! ## File Format
//! All integers are little-endian.
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │ Record 1                                                  │
//! │ ┌───────────┬───────────┬───────────┬───────┬──────────┐ │
//! │ │ Tstamp(4) │ KeyLen(4) │ ValLen(4) │  Key  │  Value   │ │
//! │ └───────────┴───────────┴───────────┴───────┴──────────┘ │
//! ├───────────────────────────────────────────────────────────┤
//! │ Record 2                                                  │
//! │ ┌───────────┬───────────┬───────────┬───────┬──────────┐ │
//! │ │ Tstamp(4) │ KeyLen(4) │ ValLen(4) │  Key  │  Value   │ │
//! │ └───────────┴───────────┴───────────┴───────┴──────────┘ │
//! └───────────────────────────────────────────────────────────┘
//! ```

mod codec;
mod data_file;
mod scanner;
mod recovery;

pub use codec::{Record, RecordHeader, HEADER_SIZE, MAX_RECORD_SIZE};
pub use data_file::DataFile;
pub use scanner::{RecordScanner, ScannedRecord};
pub use recovery::{Recovery, RecoveryResult};
