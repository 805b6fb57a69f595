//! Record Scanner
//!
//! Walks the data file front to back, yielding record headers and keys.
//! Values are skipped, never read. Scanning stops at the last complete
//! record: a record cut short by the end of the file is never yielded.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};

use crate::error::{CaskError, Result};

use super::codec::{RecordHeader, HEADER_SIZE, MAX_RECORD_SIZE};

/// Location and metadata of one complete record found by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedRecord {
    /// Byte offset of the record header
    pub position: u64,
    pub header: RecordHeader,
    pub key: String,
}

impl ScannedRecord {
    pub fn record_size(&self) -> u64 {
        self.header.record_size()
    }
}

/// Sequential reader over the records of a data file
pub struct RecordScanner<'a> {
    reader: BufReader<&'a File>,
    /// File length when the scan started
    file_len: u64,
    /// End of the last complete record
    position: u64,
    /// A torn record was found at the tail
    truncated: bool,
    done: bool,
}

impl<'a> RecordScanner<'a> {
    /// Start scanning `file` from offset 0
    pub fn new(file: &'a File) -> Result<Self> {
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(0))?;

        Ok(Self {
            reader,
            file_len,
            position: 0,
            truncated: false,
            done: false,
        })
    }

    /// Read the next complete record
    ///
    /// Returns `Ok(None)` at a clean end of file or at a torn tail.
    pub fn next_record(&mut self) -> Result<Option<ScannedRecord>> {
        if self.done {
            return Ok(None);
        }

        let remaining = self.file_len - self.position;
        if remaining == 0 {
            self.done = true;
            return Ok(None);
        }
        if remaining < HEADER_SIZE as u64 {
            return Ok(self.stop_at_torn_tail("header"));
        }

        let mut header_buf = [0u8; HEADER_SIZE];
        if !self.read_or_torn(&mut header_buf)? {
            return Ok(self.stop_at_torn_tail("header"));
        }
        let header = RecordHeader::decode(&header_buf)?;

        let size = header.record_size();
        if size > MAX_RECORD_SIZE {
            self.done = true;
            return Err(CaskError::corrupt(format!(
                "record at offset {} declares {} bytes (key {}, value {}), max is {}",
                self.position, size, header.key_size, header.value_size, MAX_RECORD_SIZE
            )));
        }
        if size > remaining {
            return Ok(self.stop_at_torn_tail("payload"));
        }

        let mut key_buf = vec![0u8; header.key_size as usize];
        if !self.read_or_torn(&mut key_buf)? {
            return Ok(self.stop_at_torn_tail("key"));
        }
        let key = String::from_utf8(key_buf).map_err(|e| {
            self.done = true;
            CaskError::corrupt(format!(
                "key of record at offset {} is not valid UTF-8: {}",
                self.position, e
            ))
        })?;

        // values are not needed to rebuild the index
        self.reader.seek_relative(header.value_size as i64)?;

        let record = ScannedRecord {
            position: self.position,
            header,
            key,
        };
        self.position += size;

        Ok(Some(record))
    }

    /// Fill `buf` completely. `Ok(false)` means the file ended first.
    fn read_or_torn(&mut self, buf: &mut [u8]) -> Result<bool> {
        match self.reader.read_exact(buf) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(false),
            Err(e) => {
                self.done = true;
                Err(e.into())
            }
        }
    }

    fn stop_at_torn_tail(&mut self, part: &str) -> Option<ScannedRecord> {
        tracing::debug!(
            position = self.position,
            file_len = self.file_len,
            part,
            "torn record at end of data file"
        );
        self.truncated = true;
        self.done = true;
        None
    }

    /// End of the last complete record seen so far
    pub fn valid_len(&self) -> u64 {
        self.position
    }

    /// File length when the scan started
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Whether the scan stopped on a torn record
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }
}

impl Iterator for RecordScanner<'_> {
    type Item = Result<ScannedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
