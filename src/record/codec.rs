//! Record codec
//!
//! Encoding and decoding of a single record: a 12 byte header
//! (timestamp, key size, value size) followed by the key and value bytes.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{CaskError, Result};

/// Header size: timestamp (4) + key size (4) + value size (4)
pub const HEADER_SIZE: usize = 12;

/// Largest encodable record. Sizes are stored as u32.
pub const MAX_RECORD_SIZE: u64 = u32::MAX as u64;

/// Fixed-size prefix of every record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Seconds since the unix epoch when the record was written
    pub timestamp: u32,
    pub key_size: u32,
    pub value_size: u32,
}

impl RecordHeader {
    /// Decode a header from the first `HEADER_SIZE` bytes of `bytes`
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(CaskError::corrupt(format!(
                "incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let mut buf = &bytes[..HEADER_SIZE];
        Ok(Self {
            timestamp: buf.get_u32_le(),
            key_size: buf.get_u32_le(),
            value_size: buf.get_u32_le(),
        })
    }

    /// Total size of the record this header introduces (header included)
    ///
    /// Computed in u64 so a hostile header cannot overflow.
    pub fn record_size(&self) -> u64 {
        HEADER_SIZE as u64 + self.key_size as u64 + self.value_size as u64
    }
}

/// A single key/value record as stored in the data file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub timestamp: u32,
    pub key: String,
    pub value: String,
}

impl Record {
    pub fn new(timestamp: u32, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            timestamp,
            key: key.into(),
            value: value.into(),
        }
    }

    /// Size in bytes of the encoded record
    pub fn encoded_len(&self) -> u64 {
        HEADER_SIZE as u64 + self.key.len() as u64 + self.value.len() as u64
    }

    /// Encode to bytes
    ///
    /// Records over `MAX_RECORD_SIZE` are rejected with `RecordTooLarge`.
    pub fn encode(&self) -> Result<Bytes> {
        let size = self.encoded_len();
        if size > MAX_RECORD_SIZE {
            return Err(CaskError::RecordTooLarge {
                size,
                max: MAX_RECORD_SIZE,
            });
        }

        let mut buf = BytesMut::with_capacity(size as usize);
        buf.put_u32_le(self.timestamp);
        buf.put_u32_le(self.key.len() as u32);
        buf.put_u32_le(self.value.len() as u32);
        buf.put_slice(self.key.as_bytes());
        buf.put_slice(self.value.as_bytes());

        Ok(buf.freeze())
    }

    /// Decode exactly one record from `bytes`
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let header = RecordHeader::decode(bytes)?;
        let expected = header.record_size();

        if bytes.len() as u64 != expected {
            return Err(CaskError::corrupt(format!(
                "record length mismatch: header declares {} bytes, got {}",
                expected,
                bytes.len()
            )));
        }

        let key_end = HEADER_SIZE + header.key_size as usize;
        let key = decode_utf8(&bytes[HEADER_SIZE..key_end], "key")?;
        let value = decode_utf8(&bytes[key_end..], "value")?;

        Ok(Self {
            timestamp: header.timestamp,
            key,
            value,
        })
    }
}

fn decode_utf8(bytes: &[u8], what: &str) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| CaskError::corrupt(format!("{} is not valid UTF-8: {}", what, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout_is_little_endian() {
        let bytes = Record::new(0x0102_0304, "k", "vv").encode().unwrap();

        assert_eq!(&bytes[0..4], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[4..8], &1u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &2u32.to_le_bytes());
        assert_eq!(&bytes[12..], b"kvv");
    }

    #[test]
    fn test_record_size_does_not_overflow() {
        let header = RecordHeader {
            timestamp: 0,
            key_size: u32::MAX,
            value_size: u32::MAX,
        };

        assert_eq!(header.record_size(), 12 + 2 * u32::MAX as u64);
    }
}
