//! Tests for the Record codec
//!
//! These tests verify:
//! - Encoded layout (header + key + value)
//! - Decoding complete records, including empty keys/values
//! - Rejection of short, oversized and non-UTF-8 input

use caskdb::record::{Record, RecordHeader, HEADER_SIZE};
use caskdb::CaskError;

// =============================================================================
// Encode Tests
// =============================================================================

#[test]
fn test_encoded_len_matches_bytes() {
    let record = Record::new(1_700_000_000, "othello", "shakespeare");
    let bytes = record.encode().unwrap();

    assert_eq!(bytes.len() as u64, record.encoded_len());
    assert_eq!(bytes.len(), HEADER_SIZE + "othello".len() + "shakespeare".len());
}

#[test]
fn test_header_fields() {
    let bytes = Record::new(42, "key", "value!").encode().unwrap();
    let header = RecordHeader::decode(&bytes).unwrap();

    assert_eq!(header.timestamp, 42);
    assert_eq!(header.key_size, 3);
    assert_eq!(header.value_size, 6);
    assert_eq!(header.record_size(), bytes.len() as u64);
}

#[test]
fn test_payload_follows_header() {
    let bytes = Record::new(0, "ab", "cd").encode().unwrap();

    assert_eq!(&bytes[HEADER_SIZE..], b"abcd");
}

// =============================================================================
// Decode Tests
// =============================================================================

#[test]
fn test_decode_restores_record() {
    let record = Record::new(1_234, "hamlet", "to be or not to be");
    let bytes = record.encode().unwrap();

    assert_eq!(Record::decode(&bytes).unwrap(), record);
}

#[test]
fn test_decode_empty_value() {
    let record = Record::new(7, "k", "");
    let decoded = Record::decode(&record.encode().unwrap()).unwrap();

    assert_eq!(decoded.value, "");
}

#[test]
fn test_decode_unicode() {
    let record = Record::new(7, "clé", "värde ✓");
    let decoded = Record::decode(&record.encode().unwrap()).unwrap();

    assert_eq!(decoded, record);
}

#[test]
fn test_decode_header_only_buffer_of_empty_record() {
    let bytes = Record::new(9, "", "").encode().unwrap();

    assert_eq!(bytes.len(), HEADER_SIZE);
    let decoded = Record::decode(&bytes).unwrap();
    assert_eq!(decoded.key, "");
    assert_eq!(decoded.value, "");
}

// =============================================================================
// Malformed Input Tests
// =============================================================================

#[test]
fn test_decode_short_header_is_corrupt() {
    let result = RecordHeader::decode(&[0u8; HEADER_SIZE - 1]);

    assert!(matches!(result, Err(CaskError::CorruptRecord(_))));
}

#[test]
fn test_decode_truncated_payload_is_corrupt() {
    let bytes = Record::new(1, "key", "value").encode().unwrap();
    let result = Record::decode(&bytes[..bytes.len() - 2]);

    assert!(matches!(result, Err(CaskError::CorruptRecord(_))));
}

#[test]
fn test_decode_trailing_bytes_is_corrupt() {
    let mut bytes = Record::new(1, "key", "value").encode().unwrap().to_vec();
    bytes.push(0);

    assert!(matches!(Record::decode(&bytes), Err(CaskError::CorruptRecord(_))));
}

#[test]
fn test_decode_absurd_sizes_is_corrupt() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(&u32::MAX.to_le_bytes());
    bytes.extend_from_slice(&u32::MAX.to_le_bytes());
    bytes.extend_from_slice(b"tiny");

    assert!(matches!(Record::decode(&bytes), Err(CaskError::CorruptRecord(_))));
}

#[test]
fn test_decode_invalid_utf8_value_is_corrupt() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(&2u32.to_le_bytes());
    bytes.extend_from_slice(b"k");
    bytes.extend_from_slice(&[0xff, 0xfe]);

    assert!(matches!(Record::decode(&bytes), Err(CaskError::CorruptRecord(_))));
}
