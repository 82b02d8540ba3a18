#![cfg(test)]

use std::io::Write;

use flate2::{Compression, write::ZlibEncoder};

use super::*;

fn regular(data_type: u32, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&data_type.to_le_bytes());
    bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

#[test]
fn reads_small_element() {
    // nbytes = 3 in the upper half, miINT8 in the lower half.
    let mut bytes = ((3u32 << 16) | 1).to_le_bytes().to_vec();
    bytes.extend_from_slice(b"abc\0");
    bytes.extend_from_slice(&[0xAA; 8]);

    let mut reader = &bytes[..];
    let element = read_element(&mut reader, Endian::Little).unwrap();
    assert_eq!(element.data_type, DataType::Int8);
    assert_eq!(element.data, b"abc");
    assert_eq!(reader.len(), 8);
}

#[test]
fn reads_small_element_big_endian() {
    let mut bytes = ((2u32 << 16) | 4).to_be_bytes().to_vec();
    bytes.extend_from_slice(&[0x00, 0x41, 0, 0]);

    let mut reader = &bytes[..];
    let element = read_element(&mut reader, Endian::Big).unwrap();
    assert_eq!(element.data_type, DataType::UInt16);
    assert_eq!(element.data, &[0x00, 0x41]);
    assert!(reader.is_empty());
}

#[test]
fn regular_element_skips_padding() {
    let mut bytes = regular(1, b"hello");
    bytes.extend_from_slice(&[0; 3]);
    bytes.extend_from_slice(&regular(2, &[7; 8]));

    let mut reader = &bytes[..];
    let first = read_element(&mut reader, Endian::Little).unwrap();
    assert_eq!(first.data, b"hello");
    let second = read_element(&mut reader, Endian::Little).unwrap();
    assert_eq!(second.data_type, DataType::UInt8);
    assert_eq!(second.data, &[7; 8]);
    assert!(reader.is_empty());
}

#[test]
fn tolerates_missing_padding_at_end_of_stream() {
    let bytes = regular(1, b"abcde");
    let mut reader = &bytes[..];
    let element = read_element(&mut reader, Endian::Little).unwrap();
    assert_eq!(element.data, b"abcde");
    assert!(reader.is_empty());
}

#[test]
fn truncated_payload_is_reported() {
    let mut bytes = regular(9, &[0; 16]);
    bytes.truncate(12);

    let mut reader = &bytes[..];
    let err = read_element(&mut reader, Endian::Little).unwrap_err();
    assert!(matches!(err, MatError::Truncated { needed: 16, available: 4 }));
}

#[test]
fn truncated_tag_is_reported() {
    let mut reader: &[u8] = &[1, 0];
    let err = read_element(&mut reader, Endian::Little).unwrap_err();
    assert!(matches!(err, MatError::Truncated { needed: 4, available: 2 }));
}

#[test]
fn unknown_type_code_is_rejected() {
    let bytes = regular(8, &[0; 8]);
    let mut reader = &bytes[..];
    let err = read_element(&mut reader, Endian::Little).unwrap_err();
    assert!(matches!(err, MatError::UnsupportedDataType(8)));
}

#[test]
fn oversized_small_element_is_rejected() {
    let bytes = ((6u32 << 16) | 1).to_le_bytes();
    let mut reader = &bytes[..];
    let err = read_element(&mut reader, Endian::Little).unwrap_err();
    assert!(matches!(err, MatError::InvalidData(_)));
}

#[test]
fn compressed_element_is_not_padded() {
    let mut bytes = regular(15, &[1, 2, 3]);
    bytes.extend_from_slice(&regular(2, &[9; 8]));

    let mut reader = &bytes[..];
    let compressed = read_element(&mut reader, Endian::Little).unwrap();
    assert_eq!(compressed.data_type, DataType::Compressed);
    assert_eq!(compressed.data, &[1, 2, 3]);
    let next = read_element(&mut reader, Endian::Little).unwrap();
    assert_eq!(next.data, &[9; 8]);
}

#[test]
fn read_expected_checks_type() {
    let bytes = regular(9, &[0; 8]);
    let mut reader = &bytes[..];
    let err = read_expected(&mut reader, Endian::Little, &[DataType::Int8], "name").unwrap_err();
    assert!(err.to_string().contains("name"));
}

#[test]
fn inflates_zlib_payload() {
    let payload: Vec<u8> = (0..200u8).collect();
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&payload).unwrap();
    let compressed = encoder.finish().unwrap();

    assert_eq!(inflate(&compressed).unwrap(), payload);
    assert_eq!(inflate_prefix(&compressed, 16).unwrap(), payload[..16].to_vec());
}

#[test]
fn corrupt_zlib_payload_is_a_decompression_error() {
    let err = inflate(&[0xde, 0xad, 0xbe, 0xef]).unwrap_err();
    assert!(matches!(err, MatError::Decompression(_)));
}
