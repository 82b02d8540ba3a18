//! Level 5 data element framing.
//!
//! Every value in a MAT-file is wrapped in a tag:
//!
//! ```text
//! regular: | type: u32 | nbytes: u32 | payload (nbytes) | pad to 8 |
//! small:   | nbytes: u16 | type: u16 | payload (<= 4, padded to 4) |
//! ```
//!
//! The small form is detected by a non-zero upper half in the first word.
//! `miCOMPRESSED` payloads are zlib streams holding one more element and are
//! never padded.

use std::io::Read;

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};
use flate2::read::ZlibDecoder;

use super::MatError;

/// Byte order declared by the file header (`IM` little, `MI` big).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    pub(crate) fn read_u32(self, reader: &mut &[u8]) -> Result<u32, MatError> {
        let available = reader.len();
        let value = match self {
            Self::Little => reader.read_u32::<LittleEndian>(),
            Self::Big => reader.read_u32::<BigEndian>(),
        };
        value.map_err(|_| MatError::Truncated { needed: 4, available })
    }

    pub(crate) fn u16_from(self, bytes: &[u8]) -> u16 {
        match self {
            Self::Little => LittleEndian::read_u16(bytes),
            Self::Big => BigEndian::read_u16(bytes),
        }
    }

    pub(crate) fn u32_from(self, bytes: &[u8]) -> u32 {
        match self {
            Self::Little => LittleEndian::read_u32(bytes),
            Self::Big => BigEndian::read_u32(bytes),
        }
    }

    pub(crate) fn u64_from(self, bytes: &[u8]) -> u64 {
        match self {
            Self::Little => LittleEndian::read_u64(bytes),
            Self::Big => BigEndian::read_u64(bytes),
        }
    }
}

/// `mi*` data element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Single,
    Double,
    Int64,
    UInt64,
    Matrix,
    Compressed,
    Utf8,
    Utf16,
    Utf32,
}

impl DataType {
    pub fn from_u32(value: u32) -> Result<Self, MatError> {
        match value {
            1 => Ok(Self::Int8),
            2 => Ok(Self::UInt8),
            3 => Ok(Self::Int16),
            4 => Ok(Self::UInt16),
            5 => Ok(Self::Int32),
            6 => Ok(Self::UInt32),
            7 => Ok(Self::Single),
            9 => Ok(Self::Double),
            12 => Ok(Self::Int64),
            13 => Ok(Self::UInt64),
            14 => Ok(Self::Matrix),
            15 => Ok(Self::Compressed),
            16 => Ok(Self::Utf8),
            17 => Ok(Self::Utf16),
            18 => Ok(Self::Utf32),
            _ => Err(MatError::UnsupportedDataType(value)),
        }
    }

    /// Return the raw numeric code used in the file for this data type.
    pub fn as_u32(self) -> u32 {
        match self {
            Self::Int8 => 1,
            Self::UInt8 => 2,
            Self::Int16 => 3,
            Self::UInt16 => 4,
            Self::Int32 => 5,
            Self::UInt32 => 6,
            Self::Single => 7,
            Self::Double => 9,
            Self::Int64 => 12,
            Self::UInt64 => 13,
            Self::Matrix => 14,
            Self::Compressed => 15,
            Self::Utf8 => 16,
            Self::Utf16 => 17,
            Self::Utf32 => 18,
        }
    }

    /// Size in bytes of one stored value.
    pub fn element_size(self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 | Self::Utf8 | Self::Matrix | Self::Compressed => 1,
            Self::Int16 | Self::UInt16 | Self::Utf16 => 2,
            Self::Int32 | Self::UInt32 | Self::Single | Self::Utf32 => 4,
            Self::Double | Self::Int64 | Self::UInt64 => 8,
        }
    }
}

/// A decoded tag plus a borrowed view of its payload.
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    pub data_type: DataType,
    pub data: &'a [u8],
}

/// Size of a regular tag; anything shorter left in a stream is padding.
pub const TAG_LEN: usize = 8;

/// Read one element and advance `reader` past its payload and padding.
pub fn read_element<'a>(reader: &mut &'a [u8], endian: Endian) -> Result<Element<'a>, MatError> {
    let first = endian.read_u32(reader)?;

    let small_len = (first >> 16) as usize;
    if small_len != 0 {
        let data_type = DataType::from_u32(first & 0xFFFF)?;
        if small_len > 4 {
            return Err(MatError::InvalidData(format!("small data element claims {small_len} bytes")));
        }
        let payload = take(reader, 4)?;
        return Ok(Element {
            data_type,
            data: &payload[..small_len],
        });
    }

    let data_type = DataType::from_u32(first)?;
    let len = endian.read_u32(reader)? as usize;
    let data = take(reader, len)?;

    if data_type != DataType::Compressed {
        // The final element of a stream is sometimes written without its padding.
        let padding = (TAG_LEN - len % TAG_LEN) % TAG_LEN;
        let padding = padding.min(reader.len());
        take(reader, padding)?;
    }

    Ok(Element { data_type, data })
}

/// Read the next element and fail unless it has one of the `expected` types.
pub fn read_expected<'a>(reader: &mut &'a [u8], endian: Endian, expected: &[DataType], what: &str) -> Result<Element<'a>, MatError> {
    let element = read_element(reader, endian)?;
    if !expected.contains(&element.data_type) {
        return Err(MatError::InvalidData(format!(
            "expected {what} as one of {expected:?}, found {:?}",
            element.data_type
        )));
    }
    Ok(element)
}

pub(crate) fn take<'a>(reader: &mut &'a [u8], len: usize) -> Result<&'a [u8], MatError> {
    let slice: &'a [u8] = *reader;
    if slice.len() < len {
        return Err(MatError::Truncated {
            needed: len,
            available: slice.len(),
        });
    }
    let (head, tail) = slice.split_at(len);
    *reader = tail;
    Ok(head)
}

/// Inflate a whole `miCOMPRESSED` payload.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>, MatError> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| MatError::Decompression(e.to_string()))?;
    Ok(out)
}

/// Inflate at most `limit` bytes of a `miCOMPRESSED` payload.
pub fn inflate_prefix(data: &[u8], limit: u64) -> Result<Vec<u8>, MatError> {
    let mut decoder = ZlibDecoder::new(data).take(limit);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| MatError::Decompression(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
#[path = "element.test.rs"]
mod tests;
