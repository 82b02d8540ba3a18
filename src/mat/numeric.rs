use byteorder::{BigEndian, ByteOrder, LittleEndian};
use num_traits::AsPrimitive;

use super::{
    MatError,
    array::MatClass,
    element::{DataType, Endian},
};

/// Numeric payload in its native element type.
///
/// MATLAB is free to store an array in a narrower type than its class (an
/// integral `double` array is often written as `miUINT8`), so the payload is
/// first decoded with the storage type and then widened with [`NumericData::cast`].
#[derive(Debug, Clone, PartialEq)]
pub enum NumericData {
    F64(Vec<f64>),
    F32(Vec<f32>),
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    I32(Vec<i32>),
    U32(Vec<u32>),
    I64(Vec<i64>),
    U64(Vec<u64>),
}

macro_rules! map_numeric {
    ($data:expr, $values:ident => $body:expr) => {
        match $data {
            NumericData::F64($values) => $body,
            NumericData::F32($values) => $body,
            NumericData::I8($values) => $body,
            NumericData::U8($values) => $body,
            NumericData::I16($values) => $body,
            NumericData::U16($values) => $body,
            NumericData::I32($values) => $body,
            NumericData::U32($values) => $body,
            NumericData::I64($values) => $body,
            NumericData::U64($values) => $body,
        }
    };
}

macro_rules! decode_with {
    ($bytes:expr, $endian:expr, $ty:ty, $read_into:ident) => {{
        let mut out = vec![<$ty>::default(); $bytes.len() / std::mem::size_of::<$ty>()];
        match $endian {
            Endian::Little => LittleEndian::$read_into($bytes, &mut out),
            Endian::Big => BigEndian::$read_into($bytes, &mut out),
        }
        out
    }};
}

fn cast_vec<S, T>(values: &[S]) -> Vec<T>
where
    S: AsPrimitive<T>,
    T: Copy + 'static,
{
    values.iter().map(|v| v.as_()).collect()
}

impl NumericData {
    /// Decode a payload stored as `data_type`.
    pub fn decode(data_type: DataType, bytes: &[u8], endian: Endian) -> Result<Self, MatError> {
        let size = data_type.element_size();
        if !bytes.len().is_multiple_of(size) {
            return Err(MatError::InvalidData(format!(
                "{:?} payload of {} bytes is not a multiple of {size}",
                data_type,
                bytes.len()
            )));
        }

        let data = match data_type {
            DataType::Double => Self::F64(decode_with!(bytes, endian, f64, read_f64_into)),
            DataType::Single => Self::F32(decode_with!(bytes, endian, f32, read_f32_into)),
            DataType::Int8 => Self::I8(bytes.iter().map(|&b| b as i8).collect()),
            DataType::UInt8 | DataType::Utf8 => Self::U8(bytes.to_vec()),
            DataType::Int16 => Self::I16(decode_with!(bytes, endian, i16, read_i16_into)),
            DataType::UInt16 | DataType::Utf16 => Self::U16(decode_with!(bytes, endian, u16, read_u16_into)),
            DataType::Int32 => Self::I32(decode_with!(bytes, endian, i32, read_i32_into)),
            DataType::UInt32 | DataType::Utf32 => Self::U32(decode_with!(bytes, endian, u32, read_u32_into)),
            DataType::Int64 => Self::I64(decode_with!(bytes, endian, i64, read_i64_into)),
            DataType::UInt64 => Self::U64(decode_with!(bytes, endian, u64, read_u64_into)),
            DataType::Matrix | DataType::Compressed => {
                return Err(MatError::InvalidData(format!("{data_type:?} element cannot hold numeric data")));
            }
        };
        Ok(data)
    }

    /// Convert to the element type of a numeric array class.
    pub fn cast(self, class: MatClass) -> Result<Self, MatError> {
        let data = match class {
            MatClass::Double => match self {
                Self::F64(v) => Self::F64(v),
                other => Self::F64(map_numeric!(&other, v => cast_vec(v))),
            },
            MatClass::Single => match self {
                Self::F32(v) => Self::F32(v),
                other => Self::F32(map_numeric!(&other, v => cast_vec(v))),
            },
            MatClass::Int8 => Self::I8(map_numeric!(&self, v => cast_vec(v))),
            MatClass::UInt8 => match self {
                Self::U8(v) => Self::U8(v),
                other => Self::U8(map_numeric!(&other, v => cast_vec(v))),
            },
            MatClass::Int16 => Self::I16(map_numeric!(&self, v => cast_vec(v))),
            MatClass::UInt16 => Self::U16(map_numeric!(&self, v => cast_vec(v))),
            MatClass::Int32 => Self::I32(map_numeric!(&self, v => cast_vec(v))),
            MatClass::UInt32 => Self::U32(map_numeric!(&self, v => cast_vec(v))),
            MatClass::Int64 => Self::I64(map_numeric!(&self, v => cast_vec(v))),
            MatClass::UInt64 => Self::U64(map_numeric!(&self, v => cast_vec(v))),
            other => return Err(MatError::InvalidData(format!("{other:?} is not a numeric class"))),
        };
        Ok(data)
    }

    pub fn len(&self) -> usize {
        map_numeric!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_f32_vec(&self) -> Vec<f32> {
        map_numeric!(self, v => cast_vec(v))
    }

    pub fn to_f64_vec(&self) -> Vec<f64> {
        map_numeric!(self, v => cast_vec(v))
    }

    /// Integer view used for dimensions and index vectors.
    pub fn to_i64_vec(&self) -> Vec<i64> {
        map_numeric!(self, v => cast_vec(v))
    }

    /// Label for the element type, following numpy's dtype names.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::F64(_) => "float64",
            Self::F32(_) => "float32",
            Self::I8(_) => "int8",
            Self::U8(_) => "uint8",
            Self::I16(_) => "int16",
            Self::U16(_) => "uint16",
            Self::I32(_) => "int32",
            Self::U32(_) => "uint32",
            Self::I64(_) => "int64",
            Self::U64(_) => "uint64",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_little_and_big_endian_doubles() {
        let le: Vec<u8> = [1.5f64, -2.0].iter().flat_map(|v| v.to_le_bytes()).collect();
        let be: Vec<u8> = [1.5f64, -2.0].iter().flat_map(|v| v.to_be_bytes()).collect();

        assert_eq!(NumericData::decode(DataType::Double, &le, Endian::Little).unwrap(), NumericData::F64(vec![1.5, -2.0]));
        assert_eq!(NumericData::decode(DataType::Double, &be, Endian::Big).unwrap(), NumericData::F64(vec![1.5, -2.0]));
    }

    #[test]
    fn rejects_partial_values() {
        let err = NumericData::decode(DataType::Int32, &[0, 1, 2], Endian::Little).unwrap_err();
        assert!(matches!(err, MatError::InvalidData(_)));
    }

    #[test]
    fn widens_compact_storage_to_array_class() {
        let stored = NumericData::decode(DataType::UInt8, &[1, 2, 255], Endian::Little).unwrap();
        let widened = stored.cast(MatClass::Double).unwrap();
        assert_eq!(widened, NumericData::F64(vec![1.0, 2.0, 255.0]));
    }

    #[test]
    fn signed_storage_keeps_sign_when_widened() {
        let bytes: Vec<u8> = [-3i16, 7].iter().flat_map(|v| v.to_le_bytes()).collect();
        let stored = NumericData::decode(DataType::Int16, &bytes, Endian::Little).unwrap();
        assert_eq!(stored.clone().cast(MatClass::Int32).unwrap(), NumericData::I32(vec![-3, 7]));
        assert_eq!(stored.to_f32_vec(), vec![-3.0, 7.0]);
    }

    #[test]
    fn cast_to_non_numeric_class_fails() {
        let err = NumericData::U8(vec![1]).cast(MatClass::Struct).unwrap_err();
        assert!(matches!(err, MatError::InvalidData(_)));
    }
}
