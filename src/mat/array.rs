use super::{
    MatError,
    element::{DataType, Element, Endian, TAG_LEN, read_element, read_expected},
    numeric::NumericData,
};

const FLAG_COMPLEX: u32 = 0x0800;
const FLAG_GLOBAL: u32 = 0x0400;
const FLAG_LOGICAL: u32 = 0x0200;

const INTEGER_TYPES: &[DataType] = &[
    DataType::Int8,
    DataType::UInt8,
    DataType::Int16,
    DataType::UInt16,
    DataType::Int32,
    DataType::UInt32,
    DataType::Int64,
    DataType::UInt64,
];

const NUMERIC_TYPES: &[DataType] = &[
    DataType::Double,
    DataType::Single,
    DataType::Int8,
    DataType::UInt8,
    DataType::Int16,
    DataType::UInt16,
    DataType::Int32,
    DataType::UInt32,
    DataType::Int64,
    DataType::UInt64,
];

const TEXT_TYPES: &[DataType] = &[
    DataType::Int8,
    DataType::UInt8,
    DataType::UInt16,
    DataType::Utf8,
    DataType::Utf16,
    DataType::Utf32,
];

/// `mx*` array classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatClass {
    Cell,
    Struct,
    Object,
    Char,
    Sparse,
    Double,
    Single,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Function,
    Opaque,
}

impl MatClass {
    pub fn from_u8(value: u8) -> Result<Self, MatError> {
        match value {
            1 => Ok(Self::Cell),
            2 => Ok(Self::Struct),
            3 => Ok(Self::Object),
            4 => Ok(Self::Char),
            5 => Ok(Self::Sparse),
            6 => Ok(Self::Double),
            7 => Ok(Self::Single),
            8 => Ok(Self::Int8),
            9 => Ok(Self::UInt8),
            10 => Ok(Self::Int16),
            11 => Ok(Self::UInt16),
            12 => Ok(Self::Int32),
            13 => Ok(Self::UInt32),
            14 => Ok(Self::Int64),
            15 => Ok(Self::UInt64),
            16 => Ok(Self::Function),
            17 => Ok(Self::Opaque),
            _ => Err(MatError::UnsupportedClass(value)),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Cell => 1,
            Self::Struct => 2,
            Self::Object => 3,
            Self::Char => 4,
            Self::Sparse => 5,
            Self::Double => 6,
            Self::Single => 7,
            Self::Int8 => 8,
            Self::UInt8 => 9,
            Self::Int16 => 10,
            Self::UInt16 => 11,
            Self::Int32 => 12,
            Self::UInt32 => 13,
            Self::Int64 => 14,
            Self::UInt64 => 15,
            Self::Function => 16,
            Self::Opaque => 17,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Double
                | Self::Single
                | Self::Int8
                | Self::UInt8
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
        )
    }

    /// MATLAB's name for the class, as `whos` and `class()` report it.
    pub fn label(self) -> &'static str {
        match self {
            Self::Cell => "cell",
            Self::Struct => "struct",
            Self::Object => "object",
            Self::Char => "char",
            Self::Sparse => "sparse",
            Self::Double => "double",
            Self::Single => "single",
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Function => "function_handle",
            Self::Opaque => "opaque",
        }
    }
}

/// Decoded contents of the array flags, dimensions and name subelements.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayHeader {
    pub class: MatClass,
    pub is_complex: bool,
    pub is_global: bool,
    pub is_logical: bool,
    pub nzmax: u32,
    pub dims: Vec<usize>,
    pub name: String,
}

impl ArrayHeader {
    /// Class label including the logical refinement of `uint8`.
    pub fn class_label(&self) -> &'static str {
        if self.is_logical { "logical" } else { self.class.label() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    pub class: MatClass,
    pub dims: Vec<usize>,
    pub real: NumericData,
    pub imag: Option<NumericData>,
    pub logical: bool,
}

/// Character array; `data` is column-major like every MATLAB array.
#[derive(Debug, Clone, PartialEq)]
pub struct CharArray {
    pub dims: Vec<usize>,
    pub data: Vec<char>,
}

impl CharArray {
    /// One string per row. Trailing dimensions beyond the second are folded into columns.
    pub fn rows(&self) -> Vec<String> {
        let rows = self.dims.first().copied().unwrap_or(0);
        if rows == 0 {
            return Vec::new();
        }
        let cols = self.data.len() / rows;
        (0..rows)
            .map(|r| (0..cols).map(|c| self.data[r + c * rows]).collect())
            .collect()
    }

    /// The whole array as a single string, for the common `1xN` case.
    pub fn as_string(&self) -> String {
        self.rows().join("\n")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellArray {
    pub dims: Vec<usize>,
    pub cells: Vec<MatArray>,
}

/// Struct array. `elements[i][f]` is field `field_names[f]` of element `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct StructArray {
    pub dims: Vec<usize>,
    /// Set for `mxOBJECT_CLASS` arrays.
    pub class_name: Option<String>,
    pub field_names: Vec<String>,
    pub elements: Vec<Vec<MatArray>>,
}

impl StructArray {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.field_names.iter().position(|f| f == name)
    }

    pub fn get(&self, index: usize, field: &str) -> Option<&MatArray> {
        let field = self.field_index(field)?;
        self.elements.get(index).and_then(|values| values.get(field))
    }
}

/// Compressed-column sparse matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseArray {
    pub dims: Vec<usize>,
    pub row_indices: Vec<usize>,
    pub col_ptrs: Vec<usize>,
    pub real: Vec<f64>,
    pub imag: Option<Vec<f64>>,
    pub logical: bool,
}

impl SparseArray {
    /// Dense column-major values of the real part.
    pub fn to_dense(&self) -> Result<Vec<f64>, MatError> {
        let rows = self.dims.first().copied().unwrap_or(0);
        let cols = self.dims.get(1).copied().unwrap_or(0);
        let len = rows
            .checked_mul(cols)
            .ok_or_else(|| MatError::InvalidData(format!("sparse matrix {rows}x{cols} is too large to densify")))?;
        let mut dense = Vec::new();
        dense
            .try_reserve_exact(len)
            .map_err(|e| MatError::InvalidData(format!("sparse matrix {rows}x{cols} is too large to densify: {e}")))?;
        dense.resize(len, 0.0);
        for col in 0..cols.min(self.col_ptrs.len().saturating_sub(1)) {
            for k in self.col_ptrs[col]..self.col_ptrs[col + 1] {
                if let (Some(&row), Some(&value)) = (self.row_indices.get(k), self.real.get(k))
                    && row < rows
                {
                    dense[row + col * rows] = value;
                }
            }
        }
        Ok(dense)
    }
}

/// MCOS object (`string`, `categorical`, ...) whose payload lives in the
/// subsystem data and is not interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueArray {
    pub type_system: String,
    pub class_name: String,
}

/// Any value stored in a MAT-file.
#[derive(Debug, Clone, PartialEq)]
pub enum MatArray {
    Numeric(NumericArray),
    Char(CharArray),
    Cell(CellArray),
    Struct(StructArray),
    Sparse(SparseArray),
    Opaque(OpaqueArray),
}

impl MatArray {
    /// The `0x0` double MATLAB writes as a zero-length matrix element.
    pub fn empty() -> Self {
        Self::Numeric(NumericArray {
            class: MatClass::Double,
            dims: vec![0, 0],
            real: NumericData::F64(Vec::new()),
            imag: None,
            logical: false,
        })
    }

    pub fn dims(&self) -> &[usize] {
        match self {
            Self::Numeric(a) => &a.dims,
            Self::Char(a) => &a.dims,
            Self::Cell(a) => &a.dims,
            Self::Struct(a) => &a.dims,
            Self::Sparse(a) => &a.dims,
            Self::Opaque(_) => &[1, 1],
        }
    }

    pub fn numel(&self) -> usize {
        self.dims().iter().fold(1, |acc, &d| acc.saturating_mul(d))
    }

    pub fn class_label(&self) -> &'static str {
        match self {
            Self::Numeric(a) if a.logical => "logical",
            Self::Numeric(a) => a.class.label(),
            Self::Char(_) => "char",
            Self::Cell(_) => "cell",
            Self::Struct(a) if a.class_name.is_some() => "object",
            Self::Struct(_) => "struct",
            Self::Sparse(_) => "sparse",
            Self::Opaque(_) => "opaque",
        }
    }

    pub fn as_struct(&self) -> Option<&StructArray> {
        match self {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_cell(&self) -> Option<&CellArray> {
        match self {
            Self::Cell(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<&CharArray> {
        match self {
            Self::Char(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_numeric(&self) -> Option<&NumericArray> {
        match self {
            Self::Numeric(n) => Some(n),
            _ => None,
        }
    }
}

/// Read the flags, dimensions and name at the start of an `miMATRIX` payload.
pub fn read_array_header(reader: &mut &[u8], endian: Endian) -> Result<ArrayHeader, MatError> {
    let flags = read_expected(reader, endian, &[DataType::UInt32], "array flags")?;
    if flags.data.len() < 8 {
        return Err(MatError::InvalidData(format!("array flags hold {} bytes, need 8", flags.data.len())));
    }
    let flags_word = endian.u32_from(&flags.data[0..4]);
    let nzmax = endian.u32_from(&flags.data[4..8]);
    let class = MatClass::from_u8((flags_word & 0xFF) as u8)?;

    // Opaque arrays go straight from the flags to the name.
    let dims = if class == MatClass::Opaque && next_is_text(*reader, endian) {
        vec![1, 1]
    } else {
        let dims = read_expected(reader, endian, INTEGER_TYPES, "dimensions")?;
        decode_dims(dims, endian)?
    };

    let name = read_expected(reader, endian, &[DataType::Int8, DataType::UInt8], "array name")?;
    let name = String::from_utf8_lossy(name.data).into_owned();

    Ok(ArrayHeader {
        class,
        is_complex: flags_word & FLAG_COMPLEX != 0,
        is_global: flags_word & FLAG_GLOBAL != 0,
        is_logical: flags_word & FLAG_LOGICAL != 0,
        nzmax,
        dims,
        name,
    })
}

/// Decode an `miMATRIX` payload into its name and value.
pub fn parse_matrix(data: &[u8], endian: Endian) -> Result<(String, MatArray), MatError> {
    if data.is_empty() {
        return Ok((String::new(), MatArray::empty()));
    }

    let mut reader = data;
    let header = read_array_header(&mut reader, endian)?;
    let numel = checked_numel(&header.dims)?;

    let array = match header.class {
        MatClass::Cell => {
            ensure_elements(reader, numel)?;
            let mut cells = Vec::with_capacity(numel);
            for _ in 0..numel {
                cells.push(read_nested(&mut reader, endian)?);
            }
            MatArray::Cell(CellArray { dims: header.dims, cells })
        }
        MatClass::Struct => {
            let (field_names, elements) = read_struct_body(&mut reader, endian, numel)?;
            MatArray::Struct(StructArray {
                dims: header.dims,
                class_name: None,
                field_names,
                elements,
            })
        }
        MatClass::Object => {
            let class_name = read_expected(&mut reader, endian, &[DataType::Int8, DataType::UInt8], "object class name")?;
            let class_name = String::from_utf8_lossy(class_name.data).into_owned();
            let (field_names, elements) = read_struct_body(&mut reader, endian, numel)?;
            MatArray::Struct(StructArray {
                dims: header.dims,
                class_name: Some(class_name),
                field_names,
                elements,
            })
        }
        MatClass::Char => {
            let text = read_expected(&mut reader, endian, TEXT_TYPES, "character data")?;
            MatArray::Char(CharArray {
                dims: header.dims,
                data: decode_chars(text, endian)?,
            })
        }
        MatClass::Sparse => MatArray::Sparse(read_sparse(&mut reader, endian, &header)?),
        MatClass::Opaque => {
            let type_system = read_expected(&mut reader, endian, &[DataType::Int8, DataType::UInt8], "opaque type system")?;
            let class_name = read_expected(&mut reader, endian, &[DataType::Int8, DataType::UInt8], "opaque class name")?;
            MatArray::Opaque(OpaqueArray {
                type_system: String::from_utf8_lossy(type_system.data).into_owned(),
                class_name: String::from_utf8_lossy(class_name.data).into_owned(),
            })
        }
        class if class.is_numeric() => {
            let real = read_expected(&mut reader, endian, NUMERIC_TYPES, "real part")?;
            let real = NumericData::decode(real.data_type, real.data, endian)?.cast(class)?;
            let imag = if header.is_complex {
                let imag = read_expected(&mut reader, endian, NUMERIC_TYPES, "imaginary part")?;
                Some(NumericData::decode(imag.data_type, imag.data, endian)?.cast(class)?)
            } else {
                None
            };
            if real.len() != numel {
                return Err(MatError::InvalidData(format!(
                    "array '{}' has {} values for dimensions {:?}",
                    header.name,
                    real.len(),
                    header.dims
                )));
            }
            MatArray::Numeric(NumericArray {
                class,
                dims: header.dims,
                real,
                imag,
                logical: header.is_logical,
            })
        }
        class => return Err(MatError::UnsupportedClass(class.as_u8())),
    };

    Ok((header.name, array))
}

fn checked_numel(dims: &[usize]) -> Result<usize, MatError> {
    dims.iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| MatError::InvalidData(format!("dimensions {dims:?} overflow the element count")))
}

/// Every nested element needs at least a tag, so `count` of them cannot fit in
/// fewer than `count * TAG_LEN` bytes.
fn ensure_elements(reader: &[u8], count: usize) -> Result<(), MatError> {
    if count > reader.len() / TAG_LEN {
        return Err(MatError::Truncated {
            needed: count.saturating_mul(TAG_LEN),
            available: reader.len(),
        });
    }
    Ok(())
}

fn next_is_text(reader: &[u8], endian: Endian) -> bool {
    let mut probe = reader;
    read_element(&mut probe, endian).is_ok_and(|element| element.data_type == DataType::Int8)
}

fn read_nested(reader: &mut &[u8], endian: Endian) -> Result<MatArray, MatError> {
    let element = read_expected(reader, endian, &[DataType::Matrix], "nested array")?;
    let (_, array) = parse_matrix(element.data, endian)?;
    Ok(array)
}

fn read_struct_body(reader: &mut &[u8], endian: Endian, numel: usize) -> Result<(Vec<String>, Vec<Vec<MatArray>>), MatError> {
    let name_len = read_expected(reader, endian, INTEGER_TYPES, "field name length")?;
    let name_len = NumericData::decode(name_len.data_type, name_len.data, endian)?
        .to_i64_vec()
        .first()
        .copied()
        .unwrap_or(0);
    let name_len = usize::try_from(name_len).map_err(|_| MatError::InvalidData(format!("field name length {name_len}")))?;

    let names = read_expected(reader, endian, &[DataType::Int8, DataType::UInt8], "field names")?;
    let field_names: Vec<String> = if name_len == 0 {
        Vec::new()
    } else {
        names
            .data
            .chunks(name_len)
            .map(|chunk| {
                let end = chunk.iter().position(|&b| b == 0).unwrap_or(chunk.len());
                String::from_utf8_lossy(&chunk[..end]).into_owned()
            })
            .collect()
    };

    let values_needed = numel
        .checked_mul(field_names.len())
        .ok_or_else(|| MatError::InvalidData(format!("{numel} elements of {} fields overflow", field_names.len())))?;
    ensure_elements(*reader, values_needed)?;

    let mut elements = Vec::new();
    elements
        .try_reserve_exact(numel)
        .map_err(|e| MatError::InvalidData(format!("struct array of {numel} elements: {e}")))?;
    for _ in 0..numel {
        let mut values = Vec::with_capacity(field_names.len());
        for _ in 0..field_names.len() {
            values.push(read_nested(reader, endian)?);
        }
        elements.push(values);
    }

    Ok((field_names, elements))
}

fn read_sparse(reader: &mut &[u8], endian: Endian, header: &ArrayHeader) -> Result<SparseArray, MatError> {
    let ir = read_expected(reader, endian, INTEGER_TYPES, "sparse row indices")?;
    let jc = read_expected(reader, endian, INTEGER_TYPES, "sparse column pointers")?;
    let row_indices = to_indices(NumericData::decode(ir.data_type, ir.data, endian)?, "row index")?;
    let col_ptrs = to_indices(NumericData::decode(jc.data_type, jc.data, endian)?, "column pointer")?;

    let nnz = col_ptrs.last().copied().unwrap_or(0);
    let pr = read_expected(reader, endian, NUMERIC_TYPES, "sparse values")?;
    let mut real = NumericData::decode(pr.data_type, pr.data, endian)?.to_f64_vec();
    real.truncate(nnz);

    let imag = if header.is_complex {
        let pi = read_expected(reader, endian, NUMERIC_TYPES, "sparse imaginary values")?;
        let mut imag = NumericData::decode(pi.data_type, pi.data, endian)?.to_f64_vec();
        imag.truncate(nnz);
        Some(imag)
    } else {
        None
    };

    Ok(SparseArray {
        dims: header.dims.clone(),
        row_indices,
        col_ptrs,
        real,
        imag,
        logical: header.is_logical,
    })
}

fn decode_dims(element: Element<'_>, endian: Endian) -> Result<Vec<usize>, MatError> {
    to_indices(NumericData::decode(element.data_type, element.data, endian)?, "dimension")
}

fn to_indices(data: NumericData, what: &str) -> Result<Vec<usize>, MatError> {
    data.to_i64_vec()
        .into_iter()
        .map(|v| usize::try_from(v).map_err(|_| MatError::InvalidData(format!("negative {what}: {v}"))))
        .collect()
}

fn decode_chars(element: Element<'_>, endian: Endian) -> Result<Vec<char>, MatError> {
    let chars = match element.data_type {
        DataType::Utf8 | DataType::UInt8 | DataType::Int8 => String::from_utf8_lossy(element.data).chars().collect(),
        DataType::UInt16 | DataType::Utf16 => {
            let units = match NumericData::decode(element.data_type, element.data, endian)? {
                NumericData::U16(units) => units,
                other => return Err(MatError::InvalidData(format!("UTF-16 text decoded as {}", other.type_name()))),
            };
            char::decode_utf16(units)
                .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect()
        }
        DataType::Utf32 => match NumericData::decode(element.data_type, element.data, endian)? {
            NumericData::U32(points) => points
                .into_iter()
                .map(|p| char::from_u32(p).unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect(),
            other => return Err(MatError::InvalidData(format!("UTF-32 text decoded as {}", other.type_name()))),
        },
        other => return Err(MatError::InvalidData(format!("{other:?} cannot hold character data"))),
    };
    Ok(chars)
}

#[cfg(test)]
#[path = "array.test.rs"]
mod tests;
