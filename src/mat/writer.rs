//! In-memory Level 5 writer for building test fixtures.

use std::{io::Write, path::Path};

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use flate2::{Compression, write::ZlibEncoder};

use super::{
    array::MatClass,
    element::{DataType, Endian},
    file::{DESCRIPTION_LEN, HEADER_LEN},
};

const FLAG_COMPLEX: u32 = 0x0800;
const FLAG_GLOBAL: u32 = 0x0400;
const FLAG_LOGICAL: u32 = 0x0200;

#[derive(Debug, Clone)]
pub enum Node {
    /// Values given in column-major order, stored as `miDOUBLE`.
    Double { dims: Vec<usize>, values: Vec<f64> },
    /// Values of `class` stored with a (possibly narrower) `storage` type.
    Stored {
        class: MatClass,
        storage: DataType,
        dims: Vec<usize>,
        values: Vec<f64>,
    },
    Complex { dims: Vec<usize>, real: Vec<f64>, imag: Vec<f64> },
    Logical { dims: Vec<usize>, values: Vec<bool> },
    /// Rows of equal length.
    Char(Vec<String>),
    Cell { dims: Vec<usize>, cells: Vec<Node> },
    Struct {
        dims: Vec<usize>,
        fields: Vec<String>,
        elements: Vec<Vec<Node>>,
    },
    Object {
        class_name: String,
        fields: Vec<String>,
        values: Vec<Node>,
    },
    Sparse {
        rows: usize,
        cols: usize,
        entries: Vec<(usize, usize, f64)>,
    },
    Opaque { class_name: String },
    /// Zero-length `miMATRIX` element.
    Empty,
    Global(Box<Node>),
}

impl Node {
    pub fn scalar(value: f64) -> Self {
        Self::Double {
            dims: vec![1, 1],
            values: vec![value],
        }
    }

    pub fn row(values: &[f64]) -> Self {
        Self::Double {
            dims: vec![1, values.len()],
            values: values.to_vec(),
        }
    }

    pub fn column(values: &[f64]) -> Self {
        Self::Double {
            dims: vec![values.len(), 1],
            values: values.to_vec(),
        }
    }

    /// `rows x cols` matrix from row-major values.
    pub fn matrix(rows: usize, cols: usize, row_major: &[f64]) -> Self {
        let mut values = Vec::with_capacity(rows * cols);
        for c in 0..cols {
            for r in 0..rows {
                values.push(row_major[r * cols + c]);
            }
        }
        Self::Double {
            dims: vec![rows, cols],
            values,
        }
    }

    pub fn text(value: &str) -> Self {
        Self::Char(vec![value.to_string()])
    }

    /// `1xN` cell array of char vectors.
    pub fn cellstr(values: &[&str]) -> Self {
        Self::Cell {
            dims: vec![1, values.len()],
            cells: values.iter().map(|v| Self::text(v)).collect(),
        }
    }

    /// `1x1` struct with the given fields.
    pub fn record(fields: Vec<(&str, Node)>) -> Self {
        let (names, values): (Vec<String>, Vec<Node>) = fields.into_iter().map(|(n, v)| (n.to_string(), v)).unzip();
        Self::Struct {
            dims: vec![1, 1],
            fields: names,
            elements: vec![values],
        }
    }

    fn header(&self) -> (MatClass, u32, Vec<usize>, u32) {
        match self {
            Self::Double { dims, .. } => (MatClass::Double, 0, dims.clone(), 0),
            Self::Stored { class, dims, .. } => (*class, 0, dims.clone(), 0),
            Self::Complex { dims, .. } => (MatClass::Double, FLAG_COMPLEX, dims.clone(), 0),
            Self::Logical { dims, .. } => (MatClass::UInt8, FLAG_LOGICAL, dims.clone(), 0),
            Self::Char(rows) => {
                let cols = rows.first().map_or(0, |r| r.encode_utf16().count());
                (MatClass::Char, 0, vec![rows.len(), cols], 0)
            }
            Self::Cell { dims, .. } => (MatClass::Cell, 0, dims.clone(), 0),
            Self::Struct { dims, .. } => (MatClass::Struct, 0, dims.clone(), 0),
            Self::Object { .. } => (MatClass::Object, 0, vec![1, 1], 0),
            Self::Sparse { rows, cols, entries } => (MatClass::Sparse, 0, vec![*rows, *cols], entries.len() as u32),
            Self::Opaque { .. } => (MatClass::Opaque, 0, vec![1, 1], 0),
            Self::Empty => (MatClass::Double, 0, vec![0, 0], 0),
            Self::Global(inner) => {
                let (class, flags, dims, nzmax) = inner.header();
                (class, flags | FLAG_GLOBAL, dims, nzmax)
            }
        }
    }
}

pub struct MatWriter {
    endian: Endian,
    compress: bool,
    small_elements: bool,
    description: String,
    variables: Vec<(String, Node)>,
    subsystem: Option<Node>,
}

impl Default for MatWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl MatWriter {
    pub fn new() -> Self {
        Self {
            endian: Endian::Little,
            compress: false,
            small_elements: true,
            description: "MATLAB 5.0 MAT-file, Platform: GLNXA64, Created on: Sat Sep 13 10:00:00 2025".to_string(),
            variables: Vec::new(),
            subsystem: None,
        }
    }

    pub fn big_endian(mut self) -> Self {
        self.endian = Endian::Big;
        self
    }

    pub fn compressed(mut self) -> Self {
        self.compress = true;
        self
    }

    pub fn without_small_elements(mut self) -> Self {
        self.small_elements = false;
        self
    }

    pub fn description(mut self, text: &str) -> Self {
        self.description = text.to_string();
        self
    }

    pub fn variable(mut self, name: &str, node: Node) -> Self {
        self.variables.push((name.to_string(), node));
        self
    }

    /// Append an unnamed element and point the header's subsystem offset at it.
    pub fn subsystem(mut self, node: Node) -> Self {
        self.subsystem = Some(node);
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut description = self.description.clone().into_bytes();
        description.resize(DESCRIPTION_LEN, b' ');
        buf.extend_from_slice(&description);
        buf.extend_from_slice(&[0u8; 8]);
        self.put_u16(&mut buf, 0x0100);
        self.put_u16(&mut buf, u16::from_be_bytes(*b"MI"));
        assert_eq!(buf.len(), HEADER_LEN);

        for (name, node) in &self.variables {
            self.write_variable(&mut buf, name, node);
        }

        if let Some(node) = &self.subsystem {
            let offset = buf.len() as u64;
            self.write_variable(&mut buf, "", node);
            let bytes = match self.endian {
                Endian::Little => offset.to_le_bytes(),
                Endian::Big => offset.to_be_bytes(),
            };
            buf[DESCRIPTION_LEN..DESCRIPTION_LEN + 8].copy_from_slice(&bytes);
        }

        buf
    }

    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.to_bytes())
    }

    fn write_variable(&self, buf: &mut Vec<u8>, name: &str, node: &Node) {
        if self.compress {
            let mut element = Vec::new();
            self.write_matrix(&mut element, name, node);
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&element).unwrap();
            let compressed = encoder.finish().unwrap();
            self.put_u32(buf, DataType::Compressed.as_u32());
            self.put_u32(buf, compressed.len() as u32);
            buf.extend_from_slice(&compressed);
        } else {
            self.write_matrix(buf, name, node);
        }
    }

    fn write_matrix(&self, buf: &mut Vec<u8>, name: &str, node: &Node) {
        if matches!(node, Node::Empty) {
            self.put_u32(buf, DataType::Matrix.as_u32());
            self.put_u32(buf, 0);
            return;
        }
        let body = self.matrix_body(name, node);
        self.write_element(buf, DataType::Matrix, &body);
    }

    fn matrix_body(&self, name: &str, node: &Node) -> Vec<u8> {
        let mut body = Vec::new();
        let (class, flags, dims, nzmax) = node.header();

        let mut flag_bytes = Vec::new();
        self.put_u32(&mut flag_bytes, u32::from(class.as_u8()) | flags);
        self.put_u32(&mut flag_bytes, nzmax);
        self.write_element(&mut body, DataType::UInt32, &flag_bytes);

        if class != MatClass::Opaque {
            let mut dim_bytes = Vec::new();
            for d in &dims {
                self.put_u32(&mut dim_bytes, *d as u32);
            }
            self.write_element(&mut body, DataType::Int32, &dim_bytes);
        }
        self.write_element(&mut body, DataType::Int8, name.as_bytes());

        self.write_payload(&mut body, node);
        body
    }

    fn write_payload(&self, body: &mut Vec<u8>, node: &Node) {
        match node {
            Node::Double { values, .. } => {
                let bytes = self.encode(DataType::Double, values);
                self.write_element(body, DataType::Double, &bytes);
            }
            Node::Stored { storage, values, .. } => {
                let bytes = self.encode(*storage, values);
                self.write_element(body, *storage, &bytes);
            }
            Node::Complex { real, imag, .. } => {
                let bytes = self.encode(DataType::Double, real);
                self.write_element(body, DataType::Double, &bytes);
                let bytes = self.encode(DataType::Double, imag);
                self.write_element(body, DataType::Double, &bytes);
            }
            Node::Logical { values, .. } => {
                let bytes: Vec<u8> = values.iter().map(|&v| u8::from(v)).collect();
                self.write_element(body, DataType::UInt8, &bytes);
            }
            Node::Char(rows) => {
                let units: Vec<Vec<u16>> = rows.iter().map(|r| r.encode_utf16().collect()).collect();
                let cols = units.first().map_or(0, Vec::len);
                let mut column_major = Vec::with_capacity(rows.len() * cols);
                for c in 0..cols {
                    for row in &units {
                        column_major.push(f64::from(row[c]));
                    }
                }
                let bytes = self.encode(DataType::UInt16, &column_major);
                self.write_element(body, DataType::UInt16, &bytes);
            }
            Node::Cell { cells, .. } => {
                for cell in cells {
                    self.write_matrix(body, "", cell);
                }
            }
            Node::Struct { fields, elements, .. } => {
                self.write_struct_body(body, fields, elements);
            }
            Node::Object {
                class_name,
                fields,
                values,
            } => {
                self.write_element(body, DataType::Int8, class_name.as_bytes());
                self.write_struct_body(body, fields, std::slice::from_ref(values));
            }
            Node::Sparse { cols, entries, .. } => {
                let mut sorted = entries.clone();
                sorted.sort_by_key(|&(r, c, _)| (c, r));
                let rows: Vec<f64> = sorted.iter().map(|&(r, _, _)| r as f64).collect();
                let mut col_ptrs = vec![0f64; cols + 1];
                for &(_, c, _) in &sorted {
                    col_ptrs[c + 1] += 1.0;
                }
                for c in 0..*cols {
                    col_ptrs[c + 1] += col_ptrs[c];
                }
                let values: Vec<f64> = sorted.iter().map(|&(_, _, v)| v).collect();
                let bytes = self.encode(DataType::Int32, &rows);
                self.write_element(body, DataType::Int32, &bytes);
                let bytes = self.encode(DataType::Int32, &col_ptrs);
                self.write_element(body, DataType::Int32, &bytes);
                let bytes = self.encode(DataType::Double, &values);
                self.write_element(body, DataType::Double, &bytes);
            }
            Node::Opaque { class_name } => {
                self.write_element(body, DataType::Int8, b"MCOS");
                self.write_element(body, DataType::Int8, class_name.as_bytes());
                let refs = Node::Stored {
                    class: MatClass::UInt32,
                    storage: DataType::UInt32,
                    dims: vec![6, 1],
                    values: vec![3707764736.0, 2.0, 1.0, 1.0, 1.0, 1.0],
                };
                self.write_matrix(body, "", &refs);
            }
            Node::Empty => {}
            Node::Global(inner) => self.write_payload(body, inner),
        }
    }

    fn write_struct_body(&self, body: &mut Vec<u8>, fields: &[String], elements: &[Vec<Node>]) {
        let name_len = fields.iter().map(String::len).max().unwrap_or(0) + 1;
        let len_bytes = self.encode(DataType::Int32, &[name_len as f64]);
        self.write_element(body, DataType::Int32, &len_bytes);

        let mut names = Vec::with_capacity(name_len * fields.len());
        for field in fields {
            let mut bytes = field.clone().into_bytes();
            bytes.resize(name_len, 0);
            names.extend_from_slice(&bytes);
        }
        self.write_element(body, DataType::Int8, &names);

        for values in elements {
            for value in values {
                self.write_matrix(body, "", value);
            }
        }
    }

    fn write_element(&self, buf: &mut Vec<u8>, data_type: DataType, payload: &[u8]) {
        let small = self.small_elements && !payload.is_empty() && payload.len() <= 4 && data_type != DataType::Matrix;
        if small {
            self.put_u32(buf, ((payload.len() as u32) << 16) | data_type.as_u32());
            buf.extend_from_slice(payload);
            buf.resize(buf.len() + 4 - payload.len(), 0);
        } else {
            self.put_u32(buf, data_type.as_u32());
            self.put_u32(buf, payload.len() as u32);
            buf.extend_from_slice(payload);
            let padding = (8 - payload.len() % 8) % 8;
            buf.resize(buf.len() + padding, 0);
        }
    }

    fn encode(&self, storage: DataType, values: &[f64]) -> Vec<u8> {
        let mut out = Vec::new();
        for &v in values {
            match (storage, self.endian) {
                (DataType::Double, Endian::Little) => out.write_f64::<LittleEndian>(v).unwrap(),
                (DataType::Double, Endian::Big) => out.write_f64::<BigEndian>(v).unwrap(),
                (DataType::Single, Endian::Little) => out.write_f32::<LittleEndian>(v as f32).unwrap(),
                (DataType::Single, Endian::Big) => out.write_f32::<BigEndian>(v as f32).unwrap(),
                (DataType::Int8, _) => out.write_i8(v as i8).unwrap(),
                (DataType::UInt8, _) => out.write_u8(v as u8).unwrap(),
                (DataType::Int16, Endian::Little) => out.write_i16::<LittleEndian>(v as i16).unwrap(),
                (DataType::Int16, Endian::Big) => out.write_i16::<BigEndian>(v as i16).unwrap(),
                (DataType::UInt16, Endian::Little) => out.write_u16::<LittleEndian>(v as u16).unwrap(),
                (DataType::UInt16, Endian::Big) => out.write_u16::<BigEndian>(v as u16).unwrap(),
                (DataType::Int32, Endian::Little) => out.write_i32::<LittleEndian>(v as i32).unwrap(),
                (DataType::Int32, Endian::Big) => out.write_i32::<BigEndian>(v as i32).unwrap(),
                (DataType::UInt32, Endian::Little) => out.write_u32::<LittleEndian>(v as u32).unwrap(),
                (DataType::UInt32, Endian::Big) => out.write_u32::<BigEndian>(v as u32).unwrap(),
                (DataType::Int64, Endian::Little) => out.write_i64::<LittleEndian>(v as i64).unwrap(),
                (DataType::Int64, Endian::Big) => out.write_i64::<BigEndian>(v as i64).unwrap(),
                (DataType::UInt64, Endian::Little) => out.write_u64::<LittleEndian>(v as u64).unwrap(),
                (DataType::UInt64, Endian::Big) => out.write_u64::<BigEndian>(v as u64).unwrap(),
                (other, _) => panic!("cannot encode numeric values as {other:?}"),
            }
        }
        out
    }

    fn put_u16(&self, buf: &mut Vec<u8>, value: u16) {
        match self.endian {
            Endian::Little => buf.write_u16::<LittleEndian>(value).unwrap(),
            Endian::Big => buf.write_u16::<BigEndian>(value).unwrap(),
        }
    }

    fn put_u32(&self, buf: &mut Vec<u8>, value: u32) {
        match self.endian {
            Endian::Little => buf.write_u32::<LittleEndian>(value).unwrap(),
            Endian::Big => buf.write_u32::<BigEndian>(value).unwrap(),
        }
    }
}
