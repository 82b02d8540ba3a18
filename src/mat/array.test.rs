#![cfg(test)]

use super::*;
use crate::mat::{
    MatFile,
    file::HEADER_LEN,
    writer::{MatWriter, Node},
};

fn parse_with(writer: MatWriter, endian: Endian) -> Result<(String, MatArray), MatError> {
    let bytes = writer.to_bytes();
    let mut reader = &bytes[HEADER_LEN..];
    let element = read_element(&mut reader, endian)?;
    parse_matrix(element.data, endian)
}

fn parse_single(node: Node) -> MatArray {
    let (name, array) = parse_with(MatWriter::new().variable("v", node), Endian::Little).unwrap();
    assert_eq!(name, "v");
    array
}

#[test]
fn reads_double_matrix_in_column_major_order() {
    let array = parse_single(Node::matrix(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
    let numeric = array.as_numeric().unwrap();
    assert_eq!(numeric.class, MatClass::Double);
    assert_eq!(numeric.dims, vec![2, 3]);
    assert_eq!(numeric.real, NumericData::F64(vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]));
    assert_eq!(array.class_label(), "double");
}

#[test]
fn widens_narrow_storage_to_class() {
    let array = parse_single(Node::Stored {
        class: MatClass::Double,
        storage: DataType::UInt8,
        dims: vec![1, 3],
        values: vec![2.0, 4.0, 200.0],
    });
    assert_eq!(array.as_numeric().unwrap().real, NumericData::F64(vec![2.0, 4.0, 200.0]));
}

#[test]
fn reads_integer_class() {
    let array = parse_single(Node::Stored {
        class: MatClass::Int32,
        storage: DataType::Int16,
        dims: vec![1, 2],
        values: vec![-5.0, 9.0],
    });
    let numeric = array.as_numeric().unwrap();
    assert_eq!(numeric.class, MatClass::Int32);
    assert_eq!(numeric.real, NumericData::I32(vec![-5, 9]));
}

#[test]
fn reads_big_endian_arrays() {
    let writer = MatWriter::new().big_endian().variable("b", Node::row(&[0.25, -8.0]));
    let (name, array) = parse_with(writer, Endian::Big).unwrap();
    assert_eq!(name, "b");
    assert_eq!(array.as_numeric().unwrap().real, NumericData::F64(vec![0.25, -8.0]));
}

#[test]
fn regular_tags_parse_like_small_ones() {
    let writer = MatWriter::new().without_small_elements().variable("v", Node::text("ab"));
    let (name, array) = parse_with(writer, Endian::Little).unwrap();
    assert_eq!(name, "v");
    assert_eq!(array.as_char().unwrap().as_string(), "ab");
}

#[test]
fn char_array_rows() {
    let array = parse_single(Node::Char(vec!["abc".into(), "xyz".into()]));
    let chars = array.as_char().unwrap();
    assert_eq!(chars.dims, vec![2, 3]);
    assert_eq!(chars.rows(), vec!["abc".to_string(), "xyz".to_string()]);
}

#[test]
fn cell_array_of_strings() {
    let array = parse_single(Node::cellstr(&["x1", "x2", "x3"]));
    let cell = array.as_cell().unwrap();
    assert_eq!(cell.dims, vec![1, 3]);
    let names: Vec<String> = cell.cells.iter().map(|c| c.as_char().unwrap().as_string()).collect();
    assert_eq!(names, vec!["x1", "x2", "x3"]);
}

#[test]
fn struct_fields_by_name() {
    let array = parse_single(Node::record(vec![
        ("Bias", Node::scalar(-0.5)),
        ("Name", Node::text("svm")),
    ]));
    let record = array.as_struct().unwrap();
    assert_eq!(record.field_names, vec!["Bias", "Name"]);
    assert_eq!(record.len(), 1);
    assert_eq!(record.class_name, None);
    assert_eq!(
        record.get(0, "Bias").and_then(MatArray::as_numeric).map(|n| n.real.clone()),
        Some(NumericData::F64(vec![-0.5]))
    );
    assert!(record.get(0, "Missing").is_none());
}

#[test]
fn struct_array_elements() {
    let array = parse_single(Node::Struct {
        dims: vec![1, 2],
        fields: vec!["a".into()],
        elements: vec![vec![Node::scalar(1.0)], vec![Node::scalar(2.0)]],
    });
    let records = array.as_struct().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records.get(1, "a").unwrap().as_numeric().unwrap().real, NumericData::F64(vec![2.0]));
}

#[test]
fn object_keeps_class_name() {
    let array = parse_single(Node::Object {
        class_name: "ClassificationSVM".into(),
        fields: vec!["Impl".into()],
        values: vec![Node::record(vec![("Bias", Node::scalar(1.0))])],
    });
    assert_eq!(array.class_label(), "object");
    let object = array.as_struct().unwrap();
    assert_eq!(object.class_name.as_deref(), Some("ClassificationSVM"));
    assert!(object.get(0, "Impl").and_then(MatArray::as_struct).is_some());
}

#[test]
fn sparse_matrix_densifies() {
    let array = parse_single(Node::Sparse {
        rows: 3,
        cols: 2,
        entries: vec![(0, 0, 1.0), (2, 0, 3.0), (1, 1, 5.0)],
    });
    let MatArray::Sparse(sparse) = array else {
        panic!("expected sparse array");
    };
    assert_eq!(sparse.col_ptrs, vec![0, 2, 3]);
    assert_eq!(sparse.to_dense().unwrap(), vec![1.0, 0.0, 3.0, 0.0, 5.0, 0.0]);
}

#[test]
fn complex_values_keep_imaginary_part() {
    let array = parse_single(Node::Complex {
        dims: vec![1, 2],
        real: vec![1.0, 2.0],
        imag: vec![-1.0, 0.5],
    });
    let numeric = array.as_numeric().unwrap();
    assert_eq!(numeric.imag, Some(NumericData::F64(vec![-1.0, 0.5])));
}

#[test]
fn logical_arrays_are_labelled() {
    let array = parse_single(Node::Logical {
        dims: vec![1, 3],
        values: vec![true, false, true],
    });
    assert_eq!(array.class_label(), "logical");
    assert_eq!(array.as_numeric().unwrap().real, NumericData::U8(vec![1, 0, 1]));
}

#[test]
fn empty_matrix_element_is_zero_by_zero_double() {
    let array = parse_single(Node::Cell {
        dims: vec![1, 1],
        cells: vec![Node::Empty],
    });
    let cell = array.as_cell().unwrap();
    assert_eq!(cell.cells[0], MatArray::empty());
    assert_eq!(cell.cells[0].dims(), &[0, 0]);
}

#[test]
fn opaque_object_has_no_dimensions_element() {
    let array = parse_single(Node::Opaque {
        class_name: "string".into(),
    });
    let MatArray::Opaque(opaque) = &array else {
        panic!("expected opaque array");
    };
    assert_eq!(opaque.type_system, "MCOS");
    assert_eq!(opaque.class_name, "string");
    assert_eq!(array.dims(), &[1, 1]);
}

#[test]
fn header_reports_flags() {
    let bytes = MatWriter::new()
        .variable("g", Node::Global(Box::new(Node::row(&[1.0, 2.0]))))
        .to_bytes();
    let mut reader = &bytes[HEADER_LEN..];
    let element = read_element(&mut reader, Endian::Little).unwrap();
    let mut body = element.data;
    let header = read_array_header(&mut body, Endian::Little).unwrap();
    assert_eq!(header.name, "g");
    assert_eq!(header.dims, vec![1, 2]);
    assert!(header.is_global);
    assert!(!header.is_complex);
    assert_eq!(header.class_label(), "double");
}

#[test]
fn function_handles_are_unsupported() {
    let mut body = Vec::new();
    body.extend_from_slice(&6u32.to_le_bytes());
    body.extend_from_slice(&8u32.to_le_bytes());
    body.extend_from_slice(&16u32.to_le_bytes());
    body.extend_from_slice(&0u32.to_le_bytes());
    body.extend_from_slice(&5u32.to_le_bytes());
    body.extend_from_slice(&8u32.to_le_bytes());
    body.extend_from_slice(&1i32.to_le_bytes());
    body.extend_from_slice(&1i32.to_le_bytes());
    body.extend_from_slice(&((1u32 << 16) | 1).to_le_bytes());
    body.extend_from_slice(b"f\0\0\0");

    let err = parse_matrix(&body, Endian::Little).unwrap_err();
    assert!(matches!(err, MatError::UnsupportedClass(16)));
}

#[test]
fn unknown_class_code_is_rejected() {
    let mut body = Vec::new();
    body.extend_from_slice(&6u32.to_le_bytes());
    body.extend_from_slice(&8u32.to_le_bytes());
    body.extend_from_slice(&42u32.to_le_bytes());
    body.extend_from_slice(&0u32.to_le_bytes());

    let err = parse_matrix(&body, Endian::Little).unwrap_err();
    assert!(matches!(err, MatError::UnsupportedClass(42)));
}

#[test]
fn value_count_must_match_dimensions() {
    let array = parse_with(
        MatWriter::new().variable(
            "v",
            Node::Double {
                dims: vec![2, 2],
                values: vec![1.0, 2.0],
            },
        ),
        Endian::Little,
    );
    assert!(matches!(array, Err(MatError::InvalidData(_))));
}

fn tagged(data_type: DataType, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&data_type.as_u32().to_le_bytes());
    bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    bytes.extend_from_slice(payload);
    bytes.resize(bytes.len() + (TAG_LEN - payload.len() % TAG_LEN) % TAG_LEN, 0);
    bytes
}

fn int32s(values: &[i32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Array flags, dimensions and name of a matrix body, with nothing after them.
fn body_header(class: MatClass, dims_type: DataType, dims: &[u8]) -> Vec<u8> {
    let mut flags = (class.as_u8() as u32).to_le_bytes().to_vec();
    flags.extend_from_slice(&0u32.to_le_bytes());

    let mut body = tagged(DataType::UInt32, &flags);
    body.extend_from_slice(&tagged(dims_type, dims));
    body.extend_from_slice(&tagged(DataType::Int8, b"v"));
    body
}

#[test]
fn huge_cell_dimensions_without_cells_are_rejected() {
    let body = body_header(MatClass::Cell, DataType::Int32, &int32s(&[i32::MAX, i32::MAX]));
    assert!(matches!(
        parse_matrix(&body, Endian::Little),
        Err(MatError::Truncated { .. } | MatError::InvalidData(_))
    ));

    let mut bytes = MatWriter::new().to_bytes();
    bytes.extend_from_slice(&tagged(DataType::Matrix, &body));
    assert!(MatFile::from_bytes(&bytes).is_err());
}

#[test]
fn dimension_product_overflow_is_invalid() {
    let dims: Vec<u8> = [u32::MAX; 3].iter().flat_map(|v| v.to_le_bytes()).collect();
    let body = body_header(MatClass::Double, DataType::UInt32, &dims);
    assert!(matches!(parse_matrix(&body, Endian::Little), Err(MatError::InvalidData(_))));
}

#[test]
fn cell_with_fewer_cells_than_dimensions_is_truncated() {
    let mut body = body_header(MatClass::Cell, DataType::Int32, &int32s(&[1, 3]));
    body.extend_from_slice(&tagged(DataType::Matrix, &[]));
    assert!(matches!(parse_matrix(&body, Endian::Little), Err(MatError::Truncated { .. })));
}

#[test]
fn negative_field_name_length_is_invalid() {
    let mut body = body_header(MatClass::Struct, DataType::Int32, &int32s(&[1, 1]));
    body.extend_from_slice(&tagged(DataType::Int32, &int32s(&[-4])));
    body.extend_from_slice(&tagged(DataType::Int8, b"abc\0"));
    assert!(matches!(parse_matrix(&body, Endian::Little), Err(MatError::InvalidData(_))));
}

#[test]
fn struct_with_missing_field_values_is_truncated() {
    let mut body = body_header(MatClass::Struct, DataType::Int32, &int32s(&[1, 2]));
    body.extend_from_slice(&tagged(DataType::Int32, &int32s(&[4])));
    body.extend_from_slice(&tagged(DataType::Int8, b"a\0\0\0"));
    body.extend_from_slice(&tagged(DataType::Matrix, &[]));
    assert!(matches!(parse_matrix(&body, Endian::Little), Err(MatError::Truncated { .. })));
}

#[test]
fn huge_struct_array_without_fields_is_rejected() {
    let mut body = body_header(MatClass::Struct, DataType::Int32, &int32s(&[i32::MAX, i32::MAX]));
    body.extend_from_slice(&tagged(DataType::Int32, &int32s(&[1])));
    body.extend_from_slice(&tagged(DataType::Int8, &[]));
    assert!(matches!(parse_matrix(&body, Endian::Little), Err(MatError::InvalidData(_))));
}

#[test]
fn oversized_sparse_matrix_does_not_densify() {
    let sparse = SparseArray {
        dims: vec![1 << 40, 1 << 40],
        row_indices: vec![],
        col_ptrs: vec![0; 2],
        real: vec![],
        imag: None,
        logical: false,
    };
    assert!(matches!(sparse.to_dense(), Err(MatError::InvalidData(_))));
}
