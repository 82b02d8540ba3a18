#![cfg(test)]

use ndarray::{arr0, arr1, arr2};

use super::*;
use crate::mat::{
    MatFile, SparseArray,
    writer::{MatWriter, Node},
};

fn decode(node: Node) -> MatArray {
    let mat = MatFile::from_bytes(&MatWriter::new().variable("v", node).to_bytes()).unwrap();
    mat.get("v").unwrap().clone()
}

#[test]
fn rust_sequences_become_one_dimensional() {
    assert_eq!(to_float32(&[1, 2, 3]).unwrap(), arr1(&[1.0f32, 2.0, 3.0]).into_dyn());
    assert_eq!(to_float32(&vec![0.5f64, -1.5]).unwrap(), arr1(&[0.5f32, -1.5]).into_dyn());
    assert_eq!(to_float32(&[7u8, 9][..]).unwrap().ndim(), 1);
}

#[test]
fn rust_scalars_become_zero_dimensional() {
    let scalar = to_float32(&5.0f64).unwrap();
    assert_eq!(scalar.ndim(), 0);
    assert_eq!(scalar, arr0(5.0f32).into_dyn());
    assert_eq!(to_float32(&-3i64).unwrap(), arr0(-3.0f32).into_dyn());
}

#[test]
fn overflow_saturates_and_nan_passes() {
    let values = to_float32(&[1e300f64, f64::NAN]).unwrap();
    assert_eq!(values[[0]], f32::INFINITY);
    assert!(values[[1]].is_nan());
}

#[test]
fn numeric_array_keeps_matlab_shape() {
    let value = decode(Node::matrix(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));
    let array = value.to_float32().unwrap();
    assert_eq!(array.shape(), &[2, 3]);
    assert_eq!(array, arr2(&[[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]]).into_dyn());
}

#[test]
fn numeric_predictor_names_normalize_to_two_floats() {
    let value = decode(Node::row(&[1.0, 2.0]));
    let array = to_float32(&value).unwrap();
    assert_eq!(array.len(), 2);
    assert_eq!(array.iter().copied().collect::<Vec<f32>>(), vec![1.0, 2.0]);
}

#[test]
fn logical_and_integer_arrays_cast() {
    let logical = decode(Node::Logical {
        dims: vec![1, 3],
        values: vec![true, false, true],
    });
    assert_eq!(logical.to_float32().unwrap(), arr2(&[[1.0f32, 0.0, 1.0]]).into_dyn());

    let ints = decode(Node::Stored {
        class: crate::mat::MatClass::Int16,
        storage: crate::mat::DataType::Int16,
        dims: vec![2, 1],
        values: vec![-4.0, 12.0],
    });
    assert_eq!(ints.to_float32().unwrap(), arr2(&[[-4.0f32], [12.0]]).into_dyn());
}

#[test]
fn complex_values_drop_imaginary_part() {
    let value = decode(Node::Complex {
        dims: vec![1, 2],
        real: vec![1.5, 2.5],
        imag: vec![9.0, 9.0],
    });
    assert_eq!(value.to_float32().unwrap(), arr2(&[[1.5f32, 2.5]]).into_dyn());
}

#[test]
fn numeric_text_parses() {
    let value = decode(Node::Char(vec![" 1.5".into(), "-2  ".into()]));
    assert_eq!(value.to_float32().unwrap(), arr1(&[1.5f32, -2.0]).into_dyn());
}

#[test]
fn non_numeric_text_fails_to_cast() {
    let value = decode(Node::text("x1"));
    assert!(matches!(value.to_float32(), Err(ModelError::Cast { .. })));
}

#[test]
fn cell_of_scalars_takes_cell_shape() {
    let value = decode(Node::Cell {
        dims: vec![1, 3],
        cells: vec![Node::scalar(1.0), Node::text("2.5"), Node::scalar(-1.0)],
    });
    assert_eq!(value.to_float32().unwrap(), arr2(&[[1.0f32, 2.5, -1.0]]).into_dyn());
}

#[test]
fn cell_holding_a_sequence_fails() {
    let value = decode(Node::Cell {
        dims: vec![1, 1],
        cells: vec![Node::row(&[1.0, 2.0])],
    });
    let err = value.to_float32().unwrap_err();
    assert!(err.to_string().contains("cell 0"));
}

#[test]
fn sparse_densifies() {
    let value = decode(Node::Sparse {
        rows: 2,
        cols: 2,
        entries: vec![(1, 0, 4.0), (0, 1, 8.0)],
    });
    assert_eq!(value.to_float32().unwrap(), arr2(&[[0.0f32, 8.0], [4.0, 0.0]]).into_dyn());
}

#[test]
fn oversized_sparse_matrix_is_a_shape_error() {
    let value = MatArray::Sparse(SparseArray {
        dims: vec![1 << 40, 1 << 40],
        row_indices: vec![0],
        col_ptrs: vec![0, 1],
        real: vec![1.0],
        imag: None,
        logical: false,
    });
    assert!(matches!(value.to_float32(), Err(ModelError::Shape(_))));
}

#[test]
fn structs_do_not_cast() {
    let value = decode(Node::record(vec![("a", Node::scalar(1.0))]));
    let err = normalize_numeric(&value, "Impl.Mu").unwrap_err();
    match err {
        ModelError::Cast { what, reason } => {
            assert_eq!(what, "Impl.Mu");
            assert!(reason.starts_with("struct array"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn text_fields_become_labels() {
    let names = decode(Node::cellstr(&["x1", "x2"]));
    let field = normalize_field(&names, "PredictorNames").unwrap();
    assert_eq!(field, NormalizedField::Labels(vec!["x1".into(), "x2".into()]));
    assert_eq!(field.element_type(), "str");
    assert_eq!(field.to_string(), r#"["x1", "x2"]"#);

    let rows = decode(Node::Char(vec!["setosa".into(), "versic".into()]));
    assert_eq!(normalize_field(&rows, "ClassNames").unwrap().as_labels().map(<[String]>::len), Some(2));
}

#[test]
fn numeric_fields_stay_numeric() {
    let classes = decode(Node::column(&[-1.0, 1.0]));
    let field = normalize_field(&classes, "ClassNames").unwrap();
    assert_eq!(field.element_type(), "float32");
    assert_eq!(field.len(), 2);
    assert_eq!(field.as_numeric().map(|a| a.shape().to_vec()), Some(vec![2, 1]));
}

#[test]
fn serializes_shape_and_row_major_data() {
    let field = NormalizedField::Numeric(decode(Node::matrix(2, 2, &[1.0, 2.0, 3.0, 4.0])).to_float32().unwrap());
    let json = serde_json::to_value(&field).unwrap();
    assert_eq!(json, serde_json::json!({ "shape": [2, 2], "data": [1.0, 2.0, 3.0, 4.0] }));

    let labels = NormalizedField::Labels(vec!["a".into()]);
    assert_eq!(serde_json::to_value(&labels).unwrap(), serde_json::json!(["a"]));
}
