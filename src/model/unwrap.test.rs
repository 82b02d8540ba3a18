#![cfg(test)]

use super::*;
use crate::mat::{
    MatFile, NumericData,
    writer::{MatWriter, Node},
};

fn compact_struct() -> MatArray {
    let node = Node::record(vec![
        (
            "Impl",
            Node::record(vec![
                ("Bias", Node::scalar(-1.25)),
                (
                    "KernelParameters",
                    Node::record(vec![
                        ("PolyOrder", Node::scalar(3.0)),
                        ("Scale", Node::scalar(1.0)),
                        ("Offset", Node::scalar(0.0)),
                    ]),
                ),
            ]),
        ),
        ("DataSummary", Node::record(vec![("NumPredictors", Node::scalar(2.0))])),
        (
            "Pair",
            Node::Struct {
                dims: vec![1, 2],
                fields: vec!["a".into()],
                elements: vec![vec![Node::scalar(1.0)], vec![Node::scalar(2.0)]],
            },
        ),
        ("Label", Node::text("svm")),
    ]);
    let mat = MatFile::from_bytes(&MatWriter::new().variable("compactStruct", node).to_bytes()).unwrap();
    mat.get("compactStruct").unwrap().clone()
}

#[test]
fn unwraps_category_fields() {
    let root = compact_struct();
    let model = unwrap(&root, "Impl").unwrap();
    assert_eq!(model.path(), "Impl");
    assert_eq!(model.field_names(), &["Bias", "KernelParameters"]);
    assert_eq!(
        model.field("Bias").unwrap().as_numeric().unwrap().real,
        NumericData::F64(vec![-1.25])
    );
    let listed: Vec<&str> = model.iter().map(|(name, _)| name).collect();
    assert_eq!(listed, vec!["Bias", "KernelParameters"]);
}

#[test]
fn category_path_descends_nested_structs() {
    let root = compact_struct();
    let kernel = unwrap_path(&root, &CategoryPath::KERNEL_PARAMETERS).unwrap();
    assert_eq!(kernel.path(), "Impl.KernelParameters");
    assert_eq!(kernel.len(), 3);
    assert!(kernel.get("PolyOrder").is_some());
    assert_eq!(CategoryPath::KERNEL_PARAMETERS.to_string(), "Impl.KernelParameters");
}

#[test]
fn missing_category_is_a_lookup_error() {
    let root = compact_struct();
    let err = unwrap(&root, "ClassSummary").unwrap_err();
    assert!(matches!(err, ModelError::FieldNotFound { ref field, .. } if field == "ClassSummary"));
}

#[test]
fn missing_field_names_its_path() {
    let root = compact_struct();
    let kernel = unwrap_path(&root, &CategoryPath::KERNEL_PARAMETERS).unwrap();
    let err = kernel.field("Gamma").unwrap_err();
    assert_eq!(err.to_string(), "Field 'Gamma' not found in 'Impl.KernelParameters'");
}

#[test]
fn struct_array_is_a_nesting_error() {
    let root = compact_struct();
    let err = unwrap(&root, "Pair").unwrap_err();
    match err {
        ModelError::Nesting { path, found } => {
            assert_eq!(path, "Pair");
            assert_eq!(found, "1x2 struct");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn non_struct_category_is_a_nesting_error() {
    let root = compact_struct();
    let err = unwrap(&root, "Label").unwrap_err();
    assert!(matches!(err, ModelError::Nesting { ref found, .. } if found == "1x3 char"));
}

#[test]
fn root_must_be_a_singleton_struct() {
    let numbers = MatArray::empty();
    let err = unwrap(&numbers, "Impl").unwrap_err();
    assert!(matches!(err, ModelError::Nesting { ref found, .. } if found == "0x0 double"));
}

#[test]
fn descend_keeps_named_root_in_path() {
    let root = compact_struct();
    let compact = SingletonStruct::from_array(&root, "compactStruct").unwrap();
    let summary = compact.descend_path(&CategoryPath::DATA_SUMMARY).unwrap();
    assert_eq!(summary.path(), "compactStruct.DataSummary");
    assert!(!summary.is_empty());
}
