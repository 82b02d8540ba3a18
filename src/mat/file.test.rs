#![cfg(test)]

use super::*;
use crate::mat::{
    NumericData,
    array::MatClass,
    writer::{MatWriter, Node},
};

fn sample() -> MatWriter {
    MatWriter::new()
        .variable("alpha", Node::column(&[0.5, -0.25, 1.0]))
        .variable("label", Node::text("setosa"))
        .variable("names", Node::cellstr(&["x1", "x2"]))
}

fn real_values(mat: &MatFile, name: &str) -> NumericData {
    mat.get(name).and_then(MatArray::as_numeric).map(|n| n.real.clone()).unwrap()
}

#[test]
fn parses_header() {
    let bytes = sample().description("MATLAB 5.0 MAT-file, written by tests").to_bytes();
    let header = MatHeader::parse(&bytes).unwrap();
    assert_eq!(header.description, "MATLAB 5.0 MAT-file, written by tests");
    assert_eq!(header.version, VERSION_5);
    assert_eq!(header.endian, Endian::Little);
    assert_eq!(header.subsys_offset, None);
}

#[test]
fn reads_all_variables_in_file_order() {
    let mat = MatFile::from_bytes(&sample().to_bytes()).unwrap();
    assert_eq!(mat.names(), &["alpha", "label", "names"]);
    assert_eq!(mat.len(), 3);
    assert!(mat.contains("label"));
    assert!(!mat.contains("missing"));
    assert_eq!(real_values(&mat, "alpha"), NumericData::F64(vec![0.5, -0.25, 1.0]));

    let listed: Vec<&str> = mat.iter().map(|(name, _)| name).collect();
    assert_eq!(listed, vec!["alpha", "label", "names"]);
}

#[test]
fn big_endian_file_matches_little_endian() {
    let little = MatFile::from_bytes(&sample().to_bytes()).unwrap();
    let big = MatFile::from_bytes(&sample().big_endian().to_bytes()).unwrap();
    assert_eq!(big.header().endian, Endian::Big);
    for name in little.names() {
        assert_eq!(little.get(name), big.get(name), "variable {name}");
    }
}

#[test]
fn compressed_file_matches_uncompressed() {
    let plain = MatFile::from_bytes(&sample().to_bytes()).unwrap();
    let compressed = MatFile::from_bytes(&sample().compressed().to_bytes()).unwrap();
    assert_eq!(plain.names(), compressed.names());
    for name in plain.names() {
        assert_eq!(plain.get(name), compressed.get(name), "variable {name}");
    }
}

#[test]
fn loading_twice_is_deterministic() {
    let bytes = sample().compressed().to_bytes();
    let first = MatFile::from_bytes(&bytes).unwrap();
    let second = MatFile::from_bytes(&bytes).unwrap();
    assert_eq!(first.names(), second.names());
    for (name, array) in first.iter() {
        assert_eq!(Some(array), second.get(name));
    }
}

#[test]
fn subsystem_element_is_not_a_variable() {
    let bytes = sample()
        .subsystem(Node::Stored {
            class: MatClass::UInt8,
            storage: DataType::UInt8,
            dims: vec![1, 8],
            values: vec![0.0; 8],
        })
        .to_bytes();
    let mat = MatFile::from_bytes(&bytes).unwrap();
    assert!(mat.header().subsys_offset.is_some());
    assert_eq!(mat.names(), &["alpha", "label", "names"]);
}

#[test]
fn header_only_file_is_empty() {
    let mat = MatFile::from_bytes(&MatWriter::new().to_bytes()).unwrap();
    assert!(mat.is_empty());
}

#[test]
fn trailing_padding_is_ignored() {
    let mut bytes = sample().to_bytes();
    bytes.extend_from_slice(&[0; 12]);
    let mat = MatFile::from_bytes(&bytes).unwrap();
    assert_eq!(mat.len(), 3);
}

#[test]
fn rejects_short_file() {
    let err = MatFile::from_bytes(&[0; 64]).unwrap_err();
    assert!(matches!(err, MatError::InvalidHeader(_)));
}

#[test]
fn rejects_unknown_endian_indicator() {
    let mut bytes = sample().to_bytes();
    bytes[126..128].copy_from_slice(b"XX");
    let err = MatFile::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, MatError::InvalidHeader(_)));
}

#[test]
fn rejects_hdf5_based_files() {
    let mut bytes = sample().description("MATLAB 7.3 MAT-file").to_bytes();
    bytes[124..126].copy_from_slice(&VERSION_7_3.to_le_bytes());
    let err = MatFile::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, MatError::UnsupportedVersion(VERSION_7_3)));
    assert!(err.to_string().contains("0x0200"));
}

#[test]
fn truncated_variable_is_an_error() {
    let mut bytes = sample().to_bytes();
    bytes.truncate(bytes.len() - 20);
    assert!(MatFile::from_bytes(&bytes).is_err());
}

#[test]
fn load_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.mat");
    sample().compressed().write_to(&path).unwrap();

    let mat = MatFile::load(&path).unwrap();
    assert_eq!(mat.len(), 3);
    assert!(mat.file_path.ends_with("sample.mat"));
    assert_eq!(mat.get("label").and_then(MatArray::as_char).map(|c| c.as_string()), Some("setosa".to_string()));
}

#[test]
fn load_reports_missing_and_empty_files() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(MatFile::load(dir.path().join("absent.mat")), Err(MatError::Io(_))));

    let empty = dir.path().join("empty.mat");
    std::fs::write(&empty, b"").unwrap();
    assert!(matches!(MatFile::load(&empty), Err(MatError::InvalidHeader(_))));
}
