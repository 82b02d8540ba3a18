//! Variable listing that reads only array headers, like MATLAB's `whos -file`.
//!
//! Uncompressed variables cost one tag read each. Compressed variables are
//! inflated just far enough to cover the flags, dimensions and name; the
//! payload is never decoded, so a variable whose body the reader cannot
//! handle still shows up here.

use std::{fmt, path::Path};

use serde::Serialize;

use super::{
    MatError,
    array::{ArrayHeader, read_array_header},
    element::{DataType, Element, Endian, TAG_LEN, inflate, inflate_prefix},
    file::{MatFile, MatHeader, for_each_variable, map_file},
};

/// Enough inflated bytes for the header of any realistically named array.
const HEADER_PREFIX_LIMIT: u64 = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableInfo {
    pub name: String,
    pub dims: Vec<usize>,
    pub class: &'static str,
    pub is_complex: bool,
    pub is_global: bool,
}

impl VariableInfo {
    /// Dimensions as MATLAB prints them, e.g. `1x2`.
    pub fn shape(&self) -> String {
        self.dims.iter().map(usize::to_string).collect::<Vec<_>>().join("x")
    }

    fn from_header(header: ArrayHeader) -> Self {
        Self {
            class: header.class_label(),
            name: header.name,
            dims: header.dims,
            is_complex: header.is_complex,
            is_global: header.is_global,
        }
    }

    fn empty() -> Self {
        Self {
            name: String::new(),
            dims: vec![0, 0],
            class: "double",
            is_complex: false,
            is_global: false,
        }
    }
}

impl fmt::Display for VariableInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<24} {:>12}  {}", self.name, self.shape(), self.class)?;
        if self.is_complex {
            write!(f, " (complex)")?;
        }
        if self.is_global {
            write!(f, " (global)")?;
        }
        Ok(())
    }
}

impl MatFile {
    /// List the variables of the file at `path` without decoding their data.
    pub fn manifest<P: AsRef<Path>>(path: P) -> Result<Vec<VariableInfo>, MatError> {
        manifest_from_bytes(&map_file(path.as_ref())?)
    }

    /// Decode every variable and list them, from a single mapping of `path`.
    pub fn load_with_manifest<P: AsRef<Path>>(path: P) -> Result<(Self, Vec<VariableInfo>), MatError> {
        let mmap = map_file(path.as_ref())?;
        let mut mat = Self::from_bytes(&mmap)?;
        mat.file_path = path.as_ref().to_string_lossy().to_string();
        let manifest = manifest_from_bytes(&mmap)?;
        Ok((mat, manifest))
    }
}

pub fn manifest_from_bytes(data: &[u8]) -> Result<Vec<VariableInfo>, MatError> {
    let header = MatHeader::parse(data)?;
    let mut variables = Vec::new();

    for_each_variable(data, &header, |offset, element| {
        let info = match element.data_type {
            DataType::Matrix => matrix_info(element.data, header.endian)?,
            DataType::Compressed => match compressed_info(element, header.endian)? {
                Some(info) => info,
                None => {
                    tracing::debug!(offset, "compressed element does not hold an array");
                    return Ok(());
                }
            },
            _ => return Ok(()),
        };
        variables.push(info);
        Ok(())
    })?;

    Ok(variables)
}

fn matrix_info(mut body: &[u8], endian: Endian) -> Result<VariableInfo, MatError> {
    if body.is_empty() {
        return Ok(VariableInfo::empty());
    }
    read_array_header(&mut body, endian).map(VariableInfo::from_header)
}

fn compressed_info(element: Element<'_>, endian: Endian) -> Result<Option<VariableInfo>, MatError> {
    let prefix = inflate_prefix(element.data, HEADER_PREFIX_LIMIT)?;
    match header_from_inflated(&prefix, endian) {
        Err(MatError::Truncated { .. }) if prefix.len() as u64 == HEADER_PREFIX_LIMIT => {
            tracing::debug!("array header exceeds the inflated prefix, inflating fully");
            let full = inflate(element.data)?;
            header_from_inflated(&full, endian)
        }
        result => result,
    }
}

/// Parse the tag and array header at the start of an inflated stream whose
/// payload may be cut short.
fn header_from_inflated(inflated: &[u8], endian: Endian) -> Result<Option<VariableInfo>, MatError> {
    if inflated.len() < TAG_LEN {
        return Err(MatError::Truncated {
            needed: TAG_LEN,
            available: inflated.len(),
        });
    }
    let data_type = DataType::from_u32(endian.u32_from(&inflated[0..4]))?;
    if data_type != DataType::Matrix {
        return Ok(None);
    }
    let len = endian.u32_from(&inflated[4..8]) as usize;
    let body = &inflated[TAG_LEN..];
    let body = &body[..len.min(body.len())];
    matrix_info(body, endian).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mat::writer::{MatWriter, Node};

    fn model_writer() -> MatWriter {
        MatWriter::new()
            .variable(
                "compactStruct",
                Node::record(vec![("Impl", Node::record(vec![("Bias", Node::scalar(0.5))]))]),
            )
            .variable("names", Node::cellstr(&["x1", "x2"]))
            .variable(
                "z",
                Node::Complex {
                    dims: vec![1, 2],
                    real: vec![1.0, 2.0],
                    imag: vec![0.0, 1.0],
                },
            )
    }

    #[test]
    fn lists_variables_in_file_order() {
        let manifest = manifest_from_bytes(&model_writer().to_bytes()).unwrap();
        let names: Vec<&str> = manifest.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["compactStruct", "names", "z"]);
        assert_eq!(manifest[0].class, "struct");
        assert_eq!(manifest[0].shape(), "1x1");
        assert_eq!(manifest[1].class, "cell");
        assert_eq!(manifest[1].shape(), "1x2");
        assert!(manifest[2].is_complex);
    }

    #[test]
    fn compressed_manifest_matches_uncompressed() {
        let plain = manifest_from_bytes(&model_writer().to_bytes()).unwrap();
        let compressed = manifest_from_bytes(&model_writer().compressed().to_bytes()).unwrap();
        assert_eq!(plain, compressed);
    }

    #[test]
    fn manifest_does_not_decode_payloads() {
        // Four values claimed, two stored: the full reader rejects this.
        let bytes = MatWriter::new()
            .variable(
                "broken",
                Node::Double {
                    dims: vec![2, 2],
                    values: vec![1.0, 2.0],
                },
            )
            .to_bytes();
        assert!(MatFile::from_bytes(&bytes).is_err());

        let manifest = manifest_from_bytes(&bytes).unwrap();
        assert_eq!(manifest[0].name, "broken");
        assert_eq!(manifest[0].shape(), "2x2");
    }

    #[test]
    fn display_lists_name_shape_and_class() {
        let info = VariableInfo {
            name: "mu".into(),
            dims: vec![1, 4],
            class: "single",
            is_complex: false,
            is_global: true,
        };
        let line = info.to_string();
        assert!(line.starts_with("mu"));
        assert!(line.contains("1x4"));
        assert!(line.ends_with("single (global)"));
    }

    #[test]
    fn manifest_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.mat");
        model_writer().compressed().write_to(&path).unwrap();

        let manifest = MatFile::manifest(&path).unwrap();
        assert_eq!(manifest.len(), 3);
        assert_eq!(manifest[2].name, "z");
    }

    #[test]
    fn load_with_manifest_lists_what_it_decodes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.mat");
        model_writer().compressed().write_to(&path).unwrap();

        let (mat, manifest) = MatFile::load_with_manifest(&path).unwrap();
        assert!(mat.file_path.ends_with("model.mat"));
        let listed: Vec<&str> = manifest.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(listed, mat.names());
        assert_eq!(manifest, MatFile::manifest(&path).unwrap());
    }

    #[test]
    fn load_with_manifest_rejects_short_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.mat");
        std::fs::write(&path, [0u8; 16]).unwrap();
        assert!(matches!(MatFile::load_with_manifest(&path), Err(MatError::InvalidHeader(_))));
    }
}
