use std::{fs::File, path::Path};

use memmap2::Mmap;
use rustc_hash::FxHashMap;

use super::{
    MatError,
    array::{MatArray, parse_matrix},
    element::{DataType, Element, Endian, TAG_LEN, inflate, read_element},
};

pub const HEADER_LEN: usize = 128;
pub(crate) const DESCRIPTION_LEN: usize = 116;

pub const VERSION_5: u16 = 0x0100;
/// HDF5-based v7.3 files carry this version in an otherwise valid header.
pub const VERSION_7_3: u16 = 0x0200;

#[derive(Debug, Clone, PartialEq)]
pub struct MatHeader {
    /// Human readable text, e.g. `MATLAB 5.0 MAT-file, Platform: ...`.
    pub description: String,
    /// File offset of the subsystem data element, if one was written.
    pub subsys_offset: Option<u64>,
    pub version: u16,
    pub endian: Endian,
}

impl MatHeader {
    pub fn parse(data: &[u8]) -> Result<Self, MatError> {
        if data.len() < HEADER_LEN {
            return Err(MatError::InvalidHeader(format!(
                "file holds {} bytes, the header alone needs {HEADER_LEN}",
                data.len()
            )));
        }

        let endian = match &data[126..128] {
            b"IM" => Endian::Little,
            b"MI" => Endian::Big,
            other => {
                return Err(MatError::InvalidHeader(format!("unknown endian indicator {other:?}")));
            }
        };

        let version = endian.u16_from(&data[124..126]);
        if version != VERSION_5 {
            return Err(MatError::UnsupportedVersion(version));
        }

        let description = String::from_utf8_lossy(&data[..DESCRIPTION_LEN])
            .trim_end_matches([' ', '\0'])
            .to_string();

        let subsys = &data[DESCRIPTION_LEN..DESCRIPTION_LEN + 8];
        let subsys_offset = if subsys.iter().all(|&b| b == b' ' || b == 0) {
            None
        } else {
            Some(endian.u64_from(subsys))
        };

        Ok(Self {
            description,
            subsys_offset,
            version,
            endian,
        })
    }
}

/// A parsed Level 5 MAT-file: every top-level variable, keyed by name.
#[derive(Debug)]
pub struct MatFile {
    pub header: MatHeader,
    entries: FxHashMap<String, MatArray>,
    names: Vec<String>,
    pub file_path: String,
}

impl MatFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MatError> {
        let mmap = map_file(path.as_ref())?;
        let mut mat = Self::from_bytes(&mmap)?;
        mat.file_path = path.as_ref().to_string_lossy().to_string();
        tracing::info!(path = %mat.file_path, variables = mat.len(), "loaded MAT-file");
        Ok(mat)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, MatError> {
        let header = MatHeader::parse(data)?;
        tracing::debug!(description = %header.description, endian = ?header.endian, "MAT-file header");

        let mut entries = FxHashMap::default();
        let mut names = Vec::new();

        for_each_variable(data, &header, |offset, element| {
            let matrix = match element.data_type {
                DataType::Matrix => parse_matrix(element.data, header.endian)?,
                DataType::Compressed => {
                    let inflated = inflate(element.data)?;
                    let mut inner = &inflated[..];
                    let element = read_element(&mut inner, header.endian)?;
                    if element.data_type != DataType::Matrix {
                        tracing::debug!(offset, data_type = ?element.data_type, "skipping compressed non-matrix element");
                        return Ok(());
                    }
                    parse_matrix(element.data, header.endian)?
                }
                other => {
                    tracing::debug!(offset, data_type = ?other, "skipping top-level element");
                    return Ok(());
                }
            };

            let (name, array) = matrix;
            tracing::debug!(offset, name = %name, class = array.class_label(), dims = ?array.dims(), "variable");
            if entries.insert(name.clone(), array).is_none() {
                names.push(name);
            }
            Ok(())
        })?;

        Ok(Self {
            header,
            entries,
            names,
            file_path: String::new(),
        })
    }

    pub fn get(&self, name: &str) -> Option<&MatArray> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Variable names in file order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn header(&self) -> &MatHeader {
        &self.header
    }

    /// Variables in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MatArray)> {
        self.names
            .iter()
            .filter_map(|name| self.entries.get(name).map(|array| (name.as_str(), array)))
    }
}

/// Walk the top-level elements after the header, skipping the subsystem
/// element and stopping at trailing padding.
pub(crate) fn map_file(path: &Path) -> Result<Mmap, MatError> {
    let file = File::open(path).map_err(MatError::Io)?;

    // Mapping a zero-length file fails; report it as the header problem it is.
    let len = file.metadata()?.len();
    if len < HEADER_LEN as u64 {
        return Err(MatError::InvalidHeader(format!(
            "file holds {len} bytes, the header alone needs {HEADER_LEN}"
        )));
    }

    unsafe { Mmap::map(&file) }.map_err(|e| MatError::MemoryMappingError(e.to_string()))
}

pub(crate) fn for_each_variable<'a, F>(data: &'a [u8], header: &MatHeader, mut visit: F) -> Result<(), MatError>
where
    F: FnMut(usize, Element<'a>) -> Result<(), MatError>,
{
    let mut reader = &data[HEADER_LEN..];
    while reader.len() >= TAG_LEN {
        if reader[..4].iter().all(|&b| b == 0) {
            break;
        }
        let offset = data.len() - reader.len();
        let element = read_element(&mut reader, header.endian)?;
        if header.subsys_offset == Some(offset as u64) {
            tracing::debug!(offset, "skipping subsystem data");
            continue;
        }
        visit(offset, element)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "file.test.rs"]
mod tests;
