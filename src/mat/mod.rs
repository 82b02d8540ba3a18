//! Reader for MATLAB Level 5 MAT-files.
//!
//! [`MatFile`] decodes every top-level variable into a [`MatArray`] tree;
//! [`MatFile::manifest`] lists names, shapes and classes from the array
//! headers alone.

pub mod array;
pub mod element;
pub mod errors;
pub mod file;
pub mod manifest;
pub mod numeric;

#[cfg(test)]
pub(crate) mod writer;

pub use array::{ArrayHeader, CellArray, CharArray, MatArray, MatClass, NumericArray, OpaqueArray, SparseArray, StructArray};
pub use element::{DataType, Endian};
pub use errors::MatError;
pub use file::{MatFile, MatHeader};
pub use manifest::{VariableInfo, manifest_from_bytes};
pub use numeric::NumericData;
