//! Extraction of a polynomial SVM from a MATLAB `saveLearnerForCoder` export.
//!
//! [`load_model`] reads the file, [`SingletonStruct`] and [`CategoryPath`] walk the
//! `compactStruct` categories, [`ToFloat32`] and [`normalize_field`] turn values
//! into `f32` arrays or labels, and [`PolySvmParams`] gathers the result.

pub mod errors;
pub mod loader;
pub mod normalize;
pub mod standardize;
pub mod svm;
pub mod unwrap;

pub use errors::ModelError;
pub use loader::{COMPACT_STRUCT_KEY, DEFAULT_MODEL_PATH, ModelFile, load_model};
pub use normalize::{Float32Array, NormalizedField, ToFloat32, normalize_field, normalize_numeric, to_float32};
pub use standardize::{standardize, standardize_features};
pub use svm::PolySvmParams;
pub use unwrap::{CategoryPath, SingletonStruct, unwrap, unwrap_path};
