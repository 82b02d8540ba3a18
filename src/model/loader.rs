use std::path::Path;

use super::ModelError;
use crate::mat::{MatArray, MatFile, VariableInfo};

/// Variable holding the struct written by `saveLearnerForCoder`.
pub const COMPACT_STRUCT_KEY: &str = "compactStruct";

pub const DEFAULT_MODEL_PATH: &str = "/home/team5/Desktop/miniModelPolySVM.mat";

/// A loaded model file: every variable plus the header-only listing.
#[derive(Debug)]
pub struct ModelFile {
    pub content: MatFile,
    pub manifest: Vec<VariableInfo>,
}

impl ModelFile {
    /// The exported model struct.
    pub fn parameters(&self) -> Result<&MatArray, ModelError> {
        self.content
            .get(COMPACT_STRUCT_KEY)
            .ok_or_else(|| ModelError::MissingVariable(COMPACT_STRUCT_KEY.to_string()))
    }
}

pub fn load_model<P: AsRef<Path>>(path: P) -> Result<ModelFile, ModelError> {
    let path = path.as_ref();
    let (content, manifest) = MatFile::load_with_manifest(path)?;
    tracing::info!(path = %path.display(), variables = manifest.len(), "loaded model file");

    let model = ModelFile { content, manifest };
    model.parameters()?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mat::{
        MatError,
        writer::{MatWriter, Node},
    };

    #[test]
    fn loads_content_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.mat");
        MatWriter::new()
            .compressed()
            .variable("compactStruct", Node::record(vec![("Impl", Node::record(vec![]))]))
            .variable("note", Node::text("trained"))
            .write_to(&path)
            .unwrap();

        let model = load_model(&path).unwrap();
        assert_eq!(model.content.names(), &["compactStruct", "note"]);
        let listed: Vec<&str> = model.manifest.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(listed, vec!["compactStruct", "note"]);
        assert_eq!(model.parameters().unwrap().class_label(), "struct");
    }

    #[test]
    fn missing_compact_struct_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.mat");
        MatWriter::new().variable("x", Node::scalar(1.0)).write_to(&path).unwrap();

        let err = load_model(&path).unwrap_err();
        assert!(matches!(err, ModelError::MissingVariable(ref name) if name == COMPACT_STRUCT_KEY));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_model(dir.path().join("absent.mat")).unwrap_err();
        assert!(matches!(err, ModelError::Mat(MatError::Io(_))));
    }
}
