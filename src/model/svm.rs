//! Parameters of a polynomial-kernel SVM exported with `saveLearnerForCoder`.

use serde::Serialize;

use super::{
    COMPACT_STRUCT_KEY, CategoryPath, Float32Array, ModelError, NormalizedField, SingletonStruct,
    normalize::{normalize_field, normalize_numeric, serialize_array},
};
use crate::mat::MatArray;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolySvmParams {
    pub predictor_names: NormalizedField,
    #[serde(serialize_with = "serialize_array")]
    pub num_predictors: Float32Array,
    #[serde(serialize_with = "serialize_array")]
    pub mu: Float32Array,
    #[serde(serialize_with = "serialize_array")]
    pub sigma: Float32Array,
    #[serde(serialize_with = "serialize_array")]
    pub support_vectors: Float32Array,
    #[serde(serialize_with = "serialize_array")]
    pub alpha: Float32Array,
    #[serde(serialize_with = "serialize_array")]
    pub support_vector_labels: Float32Array,
    #[serde(serialize_with = "serialize_array")]
    pub bias: Float32Array,
    #[serde(serialize_with = "serialize_array")]
    pub poly_order: Float32Array,
    #[serde(serialize_with = "serialize_array")]
    pub scale: Float32Array,
    #[serde(serialize_with = "serialize_array")]
    pub offset: Float32Array,
    pub class_names: NormalizedField,
}

fn numeric(category: &SingletonStruct<'_>, field: &str) -> Result<Float32Array, ModelError> {
    normalize_numeric(category.field(field)?, &category.field_path(field))
}

fn labelled(category: &SingletonStruct<'_>, field: &str) -> Result<NormalizedField, ModelError> {
    normalize_field(category.field(field)?, &category.field_path(field))
}

impl PolySvmParams {
    /// Pull every parameter out of the `compactStruct` value.
    pub fn extract(parameters: &MatArray) -> Result<Self, ModelError> {
        let root = SingletonStruct::from_array(parameters, COMPACT_STRUCT_KEY)?;
        let data_summary = root.descend_path(&CategoryPath::DATA_SUMMARY)?;
        let model = root.descend_path(&CategoryPath::IMPL)?;
        let kernel = root.descend_path(&CategoryPath::KERNEL_PARAMETERS)?;
        let class_summary = root.descend_path(&CategoryPath::CLASS_SUMMARY)?;

        let params = Self {
            predictor_names: labelled(&data_summary, "PredictorNames")?,
            num_predictors: numeric(&data_summary, "NumPredictors")?,
            mu: numeric(&model, "Mu")?,
            sigma: numeric(&model, "Sigma")?,
            support_vectors: numeric(&model, "SupportVectors")?,
            alpha: numeric(&model, "Alpha")?,
            support_vector_labels: numeric(&model, "SupportVectorLabels")?,
            bias: numeric(&model, "Bias")?,
            poly_order: numeric(&kernel, "PolyOrder")?,
            scale: numeric(&kernel, "Scale")?,
            offset: numeric(&kernel, "Offset")?,
            class_names: labelled(&class_summary, "ClassNames")?,
        };
        tracing::debug!(
            predictors = params.predictor_names.len(),
            support_vectors = params.support_vector_count(),
            "extracted polynomial SVM parameters"
        );
        Ok(params)
    }

    /// Rows of `SupportVectors`.
    pub fn support_vector_count(&self) -> usize {
        self.support_vectors.shape().first().copied().unwrap_or(0)
    }

    /// `NumPredictors`, falling back to the number of predictor names.
    pub fn predictor_count(&self) -> usize {
        self.num_predictors
            .iter()
            .next()
            .map(|&n| n as usize)
            .unwrap_or_else(|| self.predictor_names.len())
    }

    /// Check that the extracted arrays agree with each other.
    pub fn validate(&self) -> Result<(), ModelError> {
        let predictors = self.predictor_count();
        let rows = self.support_vector_count();

        let shape = self.support_vectors.shape();
        if shape.len() != 2 || shape[1] != predictors {
            return Err(ModelError::Shape(format!(
                "SupportVectors is {shape:?}, expected {predictors} columns"
            )));
        }
        if self.alpha.len() != rows {
            return Err(ModelError::Shape(format!(
                "Alpha holds {} values for {rows} support vectors",
                self.alpha.len()
            )));
        }
        if self.support_vector_labels.len() != rows {
            return Err(ModelError::Shape(format!(
                "SupportVectorLabels holds {} values for {rows} support vectors",
                self.support_vector_labels.len()
            )));
        }
        if self.predictor_names.len() != predictors {
            return Err(ModelError::Shape(format!(
                "{} predictor names for {predictors} predictors",
                self.predictor_names.len()
            )));
        }
        for (name, values) in [("Mu", &self.mu), ("Sigma", &self.sigma)] {
            if !values.is_empty() && values.len() != predictors {
                return Err(ModelError::Shape(format!(
                    "{name} holds {} values for {predictors} predictors",
                    values.len()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "svm.test.rs"]
mod tests;
