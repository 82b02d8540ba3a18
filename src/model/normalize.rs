use std::fmt;

use ndarray::{Array1, ArrayD, IxDyn, ShapeBuilder};
use num_traits::AsPrimitive;
use serde::{Serialize, Serializer, ser::SerializeStruct};

use super::ModelError;
use crate::mat::{CharArray, MatArray};

/// Normalized numeric value. MATLAB dimensions are kept, so element order in
/// memory is column-major.
pub type Float32Array = ArrayD<f32>;

/// Conversion to a single precision array, following numpy's `float32` cast.
pub trait ToFloat32 {
    fn to_float32(&self) -> Result<Float32Array, ModelError>;
}

pub fn to_float32<T: ToFloat32 + ?Sized>(value: &T) -> Result<Float32Array, ModelError> {
    value.to_float32()
}

macro_rules! impl_scalar_to_float32 {
    ($($ty:ty),*) => {
        $(
            impl ToFloat32 for $ty {
                fn to_float32(&self) -> Result<Float32Array, ModelError> {
                    Ok(ArrayD::from_elem(IxDyn(&[]), self.as_()))
                }
            }
        )*
    };
}

impl_scalar_to_float32!(f32, f64, i8, u8, i16, u16, i32, u32, i64, u64, isize, usize);

impl<T: AsPrimitive<f32>> ToFloat32 for [T] {
    fn to_float32(&self) -> Result<Float32Array, ModelError> {
        Ok(self.iter().map(|v| v.as_()).collect::<Array1<f32>>().into_dyn())
    }
}

impl<T: AsPrimitive<f32>, const N: usize> ToFloat32 for [T; N] {
    fn to_float32(&self) -> Result<Float32Array, ModelError> {
        self.as_slice().to_float32()
    }
}

impl<T: AsPrimitive<f32>> ToFloat32 for Vec<T> {
    fn to_float32(&self) -> Result<Float32Array, ModelError> {
        self.as_slice().to_float32()
    }
}

impl ToFloat32 for MatArray {
    fn to_float32(&self) -> Result<Float32Array, ModelError> {
        match self {
            MatArray::Numeric(array) => {
                if array.imag.is_some() {
                    tracing::warn!(dims = ?array.dims, "discarding imaginary part of complex array");
                }
                column_major(&array.dims, array.real.to_f32_vec())
            }
            MatArray::Char(chars) => {
                let values = chars
                    .rows()
                    .iter()
                    .map(|row| parse_float(row))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Array1::from(values).into_dyn())
            }
            MatArray::Cell(cell) => {
                let values = cell
                    .cells
                    .iter()
                    .enumerate()
                    .map(|(i, value)| cell_value(i, value))
                    .collect::<Result<Vec<_>, _>>()?;
                column_major(&cell.dims, values)
            }
            MatArray::Sparse(sparse) => {
                if sparse.imag.is_some() {
                    tracing::warn!(dims = ?sparse.dims, "discarding imaginary part of complex sparse array");
                }
                let dense = sparse
                    .to_dense()
                    .map_err(|e| ModelError::Shape(e.to_string()))?
                    .into_iter()
                    .map(|v| v as f32)
                    .collect();
                column_major(&sparse.dims, dense)
            }
            MatArray::Struct(_) | MatArray::Opaque(_) => Err(ModelError::cast(
                format!("{} array", self.class_label()),
                "only numeric, logical, char and cell arrays convert",
            )),
        }
    }
}

fn column_major(dims: &[usize], values: Vec<f32>) -> Result<Float32Array, ModelError> {
    ArrayD::from_shape_vec(IxDyn(dims).f(), values).map_err(|e| ModelError::Shape(format!("{dims:?}: {e}")))
}

fn parse_float(text: &str) -> Result<f32, ModelError> {
    text.trim()
        .parse::<f32>()
        .map_err(|e| ModelError::cast(format!("text {text:?}"), e.to_string()))
}

fn cell_value(index: usize, value: &MatArray) -> Result<f32, ModelError> {
    let converted = match value {
        MatArray::Char(chars) if chars.dims.first() == Some(&1) => parse_float(&chars.as_string())?,
        _ => {
            let array = value.to_float32()?;
            match array.len() {
                1 => array.iter().copied().next().unwrap_or_default(),
                n => {
                    return Err(ModelError::cast(
                        format!("cell {index}"),
                        format!("holds {n} values, a sequence cannot fill one element"),
                    ));
                }
            }
        }
    };
    Ok(converted)
}

/// A model field after normalization: numbers become a float32 array, text
/// stays text.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedField {
    Numeric(Float32Array),
    Labels(Vec<String>),
}

impl NormalizedField {
    /// Element type label: `float32` or `str`.
    pub fn element_type(&self) -> &'static str {
        match self {
            Self::Numeric(_) => "float32",
            Self::Labels(_) => "str",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(array) => array.len(),
            Self::Labels(labels) => labels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_numeric(&self) -> Option<&Float32Array> {
        match self {
            Self::Numeric(array) => Some(array),
            Self::Labels(_) => None,
        }
    }

    pub fn as_labels(&self) -> Option<&[String]> {
        match self {
            Self::Labels(labels) => Some(labels),
            Self::Numeric(_) => None,
        }
    }
}

impl fmt::Display for NormalizedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(array) => write!(f, "{array}"),
            Self::Labels(labels) => write!(f, "{labels:?}"),
        }
    }
}

impl Serialize for NormalizedField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Numeric(array) => serialize_array(array, serializer),
            Self::Labels(labels) => labels.serialize(serializer),
        }
    }
}

/// `{ "shape": [..], "data": [..] }` with data in row-major order.
pub(crate) fn serialize_array<S: Serializer>(array: &Float32Array, serializer: S) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct("Float32Array", 2)?;
    state.serialize_field("shape", array.shape())?;
    state.serialize_field("data", &array.iter().copied().collect::<Vec<f32>>())?;
    state.end()
}

/// Normalize `value` according to what it holds; `what` names it in errors.
pub fn normalize_field(value: &MatArray, what: &str) -> Result<NormalizedField, ModelError> {
    if let Some(labels) = labels(value) {
        return Ok(NormalizedField::Labels(labels));
    }
    normalize_numeric(value, what).map(NormalizedField::Numeric)
}

/// [`ToFloat32::to_float32`] with `what` in the error.
pub fn normalize_numeric(value: &MatArray, what: &str) -> Result<Float32Array, ModelError> {
    value.to_float32().map_err(|e| match e {
        ModelError::Cast { what: detail, reason } => ModelError::cast(what, format!("{detail}: {reason}")),
        other => other,
    })
}

fn labels(value: &MatArray) -> Option<Vec<String>> {
    match value {
        MatArray::Char(chars) => Some(chars.rows()),
        MatArray::Cell(cell) if !cell.cells.is_empty() => cell
            .cells
            .iter()
            .map(|c| c.as_char().map(CharArray::as_string))
            .collect(),
        _ => None,
    }
}

#[cfg(test)]
#[path = "normalize.test.rs"]
mod tests;
