//! Access to categories of a MATLAB struct that must each be a single struct.
//!
//! `saveLearnerForCoder` writes every category (`Impl`, `DataSummary`, ...) as a
//! 1x1 struct, which generic readers surface as a one-element array. Rather than
//! indexing `[0]` at every level, [`SingletonStruct`] checks the shape once and
//! fails with [`ModelError::Nesting`] when it is not exactly one struct element.

use std::fmt;

use super::ModelError;
use crate::mat::MatArray;

/// Struct field names to descend from the model's top-level struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryPath<'a>(&'a [&'a str]);

impl<'a> CategoryPath<'a> {
    pub const DATA_SUMMARY: CategoryPath<'static> = CategoryPath(&["DataSummary"]);
    pub const IMPL: CategoryPath<'static> = CategoryPath(&["Impl"]);
    pub const KERNEL_PARAMETERS: CategoryPath<'static> = CategoryPath(&["Impl", "KernelParameters"]);
    pub const CLASS_SUMMARY: CategoryPath<'static> = CategoryPath(&["ClassSummary"]);

    pub const fn new(names: &'a [&'a str]) -> Self {
        Self(names)
    }

    pub fn names(&self) -> &'a [&'a str] {
        self.0
    }
}

impl fmt::Display for CategoryPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// Field view of a struct array known to hold exactly one element.
#[derive(Debug, Clone)]
pub struct SingletonStruct<'a> {
    path: String,
    field_names: &'a [String],
    values: &'a [MatArray],
}

impl<'a> SingletonStruct<'a> {
    /// Check that `value` is a 1x1 struct (or object); `path` names it in errors.
    pub fn from_array(value: &'a MatArray, path: &str) -> Result<Self, ModelError> {
        let nesting = |found: String| ModelError::Nesting {
            path: path.to_string(),
            found,
        };

        let Some(record) = value.as_struct() else {
            return Err(nesting(describe(value)));
        };
        let [values] = record.elements.as_slice() else {
            return Err(nesting(describe(value)));
        };

        Ok(Self {
            path: path.to_string(),
            field_names: &record.field_names,
            values,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn field_names(&self) -> &'a [String] {
        self.field_names
    }

    pub fn get(&self, name: &str) -> Option<&'a MatArray> {
        let index = self.field_names.iter().position(|f| f == name)?;
        self.values.get(index)
    }

    pub fn field(&self, name: &str) -> Result<&'a MatArray, ModelError> {
        self.get(name).ok_or_else(|| ModelError::FieldNotFound {
            path: self.path.clone(),
            field: name.to_string(),
        })
    }

    /// Dotted path of one of this struct's fields, for error messages.
    pub fn field_path(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.path)
        }
    }

    /// Enter a field that must itself be a singleton struct.
    pub fn descend(&self, name: &str) -> Result<SingletonStruct<'a>, ModelError> {
        let value = self.field(name)?;
        Self::from_array(value, &self.field_path(name))
    }

    pub fn descend_path(&self, path: &CategoryPath<'_>) -> Result<SingletonStruct<'a>, ModelError> {
        let mut current = self.clone();
        for name in path.names() {
            current = current.descend(name)?;
        }
        Ok(current)
    }

    pub fn len(&self) -> usize {
        self.field_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field_names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a MatArray)> {
        self.field_names.iter().map(String::as_str).zip(self.values.iter())
    }
}

fn describe(value: &MatArray) -> String {
    let dims = value.dims().iter().map(usize::to_string).collect::<Vec<_>>().join("x");
    format!("{dims} {}", value.class_label())
}

/// Field mapping of the singleton struct stored under `category` in the
/// singleton struct `value`.
pub fn unwrap<'a>(value: &'a MatArray, category: &str) -> Result<SingletonStruct<'a>, ModelError> {
    unwrap_path(value, &CategoryPath::new(&[category]))
}

/// Like [`unwrap`], descending every name in `path`.
pub fn unwrap_path<'a>(value: &'a MatArray, path: &CategoryPath<'_>) -> Result<SingletonStruct<'a>, ModelError> {
    SingletonStruct::from_array(value, "")?.descend_path(path)
}

#[cfg(test)]
#[path = "unwrap.test.rs"]
mod tests;
