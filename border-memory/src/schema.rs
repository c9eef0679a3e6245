//! Record schema shared by all records inserted into a memory.
//!
//! A [`Schema`] is an ordered list of named fields. Each field has an element shape,
//! which does not include the batch axis, and an element type given by [`DType`].
use crate::error::{MemoryError, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, convert::TryFrom};

/// Element type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    /// 32-bit floating point values, e.g., observations and rewards.
    F32,

    /// 64-bit signed integers, e.g., discrete actions.
    I64,

    /// Boolean flags, e.g., terminal markers.
    Bool,
}

/// Name, element shape and element type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Name of the field.
    pub name: String,

    /// Shape of a single element. An empty shape denotes a scalar.
    #[serde(default)]
    pub shape: Vec<usize>,

    /// Element type.
    pub dtype: DType,
}

impl FieldSpec {
    /// Creates a field with the given element shape.
    pub fn new(name: impl Into<String>, shape: &[usize], dtype: DType) -> Self {
        Self {
            name: name.into(),
            shape: shape.to_vec(),
            dtype,
        }
    }

    /// Creates a scalar field.
    pub fn scalar(name: impl Into<String>, dtype: DType) -> Self {
        Self::new(name, &[], dtype)
    }

    /// Number of values in a single element.
    pub fn elem_len(&self) -> usize {
        self.shape.iter().product()
    }
}

/// Ordered set of fields agreed at the construction of a memory.
///
/// Field names are unique. The order of the fields is the order in which
/// batches returned from memories list their columns.
///
/// ```
/// use border_memory::{DType, FieldSpec, Schema};
///
/// let schema = Schema::new(vec![
///     FieldSpec::new("states", &[4], DType::F32),
///     FieldSpec::scalar("actions", DType::I64),
///     FieldSpec::scalar("reward", DType::F32),
///     FieldSpec::scalar("terminals", DType::Bool),
/// ])
/// .unwrap();
///
/// assert_eq!(schema.len(), 4);
/// assert_eq!(schema.field("states").unwrap().shape, vec![4]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldSpec>", into = "Vec<FieldSpec>")]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Creates a schema, rejecting empty or duplicated field names.
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self> {
        if fields.is_empty() {
            return Err(MemoryError::SchemaMismatch(
                "schema must have at least one field".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for f in fields.iter() {
            if f.name.is_empty() {
                return Err(MemoryError::SchemaMismatch(
                    "field name must not be empty".to_string(),
                ));
            }
            if !names.insert(f.name.as_str()) {
                return Err(MemoryError::SchemaMismatch(format!(
                    "duplicated field `{}`",
                    f.name
                )));
            }
        }

        Ok(Self { fields })
    }

    /// Schema of a standard transition: `states`, `actions`, `reward` and `terminals`.
    pub fn transition(state_shape: &[usize], action_shape: &[usize], action_dtype: DType) -> Self {
        Self {
            fields: vec![
                FieldSpec::new("states", state_shape, DType::F32),
                FieldSpec::new("actions", action_shape, action_dtype),
                FieldSpec::scalar("reward", DType::F32),
                FieldSpec::scalar("terminals", DType::Bool),
            ],
        }
    }

    /// Returns the field with the given name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the position of the field with the given name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns `true` if the schema has a field with the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Fields in order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always `false`, a schema has at least one field.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for Schema {
    /// Transitions with single-dimensional states and discrete actions.
    fn default() -> Self {
        Self::transition(&[1], &[], DType::I64)
    }
}

impl TryFrom<Vec<FieldSpec>> for Schema {
    type Error = MemoryError;

    fn try_from(fields: Vec<FieldSpec>) -> Result<Self> {
        Self::new(fields)
    }
}

impl From<Schema> for Vec<FieldSpec> {
    fn from(schema: Schema) -> Self {
        schema.fields
    }
}
