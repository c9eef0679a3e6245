//! Batches of records exchanged with memories.
use crate::{
    column::Column,
    error::{MemoryError, Result},
    schema::Schema,
};

/// An ordered mapping from field names to columns of the same length.
///
/// `RecordBatch` is both the input of insertion and the output of sampling.
/// Records are stored column-wise: the `i`-th record consists of the `i`-th
/// element of every column.
///
/// ```
/// use border_memory::{Column, RecordBatch};
///
/// let batch = RecordBatch::new()
///     .with("states", Column::from_f32(&[2], vec![0., 1., 2., 3.]).unwrap())
///     .with("terminals", Column::from_bool(&[], vec![false, true]).unwrap());
///
/// assert_eq!(batch.len(), 2);
/// assert!(batch.get("states").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordBatch {
    columns: Vec<(String, Column)>,
}

impl RecordBatch {
    /// Creates a batch without any field.
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Creates a batch of zero records that has every field of the schema.
    pub fn empty(schema: &Schema) -> Self {
        Self {
            columns: schema
                .fields()
                .iter()
                .map(|f| (f.name.clone(), Column::zeros(f, 0)))
                .collect(),
        }
    }

    /// Adds a column, consuming and returning the batch.
    pub fn with(mut self, name: impl Into<String>, column: Column) -> Self {
        self.insert(name, column);
        self
    }

    /// Adds a column. A column of the same name is replaced in place.
    pub fn insert(&mut self, name: impl Into<String>, column: Column) {
        let name = name.into();
        match self.columns.iter_mut().find(|(k, _)| *k == name) {
            Some((_, c)) => *c = column,
            None => self.columns.push((name, column)),
        }
    }

    /// Returns the column of the given field.
    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|(k, _)| k == name).map(|(_, c)| c)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.columns.first().map(|(_, c)| c.len()).unwrap_or(0)
    }

    /// Returns `true` if the batch has no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of fields.
    pub fn num_fields(&self) -> usize {
        self.columns.len()
    }

    /// Field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(k, _)| k.as_str())
    }

    /// Iterates over pairs of field names and columns.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(k, c)| (k.as_str(), c))
    }

    /// Consumes the batch, returning pairs of field names and columns.
    pub fn into_inner(self) -> Vec<(String, Column)> {
        self.columns
    }

    /// Checks that the batch holds exactly the fields of the schema, and returns
    /// the number of records.
    ///
    /// Missing or unknown fields, mismatched element types or shapes, and columns
    /// of different lengths are reported as [`MemoryError::SchemaMismatch`].
    pub fn validate(&self, schema: &Schema) -> Result<usize> {
        if self.columns.len() != schema.len() {
            return Err(MemoryError::SchemaMismatch(format!(
                "expected {} fields, got {}",
                schema.len(),
                self.columns.len()
            )));
        }

        let mut len = None;
        for spec in schema.fields() {
            let column = self.get(&spec.name).ok_or_else(|| {
                MemoryError::SchemaMismatch(format!("missing field `{}`", spec.name))
            })?;
            column.conforms_to(spec)?;
            match len {
                None => len = Some(column.len()),
                Some(n) if n != column.len() => {
                    return Err(MemoryError::SchemaMismatch(format!(
                        "field `{}` has {} records, expected {}",
                        spec.name,
                        column.len(),
                        n
                    )))
                }
                _ => {}
            }
        }

        Ok(len.unwrap_or(0))
    }

    /// Reorders columns to follow the schema.
    ///
    /// Call this after a successful [`RecordBatch::validate`].
    pub(crate) fn columns_in(&self, schema: &Schema) -> Vec<&Column> {
        schema
            .fields()
            .iter()
            .filter_map(|f| self.get(&f.name))
            .collect()
    }
}
