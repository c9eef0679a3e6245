//! Fixed-capacity circular storage of records.
use crate::{
    batch::RecordBatch,
    column::Column,
    error::{MemoryError, Result},
    schema::Schema,
};
use log::trace;

/// Circular buffer of records with columnar storage.
///
/// One [`Column`] of length `capacity` is allocated per field when the store is
/// created, and the store never grows. Records are written at the write cursor,
/// overwriting the oldest records once the store is full.
///
/// Readers address records with logical indices: `0` is the oldest surviving record
/// and `len() - 1` the newest one. [`CircularRecordStore::physical`] is the only place
/// where logical indices are translated into slots of the underlying columns.
///
/// When a terminal field is set with [`CircularRecordStore::with_terminal_field`],
/// the store also counts the terminal records in its valid window.
#[derive(Debug, Clone)]
pub struct CircularRecordStore {
    schema: Schema,
    capacity: usize,
    buffers: Vec<Column>,

    /// Slot at which the next record will be written.
    write_cursor: usize,

    /// Number of valid records.
    size: usize,

    /// Number of records ever inserted.
    total_inserted: u64,

    /// Position of the terminal field in the schema.
    terminal_ix: Option<usize>,

    /// Number of valid records whose terminal flag is set.
    num_terminals: usize,
}

impl CircularRecordStore {
    /// Creates an empty store.
    pub fn new(capacity: usize, schema: Schema) -> Result<Self> {
        if capacity == 0 {
            return Err(MemoryError::InvalidConfig(
                "capacity must be positive".to_string(),
            ));
        }
        let buffers = schema
            .fields()
            .iter()
            .map(|f| Column::zeros(f, capacity))
            .collect();

        Ok(Self {
            schema,
            capacity,
            buffers,
            write_cursor: 0,
            size: 0,
            total_inserted: 0,
            terminal_ix: None,
            num_terminals: 0,
        })
    }

    /// Marks the field used as terminal flag of records.
    ///
    /// The field must be a scalar field of the schema.
    pub fn with_terminal_field(mut self, name: &str) -> Result<Self> {
        let ix = self.schema.position(name).ok_or_else(|| {
            MemoryError::InvalidConfig(format!("terminal field `{}` is not in the schema", name))
        })?;
        if self.schema.fields()[ix].elem_len() != 1 {
            return Err(MemoryError::InvalidConfig(format!(
                "terminal field `{}` must be a scalar",
                name
            )));
        }
        self.terminal_ix = Some(ix);
        self.num_terminals = (0..self.size).filter(|&i| self.is_terminal(i)).count();
        Ok(self)
    }

    /// Writes records at the write cursor, returning the number of inserted records.
    ///
    /// Records are written in batch order, so if the batch is larger than the capacity,
    /// only its trailing `capacity` records survive. An empty batch is a no-op.
    pub fn insert(&mut self, records: &RecordBatch) -> Result<usize> {
        let k = records.validate(&self.schema)?;
        if k == 0 {
            return Ok(0);
        }
        let columns = records.columns_in(&self.schema);

        // Records of the batch that are overwritten within the same batch are skipped.
        let skip = k.saturating_sub(self.capacity);
        let n = k - skip;
        let start = (self.write_cursor + skip) % self.capacity;
        let n1 = n.min(self.capacity - start);
        let n2 = n - n1;

        if let Some(t) = self.terminal_ix {
            let evicted = self.count_valid_set(t, start, n1) + self.count_valid_set(t, 0, n2);
            let added = (skip..k).filter(|&row| columns[t].is_set(row)).count();
            self.num_terminals = self.num_terminals - evicted + added;
        }

        for (dst, src) in self.buffers.iter_mut().zip(columns.iter()) {
            dst.copy_rows_from(start, src, skip, n1)?;
            if n2 > 0 {
                dst.copy_rows_from(0, src, skip + n1, n2)?;
            }
        }

        self.write_cursor = (self.write_cursor + k) % self.capacity;
        self.total_inserted += k as u64;
        self.size = (self.size + k).min(self.capacity);
        trace!(
            "Inserted {} records, size = {}, write_cursor = {}",
            k,
            self.size,
            self.write_cursor
        );

        Ok(k)
    }

    /// Counts the flags set in slots `start..start + n` that hold valid records.
    fn count_valid_set(&self, field_ix: usize, start: usize, n: usize) -> usize {
        let column = &self.buffers[field_ix];
        (start..start + n)
            .filter(|&slot| self.is_valid_slot(slot) && column.is_set(slot))
            .count()
    }

    fn is_valid_slot(&self, slot: usize) -> bool {
        // Before the store becomes full, slots are filled from 0 upwards.
        self.size == self.capacity || slot < self.size
    }

    /// Translates a logical index into a physical slot.
    #[inline]
    pub fn physical(&self, logical: usize) -> usize {
        (self.write_cursor + self.capacity - self.size + logical) % self.capacity
    }

    /// Reads the element of a field at a logical index as a column of one element.
    pub fn read(&self, field: &str, index: usize) -> Result<Column> {
        if index >= self.size {
            return Err(MemoryError::OutOfRange {
                index,
                size: self.size,
            });
        }
        let ix = self.schema.position(field).ok_or_else(|| {
            MemoryError::SchemaMismatch(format!("unknown field `{}`", field))
        })?;
        Ok(self.buffers[ix].select(&[self.physical(index)]))
    }

    /// Gathers records at logical indices into a batch with every field of the schema.
    ///
    /// All indices must be smaller than [`CircularRecordStore::len`].
    pub fn gather(&self, logical_ixs: &[usize]) -> RecordBatch {
        debug_assert!(logical_ixs.iter().all(|&i| i < self.size));
        let slots = logical_ixs
            .iter()
            .map(|&i| self.physical(i))
            .collect::<Vec<_>>();
        let mut batch = RecordBatch::new();
        for (spec, column) in self.schema.fields().iter().zip(self.buffers.iter()) {
            batch.insert(spec.name.clone(), column.select(&slots));
        }
        batch
    }

    /// Gathers a single field at logical indices.
    pub(crate) fn gather_field(&self, field_ix: usize, logical_ixs: &[usize]) -> Column {
        let slots = logical_ixs
            .iter()
            .map(|&i| self.physical(i))
            .collect::<Vec<_>>();
        self.buffers[field_ix].select(&slots)
    }

    /// Returns `true` if the record at a logical index is terminal.
    ///
    /// Always `false` if no terminal field is set.
    pub fn is_terminal(&self, logical: usize) -> bool {
        match self.terminal_ix {
            Some(t) => self.buffers[t].is_set(self.physical(logical)),
            None => false,
        }
    }

    /// Number of terminal records in the valid window.
    pub fn num_terminals(&self) -> usize {
        self.num_terminals
    }

    /// Number of valid records.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if no record has been inserted.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Capacity of the store.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slot at which the next record will be written.
    pub fn write_cursor(&self) -> usize {
        self.write_cursor
    }

    /// Number of records ever inserted.
    pub fn total_inserted(&self) -> u64 {
        self.total_inserted
    }

    /// Schema of records.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::schema::{DType, FieldSpec};
    use test_log::test;

    fn schema() -> Schema {
        Schema::new(vec![
            FieldSpec::scalar("id", DType::I64),
            FieldSpec::scalar("terminals", DType::Bool),
        ])
        .unwrap()
    }

    fn records(ids: std::ops::Range<i64>, terminal: bool) -> RecordBatch {
        let n = ids.end - ids.start;
        RecordBatch::new()
            .with("id", Column::from_i64(&[], ids.collect()).unwrap())
            .with(
                "terminals",
                Column::from_bool(&[], vec![terminal; n as usize]).unwrap(),
            )
    }

    fn ids(store: &CircularRecordStore) -> Vec<i64> {
        let ixs = (0..store.len()).collect::<Vec<_>>();
        let batch = store.gather(&ixs);
        batch.get("id").unwrap().as_i64().unwrap().iter().copied().collect()
    }

    #[test]
    fn test_zero_capacity() {
        assert!(matches!(
            CircularRecordStore::new(0, schema()),
            Err(MemoryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_capacity_invariant() {
        let mut store = CircularRecordStore::new(7, schema()).unwrap();
        let mut total = 0;
        for k in [0usize, 1, 3, 5, 0, 9, 2, 14, 1].iter() {
            let k = *k as i64;
            store.insert(&records(total..total + k, false)).unwrap();
            total += k;
            assert_eq!(store.len(), (total as usize).min(7));
            assert_eq!(store.write_cursor(), total as usize % 7);
            assert_eq!(store.total_inserted(), total as u64);
        }
    }

    #[test]
    fn test_overwrite_one_by_one() {
        let mut store = CircularRecordStore::new(10, schema()).unwrap();
        for i in 0..11 {
            store.insert(&records(i..i + 1, false)).unwrap();
        }
        assert_eq!(store.len(), 10);
        assert_eq!(store.write_cursor(), 1);
        assert_eq!(store.read("id", 0).unwrap(), Column::from_i64(&[], vec![1]).unwrap());
        assert_eq!(ids(&store), (1..11).collect::<Vec<_>>());
    }

    #[test]
    fn test_batch_larger_than_capacity() {
        let mut store = CircularRecordStore::new(4, schema()).unwrap();
        store.insert(&records(0..2, false)).unwrap();
        store.insert(&records(2..11, false)).unwrap();
        assert_eq!(store.len(), 4);
        assert_eq!(store.write_cursor(), 3);
        assert_eq!(ids(&store), vec![7, 8, 9, 10]);
    }

    #[test]
    fn test_read_out_of_range() {
        let mut store = CircularRecordStore::new(4, schema()).unwrap();
        assert_eq!(
            store.read("id", 0),
            Err(MemoryError::OutOfRange { index: 0, size: 0 })
        );
        store.insert(&records(0..2, false)).unwrap();
        assert!(store.read("id", 1).is_ok());
        assert_eq!(
            store.read("id", 2),
            Err(MemoryError::OutOfRange { index: 2, size: 2 })
        );
        assert!(matches!(
            store.read("reward", 0),
            Err(MemoryError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_schema_mismatch_leaves_store_untouched() {
        let mut store = CircularRecordStore::new(4, schema()).unwrap();
        let bad = RecordBatch::new().with("id", Column::from_i64(&[], vec![0, 1]).unwrap());
        assert!(matches!(
            store.insert(&bad),
            Err(MemoryError::SchemaMismatch(_))
        ));
        assert_eq!(store.len(), 0);
        assert_eq!(store.total_inserted(), 0);
    }

    #[test]
    fn test_num_terminals() {
        let mut store = CircularRecordStore::new(5, schema())
            .unwrap()
            .with_terminal_field("terminals")
            .unwrap();
        store.insert(&records(0..3, true)).unwrap();
        assert_eq!(store.num_terminals(), 3);
        store.insert(&records(3..6, false)).unwrap();
        // Record 0 was evicted.
        assert_eq!(store.num_terminals(), 2);
        store.insert(&records(6..8, false)).unwrap();
        assert_eq!(store.num_terminals(), 0);
        store.insert(&records(8..20, true)).unwrap();
        assert_eq!(store.num_terminals(), 5);
        assert!((0..5).all(|i| store.is_terminal(i)));
    }

    #[test]
    fn test_terminal_field_must_be_scalar() {
        let schema = Schema::new(vec![FieldSpec::new("terminals", &[2], DType::Bool)]).unwrap();
        let store = CircularRecordStore::new(3, schema).unwrap();
        assert!(store.clone().with_terminal_field("terminals").is_err());
        assert!(store.with_terminal_field("done").is_err());
    }
}
