//! Interfaces of experience memories.
//!
//! Memories are used by two kinds of processes: actors, which insert records
//! produced by interacting with environments, and learners, which take batches
//! of records for optimization steps. [`ExperienceBufferBase`] is the interface
//! for the former and [`ReplayBufferBase`] for the latter.
use crate::{batch::RecordBatch, error::Result};

/// Interface for buffers that store records.
///
/// This trait is used by processes inserting records, typically actors
/// interacting with environments.
///
/// # Examples
///
/// ```
/// use border_memory::{
///     Column, ExperienceBufferBase, RecordBatch, ReplayBufferBase, RingBuffer, RingBufferConfig,
/// };
///
/// let mut buffer = RingBuffer::build(&RingBufferConfig::default().capacity(2)).unwrap();
/// let records = RecordBatch::new()
///     .with("states", Column::from_f32(&[1], vec![0., 1., 2.]).unwrap())
///     .with("actions", Column::from_i64(&[], vec![0, 1, 0]).unwrap())
///     .with("reward", Column::from_f32(&[], vec![0., 0., 1.]).unwrap())
///     .with("terminals", Column::from_bool(&[], vec![false, false, true]).unwrap());
///
/// assert_eq!(buffer.insert(&records), Ok(3));
/// assert_eq!(buffer.len(), buffer.capacity());
/// ```
pub trait ExperienceBufferBase {
    /// Inserts records into the buffer.
    ///
    /// # Arguments
    ///
    /// * `records` - Records in columnar layout, one column per field of the schema
    ///
    /// # Returns
    ///
    /// The number of inserted records, or [`MemoryError::SchemaMismatch`] if the
    /// records do not conform to the schema. In that case the buffer is unchanged.
    ///
    /// [`MemoryError::SchemaMismatch`]: crate::MemoryError::SchemaMismatch
    fn insert(&mut self, records: &RecordBatch) -> Result<usize>;

    /// Number of valid records.
    fn len(&self) -> usize;

    /// Maximum number of records the buffer can hold.
    fn capacity(&self) -> usize;

    /// Returns `true` if the buffer has no valid record.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Interface for buffers that generate batches for training.
///
/// It is independent of [`ExperienceBufferBase`] and focuses on batch generation.
///
/// # Associated Types
///
/// * `Config` - Configuration of the buffer
pub trait ReplayBufferBase: Sized {
    /// Configuration of the buffer.
    type Config: Clone;

    /// Builds a buffer from the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration of the buffer
    ///
    /// # Returns
    ///
    /// A new, empty buffer, or [`MemoryError::InvalidConfig`] if the configuration
    /// is inconsistent, e.g., zero capacity or a field missing from the schema.
    ///
    /// [`MemoryError::InvalidConfig`]: crate::MemoryError::InvalidConfig
    fn build(config: &Self::Config) -> Result<Self>;

    /// Constructs a batch of records for training.
    ///
    /// Requesting more records than available is not an error, the batch is
    /// clamped to what exists. The returned batch does not share storage with
    /// the buffer.
    ///
    /// # Arguments
    ///
    /// * `size` - The maximum number of records (or episodes, for episodic buffers)
    ///
    /// # Returns
    ///
    /// A batch with every field of the schema, possibly empty
    fn batch(&mut self, size: usize) -> Result<RecordBatch>;
}
