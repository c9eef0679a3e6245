//! Ring buffer serving recent records and complete episodes.
use super::RingBufferConfig;
use crate::{
    base::{ExperienceBufferBase, ReplayBufferBase},
    batch::RecordBatch,
    column::Column,
    error::Result,
    store::CircularRecordStore,
};
use log::{debug, trace};
use std::collections::VecDeque;

/// A ring buffer for on-policy algorithms.
///
/// Reads are non-destructive: neither [`RingBuffer::get_records`] nor
/// [`RingBuffer::get_episodes`] removes records from the buffer.
///
/// Episode boundaries are tracked as the insertion sequence numbers of the records
/// that start episodes, i.e., the records right after terminal ones. The first record
/// ever inserted also starts an episode. A boundary is discarded as soon as its record
/// is overwritten, so an episode whose beginning has been overwritten is never
/// reported as complete.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    store: CircularRecordStore,
    terminal_field: String,

    /// Sequence numbers of records starting episodes, in ascending order.
    /// The last one may be equal to the number of inserted records, marking the
    /// start of an episode of which no record has been inserted yet.
    episode_starts: VecDeque<u64>,

    sample_episodes: bool,
}

impl RingBuffer {
    /// Sequence number of the oldest valid record.
    fn oldest_seq(&self) -> u64 {
        self.store.total_inserted() - self.store.len() as u64
    }

    /// Discards boundaries of records that have been overwritten.
    fn prune(&mut self) {
        let oldest = self.oldest_seq();
        while let Some(&s) = self.episode_starts.front() {
            if s >= oldest {
                break;
            }
            trace!("Discarded episode boundary at sequence {}", s);
            self.episode_starts.pop_front();
        }
    }

    /// Number of complete episodes in the buffer.
    pub fn num_episodes(&self) -> usize {
        self.episode_starts.len().saturating_sub(1)
    }

    /// Slots of records starting episodes, oldest first.
    ///
    /// The last slot may be the write cursor when the newest record is terminal.
    pub fn episode_starts(&self) -> impl Iterator<Item = usize> + '_ {
        let capacity = self.store.capacity() as u64;
        self.episode_starts.iter().map(move |&s| (s % capacity) as usize)
    }

    /// Returns the `n` most recent records, oldest first.
    ///
    /// If `n` exceeds the number of records, all records are returned.
    pub fn get_records(&self, n: usize) -> RecordBatch {
        let size = self.store.len();
        let m = n.min(size);
        let ixs = (size - m..size).collect::<Vec<_>>();
        self.store.gather(&ixs)
    }

    /// Returns the records of the `n` most recent complete episodes, oldest first.
    ///
    /// An episode is complete when its terminal record has been inserted and its first
    /// record has not been overwritten. If there are fewer than `n` complete episodes,
    /// all of them are returned.
    pub fn get_episodes(&self, n: usize) -> RecordBatch {
        let k = n.min(self.num_episodes());
        if k == 0 {
            return RecordBatch::empty(self.store.schema());
        }

        let len = self.episode_starts.len();
        let oldest = self.oldest_seq();
        let start = (self.episode_starts[len - 1 - k] - oldest) as usize;
        let end = (self.episode_starts[len - 1] - oldest) as usize;
        trace!("Returns {} episodes, {} records", k, end - start);

        let ixs = (start..end).collect::<Vec<_>>();
        self.store.gather(&ixs)
    }

    /// Reads the element of a field at a logical index, `0` being the oldest record.
    pub fn read(&self, field: &str, index: usize) -> Result<Column> {
        self.store.read(field, index)
    }

    /// Slot at which the next record will be written.
    pub fn write_cursor(&self) -> usize {
        self.store.write_cursor()
    }

    /// The underlying store.
    pub fn store(&self) -> &CircularRecordStore {
        &self.store
    }
}

impl ExperienceBufferBase for RingBuffer {
    fn insert(&mut self, records: &RecordBatch) -> Result<usize> {
        let total = self.store.total_inserted();
        let k = self.store.insert(records)?;

        if let Some(terminals) = records.get(&self.terminal_field) {
            // A terminal record overwritten within the batch still starts the episode
            // of its successor if that one survives.
            let first = k.saturating_sub(self.store.capacity() + 1);
            for row in first..k {
                if terminals.is_set(row) {
                    self.episode_starts.push_back(total + row as u64 + 1);
                }
            }
        }
        self.prune();

        Ok(k)
    }

    fn len(&self) -> usize {
        self.store.len()
    }

    fn capacity(&self) -> usize {
        self.store.capacity()
    }
}

impl ReplayBufferBase for RingBuffer {
    type Config = RingBufferConfig;

    fn build(config: &Self::Config) -> Result<Self> {
        let store = CircularRecordStore::new(config.capacity, config.schema.clone())?
            .with_terminal_field(&config.terminal_field)?;

        let mut episode_starts = VecDeque::with_capacity(config.capacity + 1);
        episode_starts.push_back(0);

        debug!(
            "Built ring buffer with capacity {}, sample episodes {}",
            config.capacity, config.sample_episodes
        );

        Ok(Self {
            store,
            terminal_field: config.terminal_field.clone(),
            episode_starts,
            sample_episodes: config.sample_episodes,
        })
    }

    /// Returns [`RingBuffer::get_episodes`] if the buffer is configured to sample
    /// episodes, otherwise [`RingBuffer::get_records`].
    fn batch(&mut self, size: usize) -> Result<RecordBatch> {
        match self.sample_episodes {
            true => Ok(self.get_episodes(size)),
            false => Ok(self.get_records(size)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        column::Column,
        schema::{DType, FieldSpec, Schema},
    };
    use test_log::test;

    fn schema() -> Schema {
        Schema::new(vec![
            FieldSpec::scalar("id", DType::I64),
            FieldSpec::scalar("terminals", DType::Bool),
        ])
        .unwrap()
    }

    fn ring_buffer(capacity: usize) -> RingBuffer {
        let config = RingBufferConfig::default()
            .capacity(capacity)
            .schema(schema());
        RingBuffer::build(&config).unwrap()
    }

    /// Records with consecutive ids starting at `start`, terminal at the given offsets.
    fn records(start: i64, n: usize, terminal_at: &[usize]) -> RecordBatch {
        let terminals = (0..n).map(|i| terminal_at.contains(&i)).collect();
        RecordBatch::new()
            .with(
                "id",
                Column::from_i64(&[], (start..start + n as i64).collect()).unwrap(),
            )
            .with("terminals", Column::from_bool(&[], terminals).unwrap())
    }

    fn ids(batch: &RecordBatch) -> Vec<i64> {
        batch.get("id").unwrap().as_i64().unwrap().iter().copied().collect()
    }

    #[test]
    fn test_get_records() {
        let mut rb = ring_buffer(5);
        assert_eq!(rb.get_records(3).len(), 0);

        rb.insert(&records(0, 3, &[])).unwrap();
        assert_eq!(ids(&rb.get_records(2)), vec![1, 2]);
        assert_eq!(ids(&rb.get_records(10)), vec![0, 1, 2]);

        rb.insert(&records(3, 4, &[1])).unwrap();
        assert_eq!(ids(&rb.get_records(10)), vec![2, 3, 4, 5, 6]);
        assert_eq!(rb.get_records(4), rb.get_records(4));
    }

    #[test]
    fn test_get_episodes() {
        let mut rb = ring_buffer(20);
        // Episodes: [0, 1, 2], [3, 4], [5, 6, 7, 8], then an ongoing one [9, 10].
        rb.insert(&records(0, 4, &[2])).unwrap();
        rb.insert(&records(4, 7, &[0, 4])).unwrap();
        assert_eq!(rb.num_episodes(), 3);

        assert_eq!(ids(&rb.get_episodes(1)), vec![5, 6, 7, 8]);
        assert_eq!(ids(&rb.get_episodes(2)), vec![3, 4, 5, 6, 7, 8]);
        assert_eq!(ids(&rb.get_episodes(10)), (0..9).collect::<Vec<_>>());
        assert_eq!(rb.get_episodes(0).len(), 0);
    }

    #[test]
    fn test_no_complete_episode() {
        let mut rb = ring_buffer(4);
        let batch = rb.get_episodes(2);
        assert_eq!(batch.len(), 0);
        assert_eq!(batch.num_fields(), 2);

        rb.insert(&records(0, 3, &[])).unwrap();
        assert_eq!(rb.num_episodes(), 0);
        assert_eq!(rb.get_episodes(2).len(), 0);
    }

    #[test]
    fn test_truncated_episode_is_excluded() {
        let mut rb = ring_buffer(5);
        rb.insert(&records(0, 3, &[2])).unwrap();
        rb.insert(&records(3, 3, &[2])).unwrap();
        // Record 0 has been overwritten, so the first episode is incomplete.
        assert_eq!(rb.num_episodes(), 1);
        assert_eq!(ids(&rb.get_episodes(5)), vec![3, 4, 5]);
    }

    #[test]
    fn test_episode_starting_at_oldest_record() {
        let mut rb = ring_buffer(4);
        rb.insert(&records(0, 6, &[1, 5])).unwrap();
        // The terminal record 1 is gone but record 2 still starts an episode.
        assert_eq!(rb.num_episodes(), 1);
        assert_eq!(ids(&rb.get_episodes(3)), vec![2, 3, 4, 5]);
        assert_eq!(rb.episode_starts().collect::<Vec<_>>(), vec![2, 2]);
    }

    #[test]
    fn test_episode_across_wraparound() {
        let mut rb = ring_buffer(6);
        rb.insert(&records(0, 4, &[3])).unwrap();
        rb.insert(&records(4, 4, &[3])).unwrap();
        assert_eq!(rb.write_cursor(), 2);
        assert_eq!(rb.num_episodes(), 1);
        assert_eq!(ids(&rb.get_episodes(1)), vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_batch_mode() {
        let config = RingBufferConfig::default()
            .capacity(10)
            .schema(schema())
            .sample_episodes(false);
        let mut rb = RingBuffer::build(&config).unwrap();
        rb.insert(&records(0, 5, &[1])).unwrap();
        assert_eq!(ids(&rb.batch(1).unwrap()), vec![4]);

        let config = config.sample_episodes(true);
        let mut rb = RingBuffer::build(&config).unwrap();
        rb.insert(&records(0, 5, &[1])).unwrap();
        assert_eq!(ids(&rb.batch(1).unwrap()), vec![0, 1]);
    }
}
