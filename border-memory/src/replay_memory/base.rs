//! Replay memory with uniform sampling.
use super::ReplayMemoryConfig;
use crate::{
    base::{ExperienceBufferBase, ReplayBufferBase},
    batch::RecordBatch,
    column::Column,
    error::{MemoryError, Result},
    store::CircularRecordStore,
};
use log::{debug, trace};
use rand::{rngs::StdRng, seq::index, Rng, SeedableRng};
use std::collections::HashSet;

/// Where the next states of sampled records come from.
#[derive(Debug, Clone)]
struct NextStates {
    /// Position of the state field in the schema.
    state_ix: usize,

    /// Name of the field in sampled batches.
    name: String,
}

/// A replay memory that samples records uniformly at random without replacement.
///
/// With next states enabled, a record is a sampling candidate only if it is not
/// terminal, and each sampled record comes with the state of the record inserted
/// right after it. The newest record has no successor yet; its own state is used
/// as the next state.
///
/// ```
/// use border_memory::{
///     Column, DType, ExperienceBufferBase, RecordBatch, ReplayBufferBase, ReplayMemory,
///     ReplayMemoryConfig, Schema,
/// };
///
/// let config = ReplayMemoryConfig::default()
///     .capacity(10)
///     .schema(Schema::transition(&[2], &[], DType::I64));
/// let mut memory = ReplayMemory::build(&config).unwrap();
///
/// let records = RecordBatch::new()
///     .with("states", Column::from_f32(&[2], vec![0., 0., 1., 1., 2., 2.]).unwrap())
///     .with("actions", Column::from_i64(&[], vec![0, 1, 0]).unwrap())
///     .with("reward", Column::from_f32(&[], vec![0., 0., 1.]).unwrap())
///     .with("terminals", Column::from_bool(&[], vec![false, false, true]).unwrap());
/// memory.insert(&records).unwrap();
///
/// // The terminal record is not a candidate.
/// let batch = memory.sample(8);
/// assert_eq!(batch.len(), 2);
/// assert!(batch.get("next_states").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct ReplayMemory {
    store: CircularRecordStore,
    next_states: Option<NextStates>,
    rng: StdRng,
}

impl ReplayMemory {
    /// Number of records that can be sampled.
    pub fn num_candidates(&self) -> usize {
        match self.next_states {
            Some(_) => self.store.len() - self.store.num_terminals(),
            None => self.store.len(),
        }
    }

    /// Draws logical indices of at most `n` distinct candidates in random order.
    ///
    /// With `m` records to draw, `t` terminal records and `c` candidates in a memory
    /// of `size` records, the expected cost is `O(min(m + t, m * size / (c - m + 1)))`.
    /// It does not depend on the capacity, but a memory made almost only of terminal
    /// records still costs up to `O(size)` per call.
    fn draw(&mut self, n: usize) -> Vec<usize> {
        let size = self.store.len();
        let c = self.num_candidates();
        let m = n.min(c);
        if m == 0 {
            return Vec::new();
        }

        if self.next_states.is_none() || self.store.num_terminals() == 0 {
            return index::sample(&mut self.rng, size, m).into_vec();
        }

        let t = self.store.num_terminals();
        if m * size < (m + t) * (c - m + 1) {
            // Few terminals: rejection sampling, about size / (c - m + 1) draws per record.
            let mut seen = HashSet::with_capacity(m);
            let mut ixs = Vec::with_capacity(m);
            while ixs.len() < m {
                let i = self.rng.gen_range(0..size);
                if !self.store.is_terminal(i) && seen.insert(i) {
                    ixs.push(i);
                }
            }
            return ixs;
        }

        // Among any m + t distinct indices, at most t are terminal. Taking the first m
        // non-terminal ones of a uniformly shuffled draw keeps the selection uniform.
        let store = &self.store;
        index::sample(&mut self.rng, size, (m + t).min(size))
            .into_iter()
            .filter(|&i| !store.is_terminal(i))
            .take(m)
            .collect()
    }

    /// Samples at most `num_records` records uniformly at random without replacement.
    ///
    /// The batch has every field of the schema, plus the next-state field if enabled.
    /// An empty memory yields an empty batch.
    ///
    /// The newest record has no successor yet. If it is sampled, its next state is its
    /// own state, which is not a transition observed in the environment.
    pub fn sample(&mut self, num_records: usize) -> RecordBatch {
        let ixs = self.draw(num_records);
        trace!("Sampled {} of {} requested records", ixs.len(), num_records);

        let mut batch = self.store.gather(&ixs);
        if let Some(next) = &self.next_states {
            let last = self.store.len().saturating_sub(1);
            let next_ixs = ixs.iter().map(|&i| (i + 1).min(last)).collect::<Vec<_>>();
            batch.insert(
                next.name.clone(),
                self.store.gather_field(next.state_ix, &next_ixs),
            );
        }
        batch
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

impl ExperienceBufferBase for ReplayMemory {
    fn insert(&mut self, records: &RecordBatch) -> Result<usize> {
        self.store.insert(records)
    }

    fn len(&self) -> usize {
        self.store.len()
    }

    fn capacity(&self) -> usize {
        self.store.capacity()
    }
}

impl ReplayBufferBase for ReplayMemory {
    type Config = ReplayMemoryConfig;

    fn build(config: &Self::Config) -> Result<Self> {
        let mut store = CircularRecordStore::new(config.capacity, config.schema.clone())?;

        // Terminal records only matter when next states are attached.
        let next_states = if config.next_states {
            store = store.with_terminal_field(&config.terminal_field)?;
            let state_ix = config.schema.position(&config.state_field).ok_or_else(|| {
                MemoryError::InvalidConfig(format!(
                    "state field `{}` is not in the schema",
                    config.state_field
                ))
            })?;
            let name = config.next_state_field();
            if config.schema.contains(&name) {
                return Err(MemoryError::InvalidConfig(format!(
                    "field `{}` is reserved for next states",
                    name
                )));
            }
            Some(NextStates { state_ix, name })
        } else {
            None
        };

        debug!(
            "Built replay memory with capacity {}, next states {}",
            config.capacity, config.next_states
        );

        Ok(Self {
            store,
            next_states,
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    fn batch(&mut self, size: usize) -> Result<RecordBatch> {
        Ok(self.sample(size))
    }
}
