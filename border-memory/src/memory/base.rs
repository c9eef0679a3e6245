//! A memory selected by configuration.
use super::{MemoryConfig, RetrievalMode};
use crate::{
    base::{ExperienceBufferBase, ReplayBufferBase},
    batch::RecordBatch,
    column::Column,
    error::Result,
    ReplayMemory, ReplayMemoryConfig, RingBuffer, RingBufferConfig,
};

#[cfg_attr(doc, aquamarine::aquamarine)]
/// A memory whose retrieval policy is chosen by [`MemoryConfig::mode`].
///
/// Both policies share the same circular storage; only the way records are
/// read differs.
///
/// ```mermaid
/// graph LR
///     A[Actor]-->|insert|M[Memory]
///     M-->S[CircularRecordStore]
///     L1[Off-policy learner]-->|batch|U[ReplayMemory]
///     L2[On-policy learner]-->|batch|R[RingBuffer]
///     U-->S
///     R-->S
/// ```
#[derive(Debug, Clone)]
pub enum Memory {
    /// Uniform sampling.
    Uniform(ReplayMemory),

    /// Recent records or episodes.
    Episodic(RingBuffer),
}

impl Memory {
    /// Retrieval mode of the memory.
    pub fn mode(&self) -> RetrievalMode {
        match self {
            Self::Uniform(_) => RetrievalMode::Uniform,
            Self::Episodic(_) => RetrievalMode::Episodic,
        }
    }

    /// Reads the element of a field at a logical index, `0` being the oldest record.
    pub fn read(&self, field: &str, index: usize) -> Result<Column> {
        match self {
            Self::Uniform(m) => m.read(field, index),
            Self::Episodic(m) => m.read(field, index),
        }
    }
}

impl ExperienceBufferBase for Memory {
    fn insert(&mut self, records: &RecordBatch) -> Result<usize> {
        match self {
            Self::Uniform(m) => m.insert(records),
            Self::Episodic(m) => m.insert(records),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Uniform(m) => m.len(),
            Self::Episodic(m) => m.len(),
        }
    }

    fn capacity(&self) -> usize {
        match self {
            Self::Uniform(m) => m.capacity(),
            Self::Episodic(m) => m.capacity(),
        }
    }
}

impl ReplayBufferBase for Memory {
    type Config = MemoryConfig;

    fn build(config: &Self::Config) -> Result<Self> {
        match config.mode {
            RetrievalMode::Uniform => {
                Ok(Self::Uniform(ReplayMemory::build(&ReplayMemoryConfig::from(config))?))
            }
            RetrievalMode::Episodic => {
                Ok(Self::Episodic(RingBuffer::build(&RingBufferConfig::from(config))?))
            }
        }
    }

    fn batch(&mut self, size: usize) -> Result<RecordBatch> {
        match self {
            Self::Uniform(m) => m.batch(size),
            Self::Episodic(m) => m.batch(size),
        }
    }
}
