//! Memory shared between an actor and learners running on different threads.
use crate::{
    base::{ExperienceBufferBase, ReplayBufferBase},
    batch::RecordBatch,
    error::{MemoryError, Result},
};
use std::sync::{Arc, Mutex, MutexGuard};

/// A cloneable handle to a memory guarded by a mutex.
///
/// Insertion and retrieval both hold the lock for their whole duration, so a reader
/// observes the memory either before or after an insertion, never in between.
/// Batches are copied out of the memory before the lock is released.
///
/// ```
/// use border_memory::{MemoryConfig, Memory, ReplayBufferBase, SharedMemory};
///
/// let memory = Memory::build(&MemoryConfig::default().capacity(100)).unwrap();
/// let shared = SharedMemory::new(memory);
/// let learner = shared.clone();
///
/// std::thread::spawn(move || {
///     let _batch = learner.batch(32).unwrap();
/// })
/// .join()
/// .unwrap();
/// ```
pub struct SharedMemory<M> {
    inner: Arc<Mutex<M>>,
}

impl<M> Clone for SharedMemory<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<M> SharedMemory<M> {
    /// Wraps a memory.
    pub fn new(memory: M) -> Self {
        Self {
            inner: Arc::new(Mutex::new(memory)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, M>> {
        self.inner.lock().map_err(|_| MemoryError::LockPoisoned)
    }

    /// Runs a closure with exclusive access to the memory.
    pub fn with<T>(&self, f: impl FnOnce(&mut M) -> T) -> Result<T> {
        let mut memory = self.lock()?;
        Ok(f(&mut *memory))
    }
}

impl<M: ExperienceBufferBase> SharedMemory<M> {
    /// Inserts records, see [`ExperienceBufferBase::insert`].
    pub fn insert(&self, records: &RecordBatch) -> Result<usize> {
        self.lock()?.insert(records)
    }

    /// Number of valid records.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Returns `true` if the memory has no valid record.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Capacity of the memory.
    pub fn capacity(&self) -> Result<usize> {
        Ok(self.lock()?.capacity())
    }
}

impl<M: ReplayBufferBase> SharedMemory<M> {
    /// Builds a memory and wraps it.
    pub fn build(config: &M::Config) -> Result<Self> {
        Ok(Self::new(M::build(config)?))
    }

    /// Takes a batch, see [`ReplayBufferBase::batch`].
    pub fn batch(&self, size: usize) -> Result<RecordBatch> {
        self.lock()?.batch(size)
    }
}
