//! Configuration of [`RingBuffer`](super::RingBuffer).
use crate::schema::Schema;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`RingBuffer`](super::RingBuffer).
///
/// # Examples
///
/// ```rust
/// use border_memory::{DType, RingBufferConfig, Schema};
///
/// // Batches of 2048 time steps, regardless of episode boundaries.
/// let config = RingBufferConfig::default()
///     .capacity(2048)
///     .schema(Schema::transition(&[8], &[2], DType::F32))
///     .sample_episodes(false);
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct RingBufferConfig {
    /// Maximum number of records.
    pub capacity: usize,

    /// Schema of records.
    pub schema: Schema,

    /// Scalar field marking the last record of an episode.
    pub terminal_field: String,

    /// If `true`, [`batch()`](crate::ReplayBufferBase::batch) interprets its argument
    /// as a number of episodes, otherwise as a number of records.
    pub sample_episodes: bool,
}

impl Default for RingBufferConfig {
    fn default() -> Self {
        Self {
            capacity: 10000,
            schema: Schema::default(),
            terminal_field: "terminals".to_string(),
            sample_episodes: true,
        }
    }
}

impl RingBufferConfig {
    /// Sets the capacity of the buffer.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the schema of records.
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Sets the name of the terminal field.
    pub fn terminal_field(mut self, name: impl Into<String>) -> Self {
        self.terminal_field = name.into();
        self
    }

    /// Sets how batches are built.
    ///
    /// # Arguments
    ///
    /// * `v` - If `true`, batches consist of the most recent complete episodes,
    ///   otherwise of the most recent records
    pub fn sample_episodes(mut self, v: bool) -> Self {
        self.sample_episodes = v;
        self
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
