//! Configuration of [`Memory`](super::Memory).
use crate::{ReplayMemoryConfig, RingBufferConfig, Schema};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// How records are retrieved from a memory.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum RetrievalMode {
    /// Uniform sampling, see [`ReplayMemory`](crate::ReplayMemory).
    Uniform,

    /// Recent records or episodes, see [`RingBuffer`](crate::RingBuffer).
    Episodic,
}

/// Configuration of [`Memory`](super::Memory).
///
/// Fields that do not apply to the selected [`RetrievalMode`] are ignored.
///
/// ```
/// use border_memory::{MemoryConfig, RetrievalMode};
///
/// let config = MemoryConfig::default()
///     .capacity(2048)
///     .mode(RetrievalMode::Episodic)
///     .sample_episodes(true);
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct MemoryConfig {
    /// Maximum number of records.
    pub capacity: usize,

    /// Schema of records.
    pub schema: Schema,

    /// Retrieval policy.
    pub mode: RetrievalMode,

    /// Attaches next states to sampled records in [`RetrievalMode::Uniform`].
    pub attach_next_record: bool,

    /// Field whose successor is attached as next state.
    pub state_field: String,

    /// Scalar field marking the last record of an episode.
    pub terminal_field: String,

    /// Interprets batch sizes as numbers of episodes in [`RetrievalMode::Episodic`].
    pub sample_episodes: bool,

    /// Random seed used for sampling.
    pub seed: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: 10000,
            schema: Schema::default(),
            mode: RetrievalMode::Uniform,
            attach_next_record: true,
            state_field: "states".to_string(),
            terminal_field: "terminals".to_string(),
            sample_episodes: true,
            seed: 42,
        }
    }
}

impl MemoryConfig {
    /// Sets the capacity.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the schema of records.
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Sets the retrieval mode.
    pub fn mode(mut self, mode: RetrievalMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enables or disables attaching next states.
    pub fn attach_next_record(mut self, v: bool) -> Self {
        self.attach_next_record = v;
        self
    }

    /// Sets the name of the state field.
    pub fn state_field(mut self, name: impl Into<String>) -> Self {
        self.state_field = name.into();
        self
    }

    /// Sets the name of the terminal field.
    pub fn terminal_field(mut self, name: impl Into<String>) -> Self {
        self.terminal_field = name.into();
        self
    }

    /// Sets whether batch sizes are numbers of episodes.
    pub fn sample_episodes(mut self, v: bool) -> Self {
        self.sample_episodes = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
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

impl From<&MemoryConfig> for ReplayMemoryConfig {
    fn from(config: &MemoryConfig) -> Self {
        ReplayMemoryConfig::default()
            .capacity(config.capacity)
            .schema(config.schema.clone())
            .next_states(config.attach_next_record)
            .state_field(config.state_field.clone())
            .terminal_field(config.terminal_field.clone())
            .seed(config.seed)
    }
}

impl From<&MemoryConfig> for RingBufferConfig {
    fn from(config: &MemoryConfig) -> Self {
        RingBufferConfig::default()
            .capacity(config.capacity)
            .schema(config.schema.clone())
            .terminal_field(config.terminal_field.clone())
            .sample_episodes(config.sample_episodes)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_memory_config() -> Result<()> {
        let config = MemoryConfig::default()
            .capacity(64)
            .mode(RetrievalMode::Episodic)
            .sample_episodes(false)
            .seed(3);

        let dir = TempDir::new("memory_config")?;
        let path = dir.path().join("memory_config.yaml");
        config.save(&path)?;
        let config_ = MemoryConfig::load(&path)?;
        assert_eq!(config, config_);

        let rb_config = RingBufferConfig::from(&config_);
        assert_eq!(rb_config.capacity, 64);
        assert!(!rb_config.sample_episodes);
        Ok(())
    }
}
