//! Configuration of [`ReplayMemory`](super::ReplayMemory).
use crate::schema::Schema;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`ReplayMemory`](super::ReplayMemory).
///
/// ```
/// use border_memory::{DType, ReplayMemoryConfig, Schema};
///
/// let config = ReplayMemoryConfig::default()
///     .capacity(100_000)
///     .schema(Schema::transition(&[4], &[], DType::I64))
///     .next_states(true)
///     .seed(42);
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ReplayMemoryConfig {
    /// Maximum number of records. When the memory is full, new records replace the oldest ones.
    pub capacity: usize,

    /// Schema of records.
    pub schema: Schema,

    /// If `true`, each sampled record comes with the state of its successor and
    /// terminal records are not sampled.
    pub next_states: bool,

    /// Field whose successor is attached as `next_<state_field>`.
    pub state_field: String,

    /// Scalar field marking the last record of an episode. Used only with next states.
    pub terminal_field: String,

    /// Random seed used for sampling.
    pub seed: u64,
}

impl Default for ReplayMemoryConfig {
    /// Creates a default configuration:
    /// - `capacity = 10000`
    /// - `schema = Schema::default()`
    /// - `next_states = true`
    /// - `state_field = "states"`, `terminal_field = "terminals"`
    /// - `seed = 42`
    fn default() -> Self {
        Self {
            capacity: 10000,
            schema: Schema::default(),
            next_states: true,
            state_field: "states".to_string(),
            terminal_field: "terminals".to_string(),
            seed: 42,
        }
    }
}

impl ReplayMemoryConfig {
    /// Sets the capacity of the memory.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of records, must be positive
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the schema of records.
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Enables or disables attaching next states to sampled records.
    ///
    /// When disabled, terminal records are sampled like any other record and the
    /// schema does not need a terminal field.
    ///
    /// # Arguments
    ///
    /// * `v` - If `true`, sampled batches have a `next_<state_field>` column
    pub fn next_states(mut self, v: bool) -> Self {
        self.next_states = v;
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

    /// Sets the random seed for sampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Name of the field holding next states in sampled batches.
    pub fn next_state_field(&self) -> String {
        format!("next_{}", self.state_field)
    }

    /// Loads the configuration from a YAML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// The loaded configuration, or an error if the file cannot be read or parsed
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
