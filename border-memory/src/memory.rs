//! Memory with a retrieval policy selected by configuration.
mod base;
mod config;
pub use base::Memory;
pub use config::{MemoryConfig, RetrievalMode};
