#![warn(missing_docs)]
//! Experience memories for reinforcement learning.
//!
//! This crate provides fixed-capacity memories of transition records, used by
//! agents to store experiences and to build batches for optimization steps.
//!
//! # Key Components
//!
//! - [`Schema`]: Names, element shapes and element types of the fields of records
//! - [`RecordBatch`]: Records in columnar layout, the input and output of memories
//! - [`CircularRecordStore`]: Circular storage owning one column per field
//! - [`ReplayMemory`]: Uniform sampling without replacement, for off-policy algorithms
//! - [`RingBuffer`]: Recent records or complete episodes, for on-policy algorithms
//! - [`Memory`]: A memory whose retrieval policy is selected by [`MemoryConfig`]
//! - [`SharedMemory`]: A memory shared between an actor and learners
//!
//! # Examples
//!
//! ```rust
//! use border_memory::{
//!     Column, DType, ExperienceBufferBase, RecordBatch, ReplayBufferBase, RingBuffer,
//!     RingBufferConfig, Schema,
//! };
//!
//! let config = RingBufferConfig::default()
//!     .capacity(100)
//!     .schema(Schema::transition(&[1], &[], DType::I64));
//! let mut buffer = RingBuffer::build(&config).unwrap();
//!
//! let records = RecordBatch::new()
//!     .with("states", Column::from_f32(&[1], vec![0., 1., 2.]).unwrap())
//!     .with("actions", Column::from_i64(&[], vec![1, 0, 1]).unwrap())
//!     .with("reward", Column::from_f32(&[], vec![1., 1., 1.]).unwrap())
//!     .with("terminals", Column::from_bool(&[], vec![false, true, false]).unwrap());
//! buffer.insert(&records).unwrap();
//!
//! // The first two records form the only complete episode.
//! assert_eq!(buffer.get_episodes(4).len(), 2);
//! assert_eq!(buffer.get_records(4).len(), 3);
//! ```
pub mod error;

mod base;
mod batch;
mod column;
mod memory;
mod replay_memory;
mod ring_buffer;
mod schema;
mod shared;
mod store;

pub use base::{ExperienceBufferBase, ReplayBufferBase};
pub use batch::RecordBatch;
pub use column::Column;
pub use error::MemoryError;
pub use memory::{Memory, MemoryConfig, RetrievalMode};
pub use replay_memory::{ReplayMemory, ReplayMemoryConfig};
pub use ring_buffer::{RingBuffer, RingBufferConfig};
pub use schema::{DType, FieldSpec, Schema};
pub use shared::SharedMemory;
pub use store::CircularRecordStore;
