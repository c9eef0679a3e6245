//! Replay memory for off-policy algorithms.
//!
//! [`ReplayMemory`] samples i.i.d. batches of records uniformly at random from a
//! [`CircularRecordStore`](crate::CircularRecordStore). When next states are enabled,
//! terminal records are excluded from sampling and each sampled record carries the
//! state of its successor.
mod base;
mod config;
pub use base::ReplayMemory;
pub use config::ReplayMemoryConfig;
