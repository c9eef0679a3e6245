//! Ring buffer for on-policy algorithms.
//!
//! [`RingBuffer`] serves the most recent records or the most recent complete
//! episodes of a [`CircularRecordStore`](crate::CircularRecordStore), so that
//! update rules never split an episode across an optimization step.
mod base;
mod config;
pub use base::RingBuffer;
pub use config::RingBufferConfig;
