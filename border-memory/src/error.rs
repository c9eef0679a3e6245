//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MemoryError {
    /// Records do not conform to the schema of the memory.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Logical index beyond the number of valid records.
    #[error("Index {index} is out of range for memory of size {size}")]
    OutOfRange {
        /// Requested logical index.
        index: usize,
        /// Number of valid records at the time of the request.
        size: usize,
    },

    /// Configuration that cannot be used to build a memory.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A thread panicked while holding the lock of a shared memory.
    #[error("Lock of shared memory is poisoned")]
    LockPoisoned,
}

/// Result type of memory operations.
pub type Result<T> = std::result::Result<T, MemoryError>;
