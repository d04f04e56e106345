//! # Memory Error Types
//!
//! Errors raised while reserving and partitioning the memory pools.
//!
//! Exhaustion of an already-initialised pool is not an error value: pools
//! answer `None` and the caller decides whether that is fatal.

use thiserror::Error;

/// Errors that can occur while setting up the memory pools.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    /// The requested partition does not fit inside the persistent pool.
    #[error(
        "invalid pool configuration: scene ({scene} bytes) + frame ({frame} bytes) \
         does not fit in persistent capacity ({persistent} bytes)"
    )]
    Configuration {
        /// Total persistent capacity requested.
        persistent: usize,
        /// Scene pool capacity requested.
        scene: usize,
        /// Frame pool capacity requested.
        frame: usize,
    },

    /// The system allocator refused the backing reservation.
    #[error("failed to reserve {requested} bytes of backing memory")]
    Reservation {
        /// Number of bytes that were requested.
        requested: usize,
    },
}

/// Result type for memory setup operations.
pub type MemoryResult<T> = Result<T, MemoryError>;
