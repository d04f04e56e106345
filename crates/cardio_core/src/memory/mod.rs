//! # Memory Management
//!
//! Pre-reserved memory pools for zero-allocation frames.
//!
//! ## Design Philosophy
//!
//! All memory is reserved once at startup. During play:
//! - No heap allocations
//! - Scene data is dropped wholesale on scene change
//! - Frame scratch is dropped wholesale every frame

mod block;
mod pool;

pub use block::{BlockAllocator, BlockHandle};
pub use pool::{align_up, MemoryPools, Pool, PoolId, PoolStats, MAX_ALIGNMENT};
