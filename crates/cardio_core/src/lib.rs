//! # CARDIO Core
//!
//! Pooled memory for a frame-locked game runtime:
//! - One reservation at startup, partitioned into persistent, scene and
//!   frame bump pools
//! - O(1) allocation with stack-discipline pop and wholesale flush
//! - A fixed block-size allocator for individually freed buffers
//!
//! ## Lifetime Rules
//!
//! 1. **Persistent** - framebuffer, fonts, anything that outlives scenes
//! 2. **Scene** - assets of the active scene, flushed on transition
//! 3. **Frame** - scratch, flushed at least once per rendered frame
//!
//! ## Example
//!
//! ```rust
//! use cardio_core::MemoryPools;
//!
//! let mut pools = MemoryPools::initialize(64 << 20, 32 << 20, 8 << 20).unwrap();
//! let framebuffer = pools.persistent.allocate_slice::<u32>(320 * 200).unwrap();
//! framebuffer.fill(0);
//!
//! pools.begin_scene();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod memory;

pub use error::{MemoryError, MemoryResult};
pub use memory::{
    align_up, BlockAllocator, BlockHandle, MemoryPools, Pool, PoolId, PoolStats, MAX_ALIGNMENT,
};
