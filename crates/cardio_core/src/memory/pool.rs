//! # Bump Pools
//!
//! Stack-discipline allocators over one contiguous backing reservation.
//!
//! ## Safety Note
//!
//! Handing out `&mut [u8]` from `&self` requires unsafe code.
//! All unsafe blocks are documented with the invariant they rely on.

#![allow(unsafe_code)]
//!
//! ## Layout
//!
//! ```text
//!  backing reservation (persistent capacity)
//!  ┌──────────────┬─────────────┬──────────────────────────────┐
//!  │ scene pool   │ frame pool  │ persistent allocations ...   │
//!  └──────────────┴─────────────┴──────────────────────────────┘
//!  ▲                            ▲
//!  base                         persistent floor (flush target)
//! ```
//!
//! ## Borrowing Model
//!
//! `allocate` takes `&self` and returns a fresh `&mut` region that no other
//! live borrow overlaps: the fill counter only moves forward while the pool
//! is shared. `deallocate_last` and `flush` take `&mut self`, so the borrow
//! checker rejects any use of an allocation after it has been rewound.

use std::alloc::{self, Layout};
use std::cell::Cell;
use std::fmt;
use std::ptr::NonNull;
use std::rc::Rc;

use bytemuck::Pod;

use crate::error::{MemoryError, MemoryResult};

/// Alignment applied to every allocation, matching the strictest scalar
/// alignment of the supported targets.
pub const MAX_ALIGNMENT: usize = 16;

/// Rounds `byte_count` up to the next multiple of [`MAX_ALIGNMENT`].
///
/// Returns `None` if the rounded value overflows `usize`.
#[inline]
#[must_use]
pub const fn align_up(byte_count: usize) -> Option<usize> {
    match byte_count.checked_add(MAX_ALIGNMENT - 1) {
        Some(padded) => Some(padded & !(MAX_ALIGNMENT - 1)),
        None => None,
    }
}

/// Identifies one of the three runtime pools.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PoolId {
    /// Lives for the whole process; backs the other two pools.
    Persistent,
    /// Flushed on every scene transition.
    Scene,
    /// Flushed at least once per rendered frame.
    Frame,
}

impl PoolId {
    /// All pools, in carve order.
    pub const ALL: [PoolId; 3] = [PoolId::Persistent, PoolId::Scene, PoolId::Frame];

    /// Lowercase display name.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PoolId::Persistent => "persistent",
            PoolId::Scene => "scene",
            PoolId::Frame => "frame",
        }
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Snapshot of a pool's usage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolStats {
    /// Which pool this snapshot describes.
    pub id: PoolId,
    /// Bytes currently handed out (aligned sizes).
    pub filled: usize,
    /// Total bytes the pool can hand out.
    pub capacity: usize,
    /// Aligned size of the most recent allocation.
    pub last_allocation: usize,
}

impl PoolStats {
    /// Bytes still available.
    #[inline]
    #[must_use]
    pub const fn available(&self) -> usize {
        self.capacity - self.filled
    }

    /// Fill level as a percentage in `0.0..=100.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fill_percent(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.filled as f64 * 100.0 / self.capacity as f64
    }
}

/// The heap reservation shared by a pool and every pool carved from it.
struct Backing {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl Backing {
    /// Reserves `byte_count` zeroed bytes aligned to [`MAX_ALIGNMENT`].
    fn reserve(byte_count: usize) -> MemoryResult<Self> {
        let refused = MemoryError::Reservation {
            requested: byte_count,
        };
        let layout =
            Layout::from_size_align(byte_count.max(1), MAX_ALIGNMENT).map_err(|_| refused.clone())?;

        // SAFETY: `layout` has a non-zero size.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).ok_or(refused)?;

        Ok(Self { ptr, layout })
    }
}

impl Drop for Backing {
    fn drop(&mut self) {
        // SAFETY: `ptr` came from `alloc_zeroed` with exactly this layout and
        // is freed once, when the last pool referencing it is dropped.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) };
    }
}

/// A bump allocator over a fixed byte region.
///
/// Allocation is O(1) with no per-allocation metadata. Only the most recent
/// allocation can be popped; everything else is released by [`Pool::flush`].
///
/// # Thread Safety
///
/// Pools are `!Send` and `!Sync`. Use them from the main thread only.
///
/// # Example
///
/// ```rust
/// use cardio_core::{Pool, PoolId};
///
/// let mut pool = Pool::with_capacity(PoolId::Frame, 1024).unwrap();
/// let scratch = pool.allocate_slice::<u32>(16).unwrap();
/// scratch.fill(7);
/// assert_eq!(pool.filled(), 64);
///
/// pool.flush();
/// assert_eq!(pool.filled(), 0);
/// ```
pub struct Pool {
    /// Which pool this is.
    id: PoolId,
    /// Start of the region. Always `MAX_ALIGNMENT`-aligned.
    base: NonNull<u8>,
    /// Size of the region in bytes.
    capacity: usize,
    /// `flush` rewinds to here. Non-zero only for a pool with carved children.
    floor: usize,
    /// Bytes handed out so far.
    filled: Cell<usize>,
    /// Aligned size of the most recent allocation.
    last_allocation: Cell<usize>,
    /// Keeps the region alive for as long as this pool exists.
    _backing: Rc<Backing>,
}

impl Pool {
    /// Creates a standalone pool with its own zeroed reservation.
    ///
    /// # Arguments
    ///
    /// * `id` - The role this pool plays
    /// * `capacity` - Total size in bytes
    ///
    /// # Errors
    ///
    /// [`MemoryError::Reservation`] if the system allocator refuses.
    pub fn with_capacity(id: PoolId, capacity: usize) -> MemoryResult<Self> {
        let backing = Rc::new(Backing::reserve(capacity)?);
        Ok(Self {
            id,
            base: backing.ptr,
            capacity,
            floor: 0,
            filled: Cell::new(0),
            last_allocation: Cell::new(0),
            _backing: backing,
        })
    }

    /// Carves a child pool out of this pool's next free bytes.
    fn carve(&self, id: PoolId, capacity: usize) -> Option<Pool> {
        let region = self.allocate(capacity)?;
        let base = NonNull::new(region.as_mut_ptr())?;
        Some(Pool {
            id,
            base,
            capacity,
            floor: 0,
            filled: Cell::new(0),
            last_allocation: Cell::new(0),
            _backing: Rc::clone(&self._backing),
        })
    }

    /// Makes everything allocated so far permanent: `flush` and
    /// `deallocate_last` never rewind below this point.
    fn seal(&mut self) {
        self.floor = self.filled.get();
        self.last_allocation.set(0);
    }

    /// Returns which pool this is.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> PoolId {
        self.id
    }

    /// Returns the total capacity in bytes.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the bytes handed out so far, including alignment padding.
    #[inline]
    #[must_use]
    pub fn filled(&self) -> usize {
        self.filled.get()
    }

    /// Returns the remaining free space in bytes.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity - self.filled.get()
    }

    /// Returns the aligned size of the most recent allocation.
    #[inline]
    #[must_use]
    pub fn last_allocation_size(&self) -> usize {
        self.last_allocation.get()
    }

    /// Returns a usage snapshot.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            id: self.id,
            filled: self.filled.get(),
            capacity: self.capacity,
            last_allocation: self.last_allocation.get(),
        }
    }

    /// Allocates `byte_count` bytes, 16-byte aligned.
    ///
    /// The pool advances by `byte_count` rounded up to [`MAX_ALIGNMENT`].
    /// Contents are whatever the region last held (zero on first use).
    ///
    /// Every call overwrites the last-allocation size; a failed call records
    /// zero, so a following [`Pool::deallocate_last`] does nothing.
    ///
    /// # Returns
    ///
    /// A slice of exactly `byte_count` bytes, or `None` if the pool cannot
    /// hold the aligned size.
    #[allow(clippy::mut_from_ref)]
    pub fn allocate(&self, byte_count: usize) -> Option<&mut [u8]> {
        let offset = self.filled.get();
        let end = align_up(byte_count).and_then(|aligned| offset.checked_add(aligned));

        let Some(end) = end.filter(|&end| end <= self.capacity) else {
            self.last_allocation.set(0);
            return None;
        };

        self.filled.set(end);
        self.last_allocation.set(end - offset);

        // SAFETY: `offset..offset + byte_count` lies inside the region, which
        // is initialised (zeroed at reservation). No live borrow overlaps it:
        // while the pool is shared `filled` only grows, and the two methods
        // that move it backwards need `&mut self`.
        Some(unsafe {
            std::slice::from_raw_parts_mut(self.base.as_ptr().add(offset), byte_count)
        })
    }

    /// Allocates a slice of `count` plain-old-data values.
    ///
    /// # Returns
    ///
    /// The slice, or `None` if the pool is exhausted, the byte size
    /// overflows, or `T` needs more than [`MAX_ALIGNMENT`].
    #[allow(clippy::mut_from_ref)]
    pub fn allocate_slice<T: Pod>(&self, count: usize) -> Option<&mut [T]> {
        if std::mem::align_of::<T>() > MAX_ALIGNMENT || std::mem::size_of::<T>() == 0 {
            return None;
        }
        let byte_count = count.checked_mul(std::mem::size_of::<T>())?;
        let bytes = self.allocate(byte_count)?;
        bytemuck::try_cast_slice_mut(bytes).ok()
    }

    /// Copies `source` into a fresh allocation.
    #[allow(clippy::mut_from_ref)]
    pub fn clone_slice<T: Pod>(&self, source: &[T]) -> Option<&mut [T]> {
        let copy = self.allocate_slice::<T>(source.len())?;
        copy.copy_from_slice(source);
        Some(copy)
    }

    /// Pops the most recent allocation.
    ///
    /// Calling this twice in a row rewinds only once; the second call sees a
    /// last-allocation size of zero.
    #[inline]
    pub fn deallocate_last(&mut self) {
        let rewound = self.filled.get().saturating_sub(self.last_allocation.get());
        self.filled.set(rewound.max(self.floor));
        self.last_allocation.set(0);
    }

    /// Releases every allocation at once.
    ///
    /// A pool that other pools were carved from keeps their reservation.
    #[inline]
    pub fn flush(&mut self) {
        self.filled.set(self.floor);
        self.last_allocation.set(0);
    }

    /// Returns `true` if `pointer` points into this pool's region.
    #[must_use]
    pub fn contains<T>(&self, pointer: *const T) -> bool {
        let address = pointer.cast::<u8>() as usize;
        let base = self.base.as_ptr() as usize;
        address >= base && address - base < self.capacity
    }
}

impl fmt::Debug for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("id", &self.id)
            .field("filled", &self.filled.get())
            .field("capacity", &self.capacity)
            .field("last_allocation", &self.last_allocation.get())
            .finish_non_exhaustive()
    }
}

/// The three runtime pools.
///
/// The scene and frame pools are carved out of the front of the persistent
/// pool, so setup usage counts against the persistent budget. Fields are
/// public so that one pool can be flushed while allocations from another are
/// still borrowed.
///
/// # Example
///
/// ```rust
/// use cardio_core::MemoryPools;
///
/// let mut pools = MemoryPools::initialize(1 << 20, 1 << 18, 1 << 16).unwrap();
/// let framebuffer = pools.persistent.allocate_slice::<u32>(320 * 200).unwrap();
///
/// pools.frame.allocate(100).unwrap();
/// pools.frame.flush();
/// framebuffer[0] = 0xFF00_00FF;
/// ```
#[derive(Debug)]
pub struct MemoryPools {
    /// Process-lifetime pool.
    pub persistent: Pool,
    /// Scene-lifetime pool.
    pub scene: Pool,
    /// Frame-lifetime pool.
    pub frame: Pool,
}

impl MemoryPools {
    /// Reserves the backing memory and partitions it.
    ///
    /// # Arguments
    ///
    /// * `total_capacity` - Persistent pool size, including the sub-pools
    /// * `scene_capacity` - Scene pool size
    /// * `frame_capacity` - Frame pool size
    ///
    /// # Errors
    ///
    /// - [`MemoryError::Configuration`] if the sub-pools do not fit
    /// - [`MemoryError::Reservation`] if the system allocator refuses
    pub fn initialize(
        total_capacity: usize,
        scene_capacity: usize,
        frame_capacity: usize,
    ) -> MemoryResult<Self> {
        let misconfigured = MemoryError::Configuration {
            persistent: total_capacity,
            scene: scene_capacity,
            frame: frame_capacity,
        };

        let fits = scene_capacity
            .checked_add(frame_capacity)
            .is_some_and(|sum| sum <= total_capacity);
        if !fits {
            return Err(misconfigured);
        }

        let mut persistent = Pool::with_capacity(PoolId::Persistent, total_capacity)?;
        let carved = persistent
            .carve(PoolId::Scene, scene_capacity)
            .zip(persistent.carve(PoolId::Frame, frame_capacity));
        let Some((scene, frame)) = carved else {
            // Alignment padding pushed the pair over the total.
            return Err(misconfigured);
        };
        persistent.seal();

        tracing::info!(
            persistent = total_capacity,
            scene = scene_capacity,
            frame = frame_capacity,
            "memory pools initialised"
        );

        Ok(Self {
            persistent,
            scene,
            frame,
        })
    }

    /// Returns the pool with the given id.
    #[inline]
    #[must_use]
    pub const fn pool(&self, id: PoolId) -> &Pool {
        match id {
            PoolId::Persistent => &self.persistent,
            PoolId::Scene => &self.scene,
            PoolId::Frame => &self.frame,
        }
    }

    /// Returns the pool with the given id, mutably.
    #[inline]
    pub fn pool_mut(&mut self, id: PoolId) -> &mut Pool {
        match id {
            PoolId::Persistent => &mut self.persistent,
            PoolId::Scene => &mut self.scene,
            PoolId::Frame => &mut self.frame,
        }
    }

    /// Allocates from the given pool. See [`Pool::allocate`].
    #[allow(clippy::mut_from_ref)]
    pub fn allocate(&self, id: PoolId, byte_count: usize) -> Option<&mut [u8]> {
        self.pool(id).allocate(byte_count)
    }

    /// Pops the last allocation of the given pool.
    pub fn deallocate_last(&mut self, id: PoolId) {
        self.pool_mut(id).deallocate_last();
    }

    /// Flushes the given pool.
    pub fn flush(&mut self, id: PoolId) {
        self.pool_mut(id).flush();
    }

    /// Returns `true` if `pointer` lies in the given pool.
    #[must_use]
    pub fn contains<T>(&self, id: PoolId, pointer: *const T) -> bool {
        self.pool(id).contains(pointer)
    }

    /// Flushes the scene and frame pools for a scene transition.
    ///
    /// While persistent allocations are still borrowed, flush the `scene`
    /// and `frame` fields directly instead.
    pub fn begin_scene(&mut self) {
        self.scene.flush();
        self.frame.flush();
        tracing::debug!("scene and frame pools flushed");
    }

    /// Returns usage snapshots for all three pools.
    #[must_use]
    pub fn stats(&self) -> [PoolStats; 3] {
        PoolId::ALL.map(|id| self.pool(id).stats())
    }

    /// Logs usage of all three pools at `info` level.
    pub fn log_stats(&self) {
        for stats in self.stats() {
            tracing::info!(
                pool = %stats.id,
                filled = stats.filled,
                available = stats.available(),
                capacity = stats.capacity,
                percent = stats.fill_percent(),
                last = stats.last_allocation,
                "pool usage"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0), Some(0));
        assert_eq!(align_up(1), Some(16));
        assert_eq!(align_up(16), Some(16));
        assert_eq!(align_up(17), Some(32));
        assert_eq!(align_up(usize::MAX), None);
    }

    #[test]
    fn test_pool_allocation() {
        let pool = Pool::with_capacity(PoolId::Frame, 1024).unwrap();
        let bytes = pool.allocate(10).unwrap();
        assert_eq!(bytes.len(), 10);
        assert_eq!(pool.filled(), 16);
        assert_eq!(pool.last_allocation_size(), 16);
        assert_eq!(pool.remaining(), 1008);
    }

    #[test]
    fn test_pool_alignment() {
        let pool = Pool::with_capacity(PoolId::Scene, 4096).unwrap();
        for byte_count in [0, 1, 3, 15, 16, 17, 100] {
            let bytes = pool.allocate(byte_count).unwrap();
            assert_eq!(bytes.as_ptr() as usize % MAX_ALIGNMENT, 0, "size {byte_count}");
        }
    }

    #[test]
    fn test_pool_exhaustion() {
        let pool = Pool::with_capacity(PoolId::Frame, 64).unwrap();
        assert!(pool.allocate(48).is_some());
        assert!(pool.allocate(17).is_none());
        assert_eq!(pool.filled(), 48);
        assert_eq!(pool.last_allocation_size(), 0);
        assert!(pool.allocate(16).is_some());
        assert_eq!(pool.filled(), 64);
        assert!(pool.allocate(1).is_none());
    }

    #[test]
    fn test_deallocate_last() {
        let mut pool = Pool::with_capacity(PoolId::Frame, 256).unwrap();
        pool.allocate(20).unwrap();
        let before = pool.filled();
        pool.allocate(40).unwrap();
        pool.deallocate_last();
        assert_eq!(pool.filled(), before);

        // Second pop in a row rewinds by zero.
        pool.deallocate_last();
        assert_eq!(pool.filled(), before);
    }

    #[test]
    fn test_deallocate_after_failed_allocation_is_noop() {
        let mut pool = Pool::with_capacity(PoolId::Frame, 32).unwrap();
        pool.allocate(16).unwrap();
        assert!(pool.allocate(64).is_none());
        pool.deallocate_last();
        assert_eq!(pool.filled(), 16);
    }

    #[test]
    fn test_flush() {
        let mut pool = Pool::with_capacity(PoolId::Scene, 256).unwrap();
        pool.allocate(100).unwrap();
        pool.allocate(50).unwrap();
        pool.flush();
        assert_eq!(pool.filled(), 0);
        assert_eq!(pool.last_allocation_size(), 0);
    }

    #[test]
    fn test_typed_allocation() {
        let pool = Pool::with_capacity(PoolId::Persistent, 256).unwrap();
        let words = pool.allocate_slice::<u32>(5).unwrap();
        assert_eq!(words.len(), 5);
        words.copy_from_slice(&[1, 2, 3, 4, 5]);
        assert_eq!(pool.filled(), 32);

        let copy = pool.clone_slice(&[1.5f32, -2.0]).unwrap();
        assert_eq!(copy, &[1.5, -2.0]);
    }

    #[test]
    fn test_contains() {
        let pool = Pool::with_capacity(PoolId::Scene, 64).unwrap();
        let other = Pool::with_capacity(PoolId::Scene, 64).unwrap();
        let bytes = pool.allocate(8).unwrap();
        assert!(pool.contains(bytes.as_ptr()));
        assert!(!other.contains(bytes.as_ptr()));

        let local = 5u8;
        assert!(!pool.contains(&local));
    }

    #[test]
    fn test_initialize_partitions() {
        let pools = MemoryPools::initialize(1024, 256, 128).unwrap();
        assert_eq!(pools.persistent.filled(), 384);
        assert_eq!(pools.scene.capacity(), 256);
        assert_eq!(pools.frame.capacity(), 128);

        let scene_bytes = pools.scene.allocate(1).unwrap();
        assert!(pools.persistent.contains(scene_bytes.as_ptr()));
        assert!(pools.scene.contains(scene_bytes.as_ptr()));
        assert!(!pools.frame.contains(scene_bytes.as_ptr()));
    }

    #[test]
    fn test_initialize_rejects_oversized_partition() {
        let result = MemoryPools::initialize(100, 60, 50);
        assert_eq!(
            result.unwrap_err(),
            MemoryError::Configuration {
                persistent: 100,
                scene: 60,
                frame: 50
            }
        );
        assert!(MemoryPools::initialize(64, usize::MAX, 1).is_err());
    }

    #[test]
    fn test_initialize_rejects_padding_overflow() {
        // 20 + 20 fits in 48, but 32 + 32 after alignment does not.
        assert!(matches!(
            MemoryPools::initialize(48, 20, 20),
            Err(MemoryError::Configuration { .. })
        ));
    }

    #[test]
    fn test_reservation_failure() {
        assert_eq!(
            MemoryPools::initialize(usize::MAX, 0, 0).unwrap_err(),
            MemoryError::Reservation {
                requested: usize::MAX
            }
        );
    }

    #[test]
    fn test_persistent_flush_keeps_sub_pools() {
        let mut pools = MemoryPools::initialize(1024, 256, 128).unwrap();
        pools.persistent.allocate(64).unwrap();
        pools.persistent.flush();
        assert_eq!(pools.persistent.filled(), 384);

        pools.persistent.deallocate_last();
        assert_eq!(pools.persistent.filled(), 384);
    }

    #[test]
    fn test_begin_scene_flushes_scene_and_frame() {
        let mut pools = MemoryPools::initialize(1024, 256, 128).unwrap();
        pools.persistent.allocate(32).unwrap();
        pools.scene.allocate(32).unwrap();
        pools.frame.allocate(32).unwrap();

        pools.begin_scene();
        assert_eq!(pools.scene.filled(), 0);
        assert_eq!(pools.frame.filled(), 0);
        assert_eq!(pools.persistent.filled(), 416);
    }

    #[test]
    fn test_stats() {
        let pools = MemoryPools::initialize(1000, 200, 100).unwrap();
        pools.frame.allocate(50).unwrap();
        let [persistent, scene, frame] = pools.stats();
        assert_eq!(persistent.id, PoolId::Persistent);
        assert_eq!(persistent.filled, 208 + 112);
        assert_eq!(scene.filled, 0);
        assert_eq!(frame.filled, 64);
        assert_eq!(frame.available(), 36);
        assert!((frame.fill_percent() - 64.0).abs() < f64::EPSILON);
    }
}
