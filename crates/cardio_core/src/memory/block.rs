//! # Block Allocator
//!
//! Fixed block-size allocator carved out of a pool, for buffers that are
//! freed individually instead of wholesale.

use super::pool::Pool;

/// Bits per occupancy word.
const WORD_BITS: usize = u64::BITS as usize;

/// A first-fit allocator over equally sized blocks.
///
/// The block storage and the occupancy bitmap both live in the pool the
/// allocator was created from, so it is released when that pool is flushed.
///
/// # Thread Safety
///
/// This allocator is NOT thread-safe, like the pool it borrows from.
///
/// # Example
///
/// ```rust
/// use cardio_core::{BlockAllocator, Pool, PoolId};
///
/// let pool = Pool::with_capacity(PoolId::Scene, 4096).unwrap();
/// let mut blocks = BlockAllocator::new(&pool, 64, 16).unwrap();
///
/// // 100 bytes span two 64-byte blocks.
/// let handle = blocks.allocate(100).unwrap();
/// assert_eq!(handle.block_count(), 2);
///
/// blocks.free(handle);
/// assert_eq!(blocks.free_block_count(), 16);
/// ```
#[derive(Debug)]
pub struct BlockAllocator<'p> {
    /// Block storage, `block_size * block_count` bytes.
    storage: &'p mut [u8],
    /// One bit per block, set while occupied.
    occupied: &'p mut [u64],
    /// Size of one block in bytes.
    block_size: usize,
    /// Number of blocks.
    block_count: usize,
    /// Number of unoccupied blocks.
    free_blocks: usize,
}

/// Handle to a run of blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockHandle {
    /// Index of the first block.
    first: usize,
    /// Number of consecutive blocks.
    count: usize,
}

impl BlockHandle {
    /// Index of the first block in the run.
    #[inline]
    #[must_use]
    pub const fn first_block(self) -> usize {
        self.first
    }

    /// Number of blocks in the run.
    #[inline]
    #[must_use]
    pub const fn block_count(self) -> usize {
        self.count
    }
}

impl<'p> BlockAllocator<'p> {
    /// Creates an allocator of `block_count` blocks of `block_size` bytes.
    ///
    /// # Returns
    ///
    /// The allocator, or `None` if either argument is zero or the pool
    /// cannot hold the storage. The bitmap is allocated first; if the
    /// storage then does not fit, the bitmap's bytes stay consumed until
    /// the pool is flushed.
    #[must_use]
    pub fn new(pool: &'p Pool, block_size: usize, block_count: usize) -> Option<Self> {
        if block_size == 0 || block_count == 0 {
            return None;
        }
        let byte_count = block_size.checked_mul(block_count)?;

        let occupied = pool.allocate_slice::<u64>(block_count.div_ceil(WORD_BITS))?;
        occupied.fill(0);
        let storage = pool.allocate(byte_count)?;

        Some(Self {
            storage,
            occupied,
            block_size,
            block_count,
            free_blocks: block_count,
        })
    }

    /// Returns the size of one block in bytes.
    #[inline]
    #[must_use]
    pub const fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns the total number of blocks.
    #[inline]
    #[must_use]
    pub const fn block_count(&self) -> usize {
        self.block_count
    }

    /// Returns the number of unoccupied blocks.
    #[inline]
    #[must_use]
    pub const fn free_block_count(&self) -> usize {
        self.free_blocks
    }

    #[inline]
    fn is_occupied(&self, block: usize) -> bool {
        self.occupied[block / WORD_BITS] & (1 << (block % WORD_BITS)) != 0
    }

    #[inline]
    fn set_occupied(&mut self, block: usize, occupied: bool) {
        let word = &mut self.occupied[block / WORD_BITS];
        let mask = 1u64 << (block % WORD_BITS);
        if occupied {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// Returns `true` if the handle is in range and all its blocks are occupied.
    fn is_live(&self, handle: BlockHandle) -> bool {
        let in_range = handle
            .first
            .checked_add(handle.count)
            .is_some_and(|end| handle.count > 0 && end <= self.block_count);
        in_range && (handle.first..handle.first + handle.count).all(|block| self.is_occupied(block))
    }

    /// Allocates enough consecutive blocks to hold `byte_count` bytes.
    ///
    /// A request of zero bytes still occupies one block.
    ///
    /// # Returns
    ///
    /// A handle to the first fitting run, or `None` if no run is long enough.
    pub fn allocate(&mut self, byte_count: usize) -> Option<BlockHandle> {
        let needed = byte_count.div_ceil(self.block_size).max(1);
        if needed > self.free_blocks {
            return None;
        }

        let mut run_start = 0;
        for block in 0..self.block_count {
            if self.is_occupied(block) {
                run_start = block + 1;
                continue;
            }
            if block + 1 - run_start == needed {
                for claimed in run_start..=block {
                    self.set_occupied(claimed, true);
                }
                self.free_blocks -= needed;
                return Some(BlockHandle {
                    first: run_start,
                    count: needed,
                });
            }
        }
        None
    }

    /// Releases the blocks behind `handle`.
    ///
    /// # Returns
    ///
    /// `false` if the handle is out of range or any of its blocks is already
    /// free. Handles are not generation-checked: a stale handle whose blocks
    /// were reallocated is indistinguishable from the new owner's.
    pub fn free(&mut self, handle: BlockHandle) -> bool {
        if !self.is_live(handle) {
            return false;
        }
        for block in handle.first..handle.first + handle.count {
            self.set_occupied(block, false);
        }
        self.free_blocks += handle.count;
        true
    }

    /// Gets the bytes behind a live handle.
    #[must_use]
    pub fn get(&self, handle: BlockHandle) -> Option<&[u8]> {
        if !self.is_live(handle) {
            return None;
        }
        let start = handle.first * self.block_size;
        self.storage.get(start..start + handle.count * self.block_size)
    }

    /// Gets the bytes behind a live handle, mutably.
    pub fn get_mut(&mut self, handle: BlockHandle) -> Option<&mut [u8]> {
        if !self.is_live(handle) {
            return None;
        }
        let start = handle.first * self.block_size;
        self.storage.get_mut(start..start + handle.count * self.block_size)
    }

    /// Frees every block.
    pub fn clear(&mut self) {
        self.occupied.fill(0);
        self.free_blocks = self.block_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::pool::PoolId;

    fn pool() -> Pool {
        Pool::with_capacity(PoolId::Scene, 8192).unwrap()
    }

    #[test]
    fn test_block_allocate_free() {
        let pool = pool();
        let mut blocks = BlockAllocator::new(&pool, 32, 8).unwrap();

        let handle = blocks.allocate(10).unwrap();
        assert_eq!(handle.first_block(), 0);
        assert_eq!(handle.block_count(), 1);
        assert_eq!(blocks.free_block_count(), 7);

        assert!(blocks.free(handle));
        assert_eq!(blocks.free_block_count(), 8);
        assert!(!blocks.free(handle));
    }

    #[test]
    fn test_block_multi_block_run() {
        let pool = pool();
        let mut blocks = BlockAllocator::new(&pool, 16, 8).unwrap();

        let first = blocks.allocate(16).unwrap();
        let wide = blocks.allocate(33).unwrap();
        assert_eq!(wide.first_block(), 1);
        assert_eq!(wide.block_count(), 3);
        assert_eq!(blocks.get(wide).unwrap().len(), 48);

        // Freeing the first block leaves a 1-block hole a 2-block run skips.
        blocks.free(first);
        let pair = blocks.allocate(32).unwrap();
        assert_eq!(pair.first_block(), 4);
    }

    #[test]
    fn test_block_full() {
        let pool = pool();
        let mut blocks = BlockAllocator::new(&pool, 8, 2).unwrap();

        let _ = blocks.allocate(8).unwrap();
        let _ = blocks.allocate(0).unwrap();
        assert!(blocks.allocate(1).is_none());
    }

    #[test]
    fn test_block_reuse() {
        let pool = pool();
        let mut blocks = BlockAllocator::new(&pool, 8, 1).unwrap();

        let h1 = blocks.allocate(4).unwrap();
        blocks.get_mut(h1).unwrap().fill(0xAB);
        blocks.free(h1);
        assert!(blocks.get(h1).is_none());

        let h2 = blocks.allocate(8).unwrap();
        assert_eq!(h1, h2);
        assert!(blocks.get(h2).unwrap().iter().all(|&b| b == 0xAB));
    }

    #[test]
    fn test_block_bitmap_spans_words() {
        let pool = pool();
        let mut blocks = BlockAllocator::new(&pool, 1, 130).unwrap();

        let all = blocks.allocate(130).unwrap();
        assert_eq!(blocks.free_block_count(), 0);
        assert!(blocks.free(all));

        let _ = blocks.allocate(63).unwrap();
        let straddling = blocks.allocate(2).unwrap();
        assert_eq!(straddling.first_block(), 63);
        assert!(blocks.free(straddling));

        blocks.clear();
        assert_eq!(blocks.free_block_count(), 130);
    }

    #[test]
    fn test_block_rejects_bad_arguments() {
        let pool = pool();
        assert!(BlockAllocator::new(&pool, 0, 4).is_none());
        assert!(BlockAllocator::new(&pool, 4, 0).is_none());
        assert!(BlockAllocator::new(&pool, 1024, 1024).is_none());
    }
}
