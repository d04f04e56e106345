//! # Pool Allocation Benchmark
//!
//! REQUIREMENTS:
//! - Allocation is a pointer bump, independent of pool fill level
//! - Flush is O(1)
//!
//! Run with: `cargo bench --package cardio_core`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cardio_core::{BlockAllocator, Pool, PoolId};

/// Allocations per frame in the benchmark.
const ALLOCATIONS_PER_FRAME: usize = 1_000;

/// Benchmark: fill the frame pool then flush it.
fn bench_frame_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_cycle");

    for size in [16usize, 256, 4096] {
        let mut pool = Pool::with_capacity(PoolId::Frame, size * ALLOCATIONS_PER_FRAME).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                for _ in 0..ALLOCATIONS_PER_FRAME {
                    black_box(pool.allocate(size));
                }
                pool.flush();
            });
        });
    }

    group.finish();
}

/// Benchmark: typed allocation of a full framebuffer.
fn bench_framebuffer_slice(c: &mut Criterion) {
    let mut pool = Pool::with_capacity(PoolId::Persistent, 320 * 200 * 4).unwrap();
    c.bench_function("framebuffer_slice_320x200", |b| {
        b.iter(|| {
            black_box(pool.allocate_slice::<u32>(320 * 200));
            pool.deallocate_last();
        });
    });
}

/// Benchmark: allocate and free through the block allocator.
fn bench_block_churn(c: &mut Criterion) {
    let pool = Pool::with_capacity(PoolId::Scene, 1 << 20).unwrap();
    let mut blocks = BlockAllocator::new(&pool, 256, 1024).unwrap();
    c.bench_function("block_allocate_free", |b| {
        b.iter(|| {
            let handle = blocks.allocate(black_box(700)).unwrap();
            blocks.free(handle)
        });
    });
}

criterion_group!(benches, bench_frame_cycle, bench_framebuffer_slice, bench_block_churn);
criterion_main!(benches);
