//! Integration test for the pool lifecycle across scenes and frames.

use cardio_core::{MemoryPools, PoolId, MAX_ALIGNMENT};

/// Small deterministic sequence so the test needs no RNG crate.
fn sizes(seed: u64, count: usize) -> impl Iterator<Item = usize> {
    let mut state = seed;
    (0..count).map(move |_| {
        state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        usize::try_from(state >> 54).unwrap()
    })
}

#[test]
fn test_fill_never_exceeds_capacity() {
    let mut pools = MemoryPools::initialize(16 * 1024, 4 * 1024, 2 * 1024).unwrap();

    for (step, size) in sizes(7, 2_000).enumerate() {
        let id = PoolId::ALL[step % 3];
        match step % 7 {
            0 => pools.deallocate_last(id),
            1 if step % 5 == 0 => pools.flush(id),
            _ => {
                if let Some(bytes) = pools.allocate(id, size) {
                    assert_eq!(bytes.len(), size);
                    assert_eq!(bytes.as_ptr() as usize % MAX_ALIGNMENT, 0);
                }
            }
        }

        for stats in pools.stats() {
            assert!(stats.filled <= stats.capacity, "{stats:?}");
        }
    }
}

#[test]
fn test_pop_restores_previous_fill() {
    let mut pools = MemoryPools::initialize(8 * 1024, 1024, 1024).unwrap();

    for size in sizes(11, 200) {
        let before = pools.scene.filled();
        if pools.scene.allocate(size).is_some() {
            pools.scene.deallocate_last();
        }
        assert_eq!(pools.scene.filled(), before);
        pools.scene.allocate(8);
    }
}

#[test]
fn test_framebuffer_survives_scene_changes() {
    let mut pools = MemoryPools::initialize(1 << 20, 1 << 16, 1 << 14).unwrap();
    let framebuffer = pools.persistent.allocate_slice::<u32>(320 * 200).unwrap();
    framebuffer.fill(0x1122_3344);

    for _ in 0..3 {
        let scene_data = pools.scene.allocate_slice::<u32>(1000).unwrap();
        scene_data.fill(0xFFFF_FFFF);
        for _ in 0..10 {
            pools.frame.allocate(512).unwrap().fill(0xEE);
            pools.frame.flush();
        }
        // The framebuffer borrow pins `persistent`, so flush field by field.
        pools.scene.flush();
        pools.frame.flush();
    }

    assert!(framebuffer.iter().all(|&pixel| pixel == 0x1122_3344));
    assert!(pools.contains(PoolId::Persistent, framebuffer.as_ptr()));
    assert!(!pools.contains(PoolId::Scene, framebuffer.as_ptr()));
}

#[test]
fn test_flush_resets_fill() {
    let mut pools = MemoryPools::initialize(4096, 1024, 512).unwrap();
    pools.frame.allocate(100).unwrap();
    pools.frame.allocate(200).unwrap();
    pools.flush(PoolId::Frame);
    assert_eq!(pools.frame.filled(), 0);
}
