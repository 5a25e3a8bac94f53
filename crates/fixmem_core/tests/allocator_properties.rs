//! # Allocator Property Tests
//!
//! Random operation sequences against both allocators, checking the
//! bookkeeping invariants after every step.

use fixmem_core::{AllocError, FixedPool, LinearArena, PoolHandle};
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Clone, Debug)]
enum PoolOp {
    Allocate(u16),
    Release(usize),
    ReleaseStale(usize),
    Reset,
}

fn pool_op() -> impl Strategy<Value = PoolOp> {
    prop_oneof![
        6 => any::<u16>().prop_map(PoolOp::Allocate),
        4 => any::<usize>().prop_map(PoolOp::Release),
        2 => any::<usize>().prop_map(PoolOp::ReleaseStale),
        1 => Just(PoolOp::Reset),
    ]
}

/// Free slots plus live slots cover every index exactly once.
fn assert_conserved(pool: &FixedPool<u16>) {
    let free: Vec<u32> = pool.free_slots().collect();
    let live: Vec<u32> = pool.iter().map(|(h, _)| h.slot()).collect();

    assert_eq!(free.len() + pool.live_count(), pool.capacity());
    assert_eq!(live.len(), pool.live_count());

    let mut seen = HashSet::new();
    for slot in free.iter().chain(&live) {
        assert!(seen.insert(*slot), "slot {slot} appears twice");
    }
    assert_eq!(seen.len(), pool.capacity());
}

proptest! {
    #[test]
    fn arena_blocks_never_overlap(
        capacity in 1usize..512,
        sizes in prop::collection::vec(0usize..64, 0..64),
    ) {
        let mut arena = LinearArena::new(capacity).unwrap();
        let mut blocks = Vec::new();

        for size in sizes {
            let before = arena.used();
            match arena.allocate(size) {
                Ok(block) => {
                    prop_assert_eq!(block.len(), size);
                    prop_assert!(block.end() <= capacity);
                    blocks.push(block);
                }
                Err(AllocError::ArenaExhausted { .. }) => {
                    prop_assert!(before + size > capacity);
                    prop_assert_eq!(arena.used(), before);
                }
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }
        }

        let mut spans: Vec<_> = blocks.iter().filter(|b| !b.is_empty()).collect();
        spans.sort_by_key(|b| b.offset());
        for pair in spans.windows(2) {
            prop_assert!(pair[0].end() <= pair[1].offset());
        }
    }

    #[test]
    fn arena_aligned_blocks_are_aligned(
        shifts in prop::collection::vec((1usize..32, 0u32..7), 1..32),
    ) {
        let mut arena = LinearArena::new(4096).unwrap();
        for (size, shift) in shifts {
            let align = 1usize << shift;
            if let Ok(block) = arena.allocate_aligned(size, align) {
                let addr = arena.bytes(block).unwrap().as_ptr() as usize;
                prop_assert_eq!(addr % align, 0);
            }
        }
    }

    #[test]
    fn arena_reset_restores_full_capacity(
        capacity in 1usize..256,
        sizes in prop::collection::vec(1usize..64, 0..16),
    ) {
        let mut arena = LinearArena::new(capacity).unwrap();
        for size in sizes {
            let _ = arena.allocate(size);
        }
        arena.reset();
        let block = arena.allocate(capacity).unwrap();
        prop_assert_eq!(block.offset(), 0);
    }

    #[test]
    fn pool_slots_are_conserved(
        capacity in 1usize..32,
        ops in prop::collection::vec(pool_op(), 0..128),
    ) {
        let mut pool: FixedPool<u16> = FixedPool::new(capacity).unwrap();
        let mut live: Vec<(PoolHandle, u16)> = Vec::new();
        let mut dead: Vec<PoolHandle> = Vec::new();

        for op in ops {
            match op {
                PoolOp::Allocate(value) => match pool.allocate(value) {
                    Ok(handle) => live.push((handle, value)),
                    Err(err) => {
                        prop_assert_eq!(live.len(), capacity);
                        prop_assert_eq!(err, AllocError::PoolExhausted { capacity });
                    }
                },
                PoolOp::Release(pick) if !live.is_empty() => {
                    let (handle, value) = live.swap_remove(pick % live.len());
                    prop_assert_eq!(pool.take(handle), Ok(value));
                    dead.push(handle);
                }
                PoolOp::ReleaseStale(pick) if !dead.is_empty() => {
                    let handle = dead[pick % dead.len()];
                    let rejected = matches!(pool.release(handle), Err(AllocError::InvalidHandle { .. }));
                    prop_assert!(rejected);
                }
                PoolOp::Reset => {
                    pool.reset();
                    dead.extend(live.drain(..).map(|(h, _)| h));
                }
                PoolOp::Release(_) | PoolOp::ReleaseStale(_) => {}
            }

            prop_assert_eq!(pool.live_count(), live.len());
            for (handle, value) in &live {
                prop_assert_eq!(pool.get(*handle), Some(value));
            }
            assert_conserved(&pool);
        }
    }
}
