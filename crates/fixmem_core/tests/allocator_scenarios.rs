//! # Allocator Scenario Tests
//!
//! End-to-end walks through both allocators, driven the way client code
//! drives them: typed values in the pool, raw scratch bytes in the arena.
//!
//! Run with: cargo test --test allocator_scenarios

use fixmem_core::{AllocError, BlockAllocator, FixedPool, LinearArena, PoolHandle};

/// Illustrative caller type.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Point {
    x: f32,
    y: f32,
    z: f32,
}

impl Point {
    fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

// ============================================================================
// POOL
// ============================================================================

#[test]
fn point_pool_reuses_released_slot() {
    let mut pool: FixedPool<Point> = FixedPool::new(3).unwrap();

    let p0 = pool.allocate(Point::new(0.0, 0.0, 0.0)).unwrap();
    let p1 = pool.allocate(Point::new(1.0, 1.0, 1.0)).unwrap();
    let p2 = pool.allocate(Point::new(2.0, 2.0, 2.0)).unwrap();
    assert_eq!([p0.slot(), p1.slot(), p2.slot()], [0, 1, 2]);

    pool.release(p1).unwrap();

    let p3 = pool.allocate(Point::new(3.0, 3.0, 3.0)).unwrap();
    assert_eq!(p3.slot(), 1);

    assert_eq!(
        pool.allocate(Point::new(4.0, 4.0, 4.0)).unwrap_err(),
        AllocError::PoolExhausted { capacity: 3 }
    );

    assert_eq!(pool.get(p0), Some(&Point::new(0.0, 0.0, 0.0)));
    assert_eq!(pool.get(p2), Some(&Point::new(2.0, 2.0, 2.0)));
    assert_eq!(pool.get(p3).map(|p| p.x), Some(3.0));
    assert!(pool.get(p1).is_none());
}

#[test]
fn release_any_slot_allows_exactly_one_more() {
    let capacity = 8;
    let mut pool: FixedPool<u64> = FixedPool::new(capacity).unwrap();
    let handles: Vec<PoolHandle> = (0..capacity as u64)
        .map(|i| pool.allocate(i).unwrap())
        .collect();
    assert!(pool.allocate(99).is_err());

    pool.release(handles[5]).unwrap();
    let reused = pool.allocate(100).unwrap();
    assert_eq!(reused.slot(), 5);
    assert!(pool.allocate(101).is_err());
}

#[test]
fn first_slot_is_reused_first() {
    let mut pool: FixedPool<Point> = FixedPool::new(4).unwrap();
    let first = pool.allocate(Point::new(1.0, 2.0, 3.0)).unwrap();
    assert_eq!(first.slot(), 0);

    pool.release(first).unwrap();
    assert_eq!(pool.allocate(Point::new(4.0, 5.0, 6.0)).unwrap().slot(), 0);
}

#[test]
fn double_release_keeps_slots_conserved() {
    let mut pool: FixedPool<Point> = FixedPool::new(3).unwrap();
    let a = pool.allocate(Point::new(0.0, 0.0, 0.0)).unwrap();
    pool.allocate(Point::new(1.0, 0.0, 0.0)).unwrap();

    pool.release(a).unwrap();
    assert!(matches!(
        pool.release(a),
        Err(AllocError::InvalidHandle { slot: 0, .. })
    ));

    let mut free: Vec<u32> = pool.free_slots().collect();
    free.sort_unstable();
    assert_eq!(free, vec![0, 2]);
    assert_eq!(free.len() + pool.live_count(), pool.capacity());
}

#[test]
fn failed_construction_does_not_lose_slot() {
    let mut pool: FixedPool<Point> = FixedPool::new(2).unwrap();

    let parsed = pool.try_allocate_with(|| {
        "oops".parse::<f32>().map(|x| Point::new(x, 0.0, 0.0))
    });
    assert!(parsed.is_err());
    assert_eq!(pool.free_count(), 2);

    let handle = pool
        .try_allocate_with(|| "7.5".parse::<f32>().map(|x| Point::new(x, 0.0, 0.0)))
        .unwrap();
    assert_eq!(handle.slot(), 0);
    assert_eq!(pool.get(handle).map(|p| p.x), Some(7.5));
}

// ============================================================================
// ARENA
// ============================================================================

#[test]
fn arena_capacity_sixteen() {
    let mut arena = LinearArena::new(16).unwrap();

    arena.allocate(10).unwrap();
    assert_eq!(arena.used(), 10);

    assert!(matches!(
        arena.allocate(10),
        Err(AllocError::ArenaExhausted { requested: 10, .. })
    ));
    assert_eq!(arena.used(), 10);
}

#[test]
fn arena_reset_restarts_at_base() {
    let mut arena = LinearArena::new(100).unwrap();
    for size in [7, 13, 40, 40] {
        arena.allocate(size).unwrap();
    }
    assert_eq!(arena.remaining(), 0);

    arena.reset();
    let block = arena.allocate(100).unwrap();
    assert_eq!(block.offset(), 0);
    assert_eq!(block.len(), 100);
}

#[test]
fn arena_scratch_strings() {
    let mut arena = LinearArena::new(64).unwrap();
    let words = ["alpha", "beta", "gamma"];
    let blocks: Vec<_> = words
        .iter()
        .map(|w| arena.allocate_copy(w.as_bytes()).unwrap())
        .collect();

    for (word, block) in words.iter().zip(&blocks) {
        assert_eq!(arena.bytes(*block).unwrap(), word.as_bytes());
    }

    arena.reset();
    assert!(blocks.iter().all(|b| arena.bytes(*b).is_err()));
}

// ============================================================================
// SHARED CONTRACT
// ============================================================================

/// Acquires until the allocator refuses, then resets and checks it is empty.
fn drain_and_reset<A>(allocator: &mut A, request: impl Fn() -> A::Request) -> usize
where
    A: BlockAllocator,
{
    let mut count = 0;
    while allocator.acquire(request()).is_ok() {
        count += 1;
    }
    assert_eq!(allocator.remaining(), allocator.capacity() - allocator.in_use());
    allocator.reset();
    assert_eq!(allocator.in_use(), 0);
    count
}

#[test]
fn both_allocators_honor_contract() {
    let mut arena = LinearArena::new(40).unwrap();
    assert_eq!(drain_and_reset(&mut arena, || 8), 5);

    let mut pool: FixedPool<Point> = FixedPool::new(6).unwrap();
    assert_eq!(drain_and_reset(&mut pool, || Point::new(0.0, 0.0, 0.0)), 6);
}

#[test]
fn arena_release_through_contract_is_noop() {
    let mut arena = LinearArena::new(32).unwrap();
    let block = arena.acquire(8).unwrap();
    BlockAllocator::release(&mut arena, block).unwrap();
    assert_eq!(arena.in_use(), 8);
}
