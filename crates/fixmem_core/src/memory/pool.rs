//! # Fixed Pool
//!
//! Fixed-count slot allocator for values that are frequently created and
//! destroyed.
//!
//! The free list lives in a flat array of "next" links, so the whole pool
//! stays in a handful of contiguous allocations made at construction.

use crate::error::{AllocError, AllocResult, ConstructError};
use crate::traits::BlockAllocator;
use std::iter::FusedIterator;
use std::sync::atomic::{AtomicU32, Ordering};

/// Free-list terminator.
const FREE_LIST_END: u32 = u32::MAX;

/// Source of pool ids; each pool takes the next one at construction.
static NEXT_POOL_ID: AtomicU32 = AtomicU32::new(0);

/// Handle to a live value in a [`FixedPool`].
///
/// The handle is split into three parts:
/// - Id of the pool that issued it
/// - Slot index into the pool storage
/// - Generation counter for detecting stale handles after the slot is reused
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    /// Issuing pool.
    pool: u32,
    /// Index into the pool.
    slot: u32,
    /// Slot generation at allocation time.
    generation: u32,
}

impl PoolHandle {
    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn slot(self) -> u32 {
        self.slot
    }

    /// Returns the generation portion of the handle.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Returns the id of the pool that issued this handle.
    #[inline]
    #[must_use]
    pub const fn pool_id(self) -> u32 {
        self.pool
    }
}

/// A pool allocator for values of a single type.
///
/// Up to `capacity` values can be live at once. Allocation pops the head of
/// the free list, release pushes the slot back, so the most recently freed
/// slot is reused first.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. Use one pool per thread or wrap it in
/// [`Locked`](crate::Locked).
///
/// # Example
///
/// ```rust,ignore
/// struct Particle { x: f32, y: f32, life: f32 }
///
/// let mut pool: FixedPool<Particle> = FixedPool::new(10000)?;
///
/// // Allocate - O(1), no heap allocation
/// let handle = pool.allocate(Particle { x: 0.0, y: 0.0, life: 1.0 })?;
///
/// // Release - O(1), no heap deallocation
/// pool.release(handle)?;
/// ```
#[derive(Debug)]
pub struct FixedPool<T> {
    /// Stamped into every handle this pool issues.
    id: u32,
    /// The storage array. `None` marks a free slot.
    slots: Box<[Option<T>]>,
    /// Free list links, indexed by slot.
    next_free: Box<[u32]>,
    /// Per-slot generation, bumped whenever a slot is freed.
    generations: Box<[u32]>,
    /// First free slot, or `FREE_LIST_END` when full.
    free_head: u32,
    /// Number of live values.
    live_count: usize,
}

impl<T> FixedPool<T> {
    /// Largest supported capacity. `u32::MAX` is reserved for the free-list
    /// terminator.
    pub const MAX_CAPACITY: usize = (u32::MAX - 1) as usize;

    /// Creates a new pool with the specified capacity.
    ///
    /// All memory is pre-allocated upfront. No value of `T` exists yet.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of live values
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::ZeroCapacity`] or
    /// [`AllocError::CapacityTooLarge`] for an unusable capacity, and
    /// [`AllocError::OutOfMemory`] if storage cannot be reserved.
    pub fn new(capacity: usize) -> AllocResult<Self> {
        if capacity == 0 {
            return Err(AllocError::ZeroCapacity);
        }
        if capacity > Self::MAX_CAPACITY {
            return Err(AllocError::CapacityTooLarge {
                requested: capacity,
                max: Self::MAX_CAPACITY,
            });
        }

        let mut slots: Vec<Option<T>> = reserve(capacity)?;
        slots.extend((0..capacity).map(|_| None));

        let mut next_free: Vec<u32> = reserve(capacity)?;
        next_free.extend((0..capacity).map(|index| chain_link(index, capacity)));

        let mut generations: Vec<u32> = reserve(capacity)?;
        generations.resize(capacity, 0);

        let id = NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            pool = id,
            capacity,
            slot_bytes = std::mem::size_of::<Option<T>>(),
            "fixed pool created"
        );

        Ok(Self {
            id,
            slots: slots.into_boxed_slice(),
            next_free: next_free.into_boxed_slice(),
            generations: generations.into_boxed_slice(),
            free_head: 0,
            live_count: 0,
        })
    }

    /// Returns the total capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns this pool's id, as carried by its handles.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Returns the number of currently live values.
    #[inline]
    #[must_use]
    pub const fn live_count(&self) -> usize {
        self.live_count
    }

    /// Returns the number of free slots.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.capacity() - self.live_count
    }

    /// Returns true if every slot is live.
    #[inline]
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.free_head == FREE_LIST_END
    }

    /// Returns true if no slot is live.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Allocates a slot and stores the value.
    ///
    /// This is a **O(1)** operation with **zero heap allocations**.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::PoolExhausted`] if every slot is live. The value
    /// is dropped.
    pub fn allocate(&mut self, value: T) -> AllocResult<PoolHandle> {
        self.allocate_with(|| value)
    }

    /// Allocates a slot and builds the value in it.
    ///
    /// `init` only runs once a free slot is known to exist.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::PoolExhausted`] if every slot is live.
    pub fn allocate_with<F>(&mut self, init: F) -> AllocResult<PoolHandle>
    where
        F: FnOnce() -> T,
    {
        let slot = self.peek_free()?;
        Ok(self.commit(slot, init()))
    }

    /// Allocates a slot and builds the value with a fallible constructor.
    ///
    /// If `init` fails the pool is left exactly as it was; the slot stays at
    /// the head of the free list.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructError::Alloc`] if every slot is live, or
    /// [`ConstructError::Init`] with the constructor's error.
    pub fn try_allocate_with<F, E>(&mut self, init: F) -> Result<PoolHandle, ConstructError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let slot = self.peek_free()?;
        let value = init().map_err(ConstructError::Init)?;
        Ok(self.commit(slot, value))
    }

    fn peek_free(&self) -> AllocResult<u32> {
        if self.is_full() {
            tracing::trace!(capacity = self.capacity(), "fixed pool exhausted");
            return Err(AllocError::PoolExhausted {
                capacity: self.capacity(),
            });
        }
        Ok(self.free_head)
    }

    /// Pops `slot` off the free list and fills it. `slot` must be the head.
    fn commit(&mut self, slot: u32, value: T) -> PoolHandle {
        let index = slot as usize;
        debug_assert_eq!(slot, self.free_head);
        debug_assert!(self.slots[index].is_none());

        self.free_head = self.next_free[index];
        self.slots[index] = Some(value);
        self.live_count += 1;

        self.handle_at(index)
    }

    /// Destroys a live value and returns its slot to the free list.
    ///
    /// This is a **O(1)** operation with **zero heap deallocations**.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::InvalidHandle`] if the handle is not live:
    /// double release, a stale handle, or a handle issued by another pool.
    pub fn release(&mut self, handle: PoolHandle) -> AllocResult<()> {
        self.take(handle).map(drop)
    }

    /// Moves a live value out and returns its slot to the free list.
    ///
    /// # Errors
    ///
    /// Same as [`release`](Self::release).
    pub fn take(&mut self, handle: PoolHandle) -> AllocResult<T> {
        let value = self
            .slot_index(handle)
            .and_then(|index| self.slots[index].take());
        let Some(value) = value else {
            tracing::trace!(
                pool = self.id,
                handle_pool = handle.pool,
                slot = handle.slot,
                generation = handle.generation,
                "fixed pool rejected handle"
            );
            return Err(AllocError::InvalidHandle {
                slot: handle.slot,
                generation: handle.generation,
            });
        };
        self.push_free(handle.slot);
        self.live_count -= 1;

        Ok(value)
    }

    fn push_free(&mut self, slot: u32) {
        let index = slot as usize;
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.next_free[index] = self.free_head;
        self.free_head = slot;
    }

    /// Index of the slot `handle` was issued for, if it came from this pool
    /// and the slot has not been freed since. Occupancy is left to the caller.
    fn slot_index(&self, handle: PoolHandle) -> Option<usize> {
        let index = handle.slot as usize;
        let current = *self.generations.get(index)?;
        (handle.pool == self.id && current == handle.generation).then_some(index)
    }

    fn handle_at(&self, index: usize) -> PoolHandle {
        PoolHandle {
            pool: self.id,
            slot: slot_of(index),
            generation: self.generations[index],
        }
    }

    /// Returns true if the handle names a live value.
    #[inline]
    #[must_use]
    pub fn contains(&self, handle: PoolHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Gets a reference to a live value.
    ///
    /// # Arguments
    ///
    /// * `handle` - The handle to look up
    #[inline]
    #[must_use]
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        let index = self.slot_index(handle)?;
        self.slots[index].as_ref()
    }

    /// Gets a mutable reference to a live value.
    ///
    /// # Arguments
    ///
    /// * `handle` - The handle to look up
    #[inline]
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        let index = self.slot_index(handle)?;
        self.slots[index].as_mut()
    }

    /// Destroys every live value and rebuilds the full free list.
    ///
    /// No memory is freed. Every outstanding handle becomes invalid.
    pub fn reset(&mut self) {
        tracing::debug!(reclaimed = self.live_count, "fixed pool reset");

        for (slot, generation) in self.slots.iter_mut().zip(self.generations.iter_mut()) {
            if slot.take().is_some() {
                *generation = generation.wrapping_add(1);
            }
        }
        let capacity = self.capacity();
        for (index, next) in self.next_free.iter_mut().enumerate() {
            *next = chain_link(index, capacity);
        }
        self.free_head = 0;
        self.live_count = 0;
    }

    /// Iterates over all live values, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (PoolHandle, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(move |(index, slot)| slot.as_ref().map(|v| (self.handle_at(index), v)))
    }

    /// Iterates mutably over all live values, in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PoolHandle, &mut T)> {
        let pool = self.id;
        self.slots
            .iter_mut()
            .zip(self.generations.iter())
            .enumerate()
            .filter_map(move |(index, (slot, &generation))| {
                slot.as_mut().map(|v| {
                    let handle = PoolHandle {
                        pool,
                        slot: slot_of(index),
                        generation,
                    };
                    (handle, v)
                })
            })
    }

    /// Walks the free list from its head.
    ///
    /// Yields slot indices in the order future allocations will use them.
    #[must_use]
    pub fn free_slots(&self) -> FreeSlots<'_> {
        FreeSlots {
            next_free: &self.next_free,
            cursor: self.free_head,
            budget: self.capacity(),
        }
    }
}

impl<T> BlockAllocator for FixedPool<T> {
    type Request = T;
    type Handle = PoolHandle;

    fn acquire(&mut self, value: T) -> AllocResult<PoolHandle> {
        self.allocate(value)
    }

    fn release(&mut self, handle: PoolHandle) -> AllocResult<()> {
        FixedPool::release(self, handle)
    }

    fn reset(&mut self) {
        FixedPool::reset(self);
    }

    fn capacity(&self) -> usize {
        FixedPool::capacity(self)
    }

    fn in_use(&self) -> usize {
        self.live_count
    }
}

/// Iterator over a pool's free list. See [`FixedPool::free_slots`].
#[derive(Clone, Debug)]
pub struct FreeSlots<'a> {
    next_free: &'a [u32],
    cursor: u32,
    /// Steps left before the walk gives up; bounds a corrupted chain.
    budget: usize,
}

impl Iterator for FreeSlots<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.cursor == FREE_LIST_END || self.budget == 0 {
            return None;
        }
        let slot = self.cursor;
        self.cursor = *self.next_free.get(slot as usize)?;
        self.budget -= 1;
        Some(slot)
    }
}

impl FusedIterator for FreeSlots<'_> {}

/// Initial free-list link for `index`: the next slot, or the end for the
/// last one.
fn chain_link(index: usize, capacity: usize) -> u32 {
    if index + 1 >= capacity {
        FREE_LIST_END
    } else {
        slot_of(index + 1)
    }
}

// Capacity is capped at MAX_CAPACITY, so every index fits.
#[allow(clippy::cast_possible_truncation)]
const fn slot_of(index: usize) -> u32 {
    index as u32
}

fn reserve<V>(capacity: usize) -> AllocResult<Vec<V>> {
    let mut vec = Vec::new();
    vec.try_reserve_exact(capacity)
        .map_err(|_| AllocError::OutOfMemory {
            requested: capacity.saturating_mul(std::mem::size_of::<V>()),
        })?;
    Ok(vec)
}
