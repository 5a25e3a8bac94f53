//! # Linear Arena
//!
//! A bump allocator over one fixed-size buffer. Blocks are carved off in
//! order and reclaimed all at once.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::{AllocError, AllocResult};
use crate::traits::BlockAllocator;

static NEXT_ARENA_ID: AtomicU32 = AtomicU32::new(0);

/// Handle to a byte range carved from a [`LinearArena`].
///
/// Blocks are plain offsets into the arena, not addresses, tagged with the
/// id of the arena that carved them. They stay valid until the next
/// [`LinearArena::reset`]; after that every access through them fails with
/// [`AllocError::StaleBlock`]. Any other arena rejects them with
/// [`AllocError::ForeignBlock`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ArenaBlock {
    /// Id of the arena that carved the block.
    arena: u32,
    /// Start offset into the arena buffer.
    offset: usize,
    /// Length in bytes.
    len: usize,
    /// Arena epoch the block was carved in.
    epoch: u32,
}

impl ArenaBlock {
    /// Returns the start offset into the arena buffer.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> usize {
        self.offset
    }

    /// Returns the block length in bytes.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.len
    }

    /// Returns true for a zero-length block.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    /// Returns the offset one past the last byte.
    #[inline]
    #[must_use]
    pub const fn end(self) -> usize {
        self.offset + self.len
    }

    /// Returns the arena epoch this block belongs to.
    #[inline]
    #[must_use]
    pub const fn epoch(self) -> u32 {
        self.epoch
    }

    /// Returns the id of the arena that carved this block.
    #[inline]
    #[must_use]
    pub const fn arena_id(self) -> u32 {
        self.arena
    }
}

/// A bump-pointer arena allocator.
///
/// Allocations are fast (just bump an offset). Individual blocks cannot be
/// freed; memory is reclaimed all at once when the arena is reset or
/// dropped.
///
/// # Thread Safety
///
/// This arena is NOT thread-safe. Use one arena per thread or wrap it in
/// [`Locked`](crate::Locked).
///
/// # Example
///
/// ```rust,ignore
/// let mut arena = LinearArena::new(1024 * 1024)?; // 1MB
///
/// // Fast allocations
/// let block = arena.allocate(256)?;
/// arena.bytes_mut(block)?.fill(0xAB);
///
/// // Reset to free all allocations
/// arena.reset();
/// ```
#[derive(Debug)]
pub struct LinearArena {
    /// Process-unique id stamped into every block.
    id: u32,
    /// The backing storage.
    storage: Box<[u8]>,
    /// Current allocation offset.
    offset: usize,
    /// Bumped on every reset.
    epoch: u32,
    /// Peak offset since construction.
    high_water: usize,
    /// Non-empty allocations since the last reset.
    allocations: usize,
}

impl LinearArena {
    /// Creates a new arena with the specified capacity in bytes.
    ///
    /// The whole buffer is reserved here; nothing later touches the system
    /// allocator.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Total size in bytes
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::ZeroCapacity`] for a zero capacity and
    /// [`AllocError::OutOfMemory`] if the buffer cannot be reserved.
    pub fn new(capacity: usize) -> AllocResult<Self> {
        if capacity == 0 {
            return Err(AllocError::ZeroCapacity);
        }

        let mut storage = Vec::new();
        storage
            .try_reserve_exact(capacity)
            .map_err(|_| AllocError::OutOfMemory { requested: capacity })?;
        storage.resize(capacity, 0u8);

        let id = NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(arena = id, capacity, "linear arena created");

        Ok(Self {
            id,
            storage: storage.into_boxed_slice(),
            offset: 0,
            epoch: 0,
            high_water: 0,
            allocations: 0,
        })
    }

    /// Returns the total capacity in bytes.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Returns the current used space in bytes.
    #[inline]
    #[must_use]
    pub const fn used(&self) -> usize {
        self.offset
    }

    /// Returns the remaining free space in bytes.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity() - self.offset
    }

    /// Returns the largest offset ever reached, across resets.
    #[inline]
    #[must_use]
    pub const fn high_water_mark(&self) -> usize {
        self.high_water
    }

    /// Returns the process-unique id stamped into this arena's blocks.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Returns the current epoch. Starts at 0 and wraps.
    #[inline]
    #[must_use]
    pub const fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Returns the number of non-empty blocks carved since the last reset.
    #[inline]
    #[must_use]
    pub const fn allocation_count(&self) -> usize {
        self.allocations
    }

    /// Allocates `size` bytes at the current offset.
    ///
    /// An allocation that exactly fills the buffer succeeds. A zero-size
    /// request returns an empty block and leaves the offset alone.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::ArenaExhausted`] if `size` does not fit. The
    /// offset is unchanged.
    pub fn allocate(&mut self, size: usize) -> AllocResult<ArenaBlock> {
        self.carve(0, size)
    }

    /// Allocates `size` bytes whose first byte sits at an address that is a
    /// multiple of `align`.
    ///
    /// Padding is taken from the arena and counts towards [`used`](Self::used).
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::InvalidAlignment`] if `align` is not a power of
    /// two, or [`AllocError::ArenaExhausted`] if padding plus `size` does not
    /// fit.
    pub fn allocate_aligned(&mut self, size: usize, align: usize) -> AllocResult<ArenaBlock> {
        if !align.is_power_of_two() {
            return Err(AllocError::InvalidAlignment(align));
        }
        if size == 0 {
            return self.carve(0, 0);
        }

        let cursor = self.storage.as_ptr() as usize + self.offset;
        let padding = cursor.wrapping_neg() & (align - 1);
        self.carve(padding, size)
    }

    /// Allocates a block and copies `data` into it.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::ArenaExhausted`] if `data` does not fit.
    pub fn allocate_copy(&mut self, data: &[u8]) -> AllocResult<ArenaBlock> {
        let block = self.carve(0, data.len())?;
        self.storage[block.offset..block.end()].copy_from_slice(data);
        Ok(block)
    }

    fn carve(&mut self, padding: usize, size: usize) -> AllocResult<ArenaBlock> {
        if size == 0 {
            return Ok(ArenaBlock {
                arena: self.id,
                offset: self.offset,
                len: 0,
                epoch: self.epoch,
            });
        }

        let start = self.offset.checked_add(padding);
        let end = start.and_then(|start| start.checked_add(size));
        let (Some(start), Some(end)) = (start, end) else {
            return Err(self.exhausted(padding.saturating_add(size)));
        };
        if end > self.capacity() {
            return Err(self.exhausted(padding + size));
        }

        self.offset = end;
        self.high_water = self.high_water.max(end);
        self.allocations += 1;

        Ok(ArenaBlock {
            arena: self.id,
            offset: start,
            len: size,
            epoch: self.epoch,
        })
    }

    fn exhausted(&self, requested: usize) -> AllocError {
        tracing::trace!(
            requested,
            remaining = self.remaining(),
            capacity = self.capacity(),
            "linear arena exhausted"
        );
        AllocError::ArenaExhausted {
            requested,
            remaining: self.remaining(),
            capacity: self.capacity(),
        }
    }

    /// Returns the bytes of a block.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::ForeignBlock`] for a block carved by another
    /// arena, [`AllocError::StaleBlock`] if the arena was reset since the
    /// block was carved, or [`AllocError::BlockOutOfBounds`] for a block
    /// past this arena's cursor.
    pub fn bytes(&self, block: ArenaBlock) -> AllocResult<&[u8]> {
        let range = self.check(block)?;
        Ok(&self.storage[range])
    }

    /// Returns the bytes of a block, mutably.
    ///
    /// # Errors
    ///
    /// Same as [`bytes`](Self::bytes).
    pub fn bytes_mut(&mut self, block: ArenaBlock) -> AllocResult<&mut [u8]> {
        let range = self.check(block)?;
        Ok(&mut self.storage[range])
    }

    fn check(&self, block: ArenaBlock) -> AllocResult<std::ops::Range<usize>> {
        if block.arena != self.id {
            tracing::trace!(
                arena = self.id,
                block_arena = block.arena,
                "linear arena rejected block"
            );
            return Err(AllocError::ForeignBlock {
                block_arena: block.arena,
                arena: self.id,
            });
        }
        if block.epoch != self.epoch {
            return Err(AllocError::StaleBlock {
                block_epoch: block.epoch,
                current_epoch: self.epoch,
            });
        }
        match block.offset.checked_add(block.len) {
            Some(end) if end <= self.offset => Ok(block.offset..end),
            _ => Err(AllocError::BlockOutOfBounds {
                offset: block.offset,
                len: block.len,
                capacity: self.capacity(),
            }),
        }
    }

    /// Does nothing. Individual blocks cannot be freed; use
    /// [`reset`](Self::reset) to reclaim everything.
    #[inline]
    #[allow(clippy::unused_self)]
    pub fn release(&mut self, _block: ArenaBlock) {}

    /// Resets the arena, invalidating all previous allocations.
    ///
    /// This is a **zero-cost** operation - no memory is freed, reallocated or
    /// cleared. Previous blocks are rejected by [`bytes`](Self::bytes) from
    /// here on.
    pub fn reset(&mut self) {
        tracing::debug!(
            epoch = self.epoch,
            reclaimed = self.offset,
            blocks = self.allocations,
            "linear arena reset"
        );
        self.offset = 0;
        self.allocations = 0;
        self.epoch = self.epoch.wrapping_add(1);
    }
}

impl BlockAllocator for LinearArena {
    type Request = usize;
    type Handle = ArenaBlock;

    fn acquire(&mut self, size: usize) -> AllocResult<ArenaBlock> {
        self.allocate(size)
    }

    fn release(&mut self, block: ArenaBlock) -> AllocResult<()> {
        LinearArena::release(self, block);
        Ok(())
    }

    fn reset(&mut self) {
        LinearArena::reset(self);
    }

    fn capacity(&self) -> usize {
        LinearArena::capacity(self)
    }

    fn in_use(&self) -> usize {
        self.used()
    }
}
