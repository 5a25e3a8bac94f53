//! # Allocator Error Types
//!
//! All errors that can occur while constructing or using an allocator.
//!
//! Exhaustion and handle errors are ordinary, recoverable results. Nothing
//! in this crate retries or swallows them.

use thiserror::Error;

/// Errors that can occur in the allocators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    /// Backing storage could not be reserved at construction.
    #[error("out of memory: could not reserve {requested} bytes of backing storage")]
    OutOfMemory {
        /// Bytes that were requested from the system allocator.
        requested: usize,
    },

    /// An allocator was constructed with a capacity of zero.
    #[error("capacity must be greater than zero")]
    ZeroCapacity,

    /// Pool capacity collides with the free-list sentinel.
    #[error("capacity too large: requested {requested} slots, maximum is {max}")]
    CapacityTooLarge {
        /// Requested slot count.
        requested: usize,
        /// Largest supported slot count.
        max: usize,
    },

    /// The arena cannot fit the requested block.
    #[error("arena exhausted: requested {requested} bytes, {remaining} of {capacity} remaining")]
    ArenaExhausted {
        /// Bytes requested, including alignment padding.
        requested: usize,
        /// Bytes still free before the call.
        remaining: usize,
        /// Total arena capacity.
        capacity: usize,
    },

    /// Every slot in the pool is live.
    #[error("pool exhausted: all {capacity} slots are live")]
    PoolExhausted {
        /// Total pool capacity.
        capacity: usize,
    },

    /// The handle does not name a currently live slot.
    #[error("invalid handle: slot {slot} (generation {generation}) is not live")]
    InvalidHandle {
        /// Slot index carried by the handle.
        slot: u32,
        /// Generation carried by the handle.
        generation: u32,
    },

    /// The block was carved before the arena was last reset.
    #[error("stale block: allocated in epoch {block_epoch}, arena is at epoch {current_epoch}")]
    StaleBlock {
        /// Epoch recorded in the block.
        block_epoch: u32,
        /// Current arena epoch.
        current_epoch: u32,
    },

    /// The block was carved by a different arena.
    #[error("foreign block: carved by arena {block_arena}, used with arena {arena}")]
    ForeignBlock {
        /// Arena id recorded in the block.
        block_arena: u32,
        /// Id of the arena it was passed to.
        arena: u32,
    },

    /// The block reaches past the bytes this arena has handed out.
    #[error("block out of bounds: offset {offset} + len {len} is past the arena cursor (capacity {capacity})")]
    BlockOutOfBounds {
        /// Block start offset.
        offset: usize,
        /// Block length in bytes.
        len: usize,
        /// Arena capacity.
        capacity: usize,
    },

    /// Alignment is zero or not a power of two.
    #[error("invalid alignment {0}: must be a non-zero power of two")]
    InvalidAlignment(usize),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for allocator operations.
pub type AllocResult<T> = Result<T, AllocError>;

/// Failure of a fallible in-place construction.
///
/// Returned by [`FixedPool::try_allocate_with`](crate::FixedPool::try_allocate_with).
/// When the constructor fails, the slot stays on the free list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructError<E> {
    /// The pool could not provide a slot.
    #[error(transparent)]
    Alloc(#[from] AllocError),

    /// The element constructor returned an error.
    #[error("element construction failed: {0}")]
    Init(E),
}
