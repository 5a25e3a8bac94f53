//! # Shared Allocators
//!
//! The allocators in [`memory`](crate::memory) take `&mut self` and do no
//! locking of their own. [`Locked`] is the coarse upgrade path: one mutex
//! around the whole allocator, held for a single O(1) call.
//!
//! ```text
//! Thread 1 ──┐
//! Thread 2 ──┼──> [parking_lot::Mutex] ──> LinearArena / FixedPool<T>
//! Thread N ──┘
//! ```

mod locked;

pub use locked::Locked;
