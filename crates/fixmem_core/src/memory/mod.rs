//! # Memory Management
//!
//! Fixed-capacity allocators for allocation-free hot paths.
//!
//! ## Design Philosophy
//!
//! All memory is reserved once, at construction. After that:
//! - No heap allocations
//! - No system calls
//! - Flat, O(1) latency for allocate and release

mod arena;
mod pool;

pub use arena::{ArenaBlock, LinearArena};
pub use pool::{FixedPool, FreeSlots, PoolHandle};
