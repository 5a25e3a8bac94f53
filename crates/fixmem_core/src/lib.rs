//! # FIXMEM Core
//!
//! Fixed-capacity allocators for code that must not touch the system
//! allocator after startup:
//! - [`LinearArena`]: bump-pointer byte arena, reclaimed all at once
//! - [`FixedPool`]: free-list pool for up to N values of one type
//!
//! ## Architecture Rules
//!
//! 1. **Reserve once** - Backing storage is obtained at construction and
//!    released on drop
//! 2. **Handles, not pointers** - Blocks and slots are indices checked on
//!    every access
//! 3. **Fail closed** - Exhaustion and bad handles are ordinary errors,
//!    never overlapping or undersized blocks
//!
//! ## Example
//!
//! ```rust,ignore
//! use fixmem_core::{FixedPool, LinearArena};
//!
//! let mut scratch = LinearArena::new(64 * 1024)?;
//! let block = scratch.allocate(128)?;
//!
//! let mut points: FixedPool<Point> = FixedPool::new(3)?;
//! let p0 = points.allocate(Point::new(1.0, 2.0, 3.0))?;
//! points.release(p0)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod memory;
pub mod sync;
pub mod traits;

pub use config::{AllocatorConfig, ArenaConfig, PoolConfig};
pub use error::{AllocError, AllocResult, ConstructError};
pub use memory::{ArenaBlock, FixedPool, FreeSlots, LinearArena, PoolHandle};
pub use sync::Locked;
pub use traits::BlockAllocator;
