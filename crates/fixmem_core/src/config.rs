//! # Allocator Configuration
//!
//! Capacities loaded once at startup from a TOML file.
//!
//! ```toml
//! [arena]
//! capacity_bytes = 65536
//!
//! [pool]
//! capacity = 1024
//! ```
//!
//! Missing sections and fields fall back to their defaults. Unknown fields
//! are rejected.

use crate::error::{AllocError, AllocResult};
use crate::memory::{FixedPool, LinearArena};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sizing for a [`LinearArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArenaConfig {
    /// Backing buffer size in bytes.
    pub capacity_bytes: usize,
}

impl ArenaConfig {
    /// Default arena size: 64 KiB.
    pub const DEFAULT_CAPACITY_BYTES: usize = 64 * 1024;
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            capacity_bytes: Self::DEFAULT_CAPACITY_BYTES,
        }
    }
}

/// Sizing for a [`FixedPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Maximum number of live values.
    pub capacity: usize,
}

impl PoolConfig {
    /// Default slot count.
    pub const DEFAULT_CAPACITY: usize = 1024;
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: Self::DEFAULT_CAPACITY,
        }
    }
}

/// Configuration for both allocators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AllocatorConfig {
    /// Arena section.
    pub arena: ArenaConfig,
    /// Pool section.
    pub pool: PoolConfig,
}

impl AllocatorConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::InvalidConfig`] for malformed TOML or zero
    /// capacities.
    pub fn from_toml_str(source: &str) -> AllocResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| AllocError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::InvalidConfig`] if the file cannot be read or
    /// does not parse.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AllocResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| AllocError::InvalidConfig(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(
            path = %path.display(),
            arena_bytes = config.arena.capacity_bytes,
            pool_slots = config.pool.capacity,
            "allocator config loaded"
        );
        Ok(config)
    }

    /// Serializes the configuration back to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::InvalidConfig`] if serialization fails.
    pub fn to_toml_string(&self) -> AllocResult<String> {
        toml::to_string(self).map_err(|e| AllocError::InvalidConfig(e.to_string()))
    }

    /// Checks every capacity is usable.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> AllocResult<()> {
        if self.arena.capacity_bytes == 0 {
            return Err(AllocError::InvalidConfig(
                "arena.capacity_bytes must be greater than zero".into(),
            ));
        }
        if self.pool.capacity == 0 {
            return Err(AllocError::InvalidConfig(
                "pool.capacity must be greater than zero".into(),
            ));
        }
        if self.pool.capacity > FixedPool::<()>::MAX_CAPACITY {
            return Err(AllocError::InvalidConfig(format!(
                "pool.capacity must be at most {}",
                FixedPool::<()>::MAX_CAPACITY
            )));
        }
        Ok(())
    }

    /// Builds an arena from the `[arena]` section.
    ///
    /// # Errors
    ///
    /// Propagates [`LinearArena::new`] errors.
    pub fn build_arena(&self) -> AllocResult<LinearArena> {
        LinearArena::new(self.arena.capacity_bytes)
    }

    /// Builds a pool from the `[pool]` section.
    ///
    /// # Errors
    ///
    /// Propagates [`FixedPool::new`] errors.
    pub fn build_pool<T>(&self) -> AllocResult<FixedPool<T>> {
        FixedPool::new(self.pool.capacity)
    }
}
