//! # Locked Allocator
//!
//! A [`BlockAllocator`] behind a `parking_lot::Mutex`.

use crate::error::AllocResult;
use crate::traits::BlockAllocator;
use parking_lot::Mutex;

/// An allocator that can be shared across threads.
///
/// Every call takes the lock for exactly one allocator operation. Handles
/// keep their usual meaning; they carry no lock state.
///
/// # Example
///
/// ```rust,ignore
/// let pool = Arc::new(Locked::new(FixedPool::<Packet>::new(256)?));
///
/// let handle = pool.acquire(Packet::default())?;
/// let len = pool.with(|pool| pool.get(handle).map(Packet::len));
/// pool.release(handle)?;
/// ```
#[derive(Debug)]
pub struct Locked<A> {
    inner: Mutex<A>,
}

impl<A: BlockAllocator> Locked<A> {
    /// Wraps an allocator.
    #[must_use]
    pub fn new(allocator: A) -> Self {
        Self {
            inner: Mutex::new(allocator),
        }
    }

    /// Acquires a block under the lock.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's exhaustion error.
    pub fn acquire(&self, request: A::Request) -> AllocResult<A::Handle> {
        self.inner.lock().acquire(request)
    }

    /// Releases a block under the lock.
    ///
    /// # Errors
    ///
    /// Propagates the allocator's handle error.
    pub fn release(&self, handle: A::Handle) -> AllocResult<()> {
        self.inner.lock().release(handle)
    }

    /// Resets the allocator under the lock.
    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    /// Returns the allocator's capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    /// Returns the capacity currently handed out.
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.inner.lock().in_use()
    }

    /// Runs `f` with exclusive access to the allocator.
    ///
    /// Keep `f` short; every other caller waits on it.
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut A) -> R,
    {
        let mut guard = self.inner.lock();
        f(&mut *guard)
    }

    /// Unwraps the allocator.
    #[must_use]
    pub fn into_inner(self) -> A {
        self.inner.into_inner()
    }
}
