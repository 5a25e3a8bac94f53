//! # Allocator Contract
//!
//! The shared shape of every allocator in this crate: acquire a block,
//! optionally release it, reset everything at once.

use crate::error::AllocResult;

/// A fixed-capacity allocator.
///
/// Units depend on the implementation: [`LinearArena`](crate::LinearArena)
/// counts bytes, [`FixedPool`](crate::FixedPool) counts slots.
///
/// # Example
///
/// ```rust,ignore
/// fn drain<A: BlockAllocator>(alloc: &mut A, request: A::Request) -> usize
/// where
///     A::Request: Clone,
/// {
///     let mut count = 0;
///     while alloc.acquire(request.clone()).is_ok() {
///         count += 1;
///     }
///     count
/// }
/// ```
pub trait BlockAllocator {
    /// What the caller hands over to get a block.
    type Request;

    /// Non-owning reference to an acquired block.
    type Handle: Copy;

    /// Acquires a block for `request`.
    ///
    /// # Errors
    ///
    /// Returns an exhaustion error when the request does not fit.
    fn acquire(&mut self, request: Self::Request) -> AllocResult<Self::Handle>;

    /// Gives a block back.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::InvalidHandle`](crate::AllocError::InvalidHandle)
    /// when the handle is not live.
    fn release(&mut self, handle: Self::Handle) -> AllocResult<()>;

    /// Reclaims every block at once. All outstanding handles become invalid.
    fn reset(&mut self);

    /// Total capacity.
    fn capacity(&self) -> usize;

    /// Capacity currently handed out.
    fn in_use(&self) -> usize;

    /// Capacity still available.
    #[inline]
    fn remaining(&self) -> usize {
        self.capacity() - self.in_use()
    }
}
