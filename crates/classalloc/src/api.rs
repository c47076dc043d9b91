//! Free-function entry points backed by the process-wide allocator.
//!
//! Each call takes the global lock, so these are safe to use from several
//! threads. Callers that own a [`ClassAllocator`](crate::ClassAllocator)
//! directly avoid that cost.

use crate::allocator::Statistics;
use crate::error::Error;
use crate::init;
use core::ptr;

/// Allocate `size` bytes. Returns null only when a large object cannot be
/// obtained from the system, or after shutdown.
pub fn allocate(size: usize) -> *mut u8 {
    init::with_allocator(|a| a.allocate_raw(size)).unwrap_or(ptr::null_mut())
}

/// Release a pointer returned by [`allocate`]. Null is a no-op.
///
/// # Safety
/// `ptr` must be null or come from [`allocate`] and not have been released
/// already. Neither foreign pointers nor double releases are detected.
pub unsafe fn release(ptr: *mut u8) {
    if ptr.is_null() {
        return;
    }
    init::with_allocator(|a| unsafe { a.release_raw(ptr) });
}

/// Diagnostic snapshot; `None` after shutdown.
pub fn statistics() -> Option<Statistics> {
    init::with_allocator(|a| a.statistics())
}

/// Learning hook for external seeders.
pub fn learn(class: usize) -> Result<(), Error> {
    init::with_allocator(|a| a.learn(class)).unwrap_or(Err(Error::ShutDown))
}

/// Replay historical request sizes through routing and learning.
/// Returns how many were class-routed.
pub fn seed<I>(sizes: I) -> usize
where
    I: IntoIterator<Item = usize>,
{
    init::with_allocator(|a| a.seed(sizes)).unwrap_or(0)
}
