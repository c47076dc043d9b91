//! Region memory and process-abort primitives.
//!
//! Pool regions come straight from the OS so that the allocator never
//! recurses into whatever global allocator the host program uses.

#[cfg(unix)]
pub mod unix;
#[cfg(unix)]
pub use unix as sys;

#[cfg(not(unix))]
pub mod fallback;
#[cfg(not(unix))]
pub use fallback as sys;

use core::sync::atomic::{AtomicUsize, Ordering};

/// Cached page size; zero until first queried.
static PAGE_SIZE_CACHED: AtomicUsize = AtomicUsize::new(0);

/// Map anonymous read-write memory. Returns null on failure.
///
/// # Safety
/// Caller must ensure `size` is page-aligned and non-zero.
#[inline]
pub unsafe fn map_anonymous(size: usize) -> *mut u8 {
    sys::map_anonymous(size)
}

/// Unmap previously mapped memory.
///
/// # Safety
/// `ptr` must have been returned by `map_anonymous` and `size` must match.
#[inline]
pub unsafe fn unmap(ptr: *mut u8, size: usize) {
    sys::unmap(ptr, size);
}

/// System page size, queried once and cached.
#[inline]
pub fn page_size() -> usize {
    let cached = PAGE_SIZE_CACHED.load(Ordering::Relaxed);
    if cached != 0 {
        return cached;
    }
    let ps = sys::query_page_size();
    PAGE_SIZE_CACHED.store(ps, Ordering::Relaxed);
    ps
}

/// Abort the process with a diagnostic message.
/// Used when the allocator cannot obtain storage for its own pools.
#[cold]
#[inline(never)]
pub fn abort_with_message(msg: &str) -> ! {
    tracing::error!(reason = msg, "classalloc: aborting");
    sys::write_stderr(msg);
    std::process::abort()
}
