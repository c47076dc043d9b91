//! Large-object fallback: requests no class can hold go to the system
//! allocator. Blocks still carry the allocation header, so release
//! recognises them without a lookup table.

use crate::allocator::header::HEADER_SIZE;
use core::ptr::NonNull;

/// Large-object accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LargeStats {
    /// Successful system allocations.
    pub allocations: u64,
    pub releases: u64,
    /// System allocations that returned null.
    pub failures: u64,
    /// Blocks currently outstanding.
    pub live: u64,
}

#[derive(Debug, Default)]
pub struct LargeAllocator {
    stats: LargeStats,
}

impl LargeAllocator {
    pub const fn new() -> Self {
        LargeAllocator {
            stats: LargeStats {
                allocations: 0,
                releases: 0,
                failures: 0,
                live: 0,
            },
        }
    }

    /// Obtain room for a `payload`-byte object plus its header from the
    /// system allocator. Returns the block start, or `None` if the system is
    /// out of memory.
    pub fn alloc(&mut self, payload: usize) -> Option<NonNull<u8>> {
        let total = payload.checked_add(HEADER_SIZE).unwrap_or(usize::MAX);
        // SAFETY: malloc accepts any size; null is handled below.
        let raw = unsafe { libc::malloc(total) } as *mut u8;
        match NonNull::new(raw) {
            Some(block) => {
                self.stats.allocations += 1;
                self.stats.live += 1;
                tracing::trace!(bytes = total, "large-object allocation");
                Some(block)
            }
            None => {
                self.stats.failures += 1;
                tracing::warn!(bytes = total, "system allocator refused large object");
                None
            }
        }
    }

    /// Return a block to the system allocator.
    ///
    /// # Safety
    /// `block` must have come from `alloc` and not been freed since.
    pub unsafe fn free(&mut self, block: NonNull<u8>) {
        debug_assert!(self.stats.live > 0, "large-object release without allocation");
        libc::free(block.as_ptr() as *mut libc::c_void);
        self.stats.releases += 1;
        self.stats.live = self.stats.live.saturating_sub(1);
    }

    pub fn stats(&self) -> LargeStats {
        self.stats
    }
}
