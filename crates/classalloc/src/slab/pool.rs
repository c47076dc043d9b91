//! Intrusive free-list pool of fixed-size blocks.
//!
//! All raw-pointer aliasing in the crate that touches block storage lives
//! here: while a block is free, its first word is the link to the next free
//! block; once handed out, the caller owns every byte of it.
//!
//! Regions are mapped on creation and on every exhaustion, and are never
//! returned to the OS while the pool is alive. A pool under sustained demand
//! therefore grows without bound; that is the price of never scanning.

use crate::config::ClassConfig;
use crate::error::ConfigError;
use crate::platform;
use crate::util::align_up;
use core::ptr::{self, NonNull};

/// Overlay on a free block.
#[repr(C)]
struct FreeBlock {
    next: *mut FreeBlock,
}

/// One contiguous mapped extent.
struct Region {
    base: NonNull<u8>,
    mapped_len: usize,
    block_bytes: usize,
}

impl Region {
    #[inline]
    fn contains(&self, addr: usize) -> bool {
        let start = self.base.as_ptr() as usize;
        addr >= start && addr < start + self.block_bytes
    }
}

pub struct FreeListPool {
    block_size: usize,
    growth_blocks: usize,
    head: *mut FreeBlock,
    free_blocks: usize,
    capacity_blocks: usize,
    regions: Vec<Region>,
}

// The pool exclusively owns its regions and every free block in them.
unsafe impl Send for FreeListPool {}

impl FreeListPool {
    /// Create a pool with one region of `initial_blocks` blocks.
    ///
    /// The geometry is checked with the same rules as a class table entry:
    /// a block must hold the free-list link and be block-aligned, and both
    /// counts must be non-zero. Aborts the process if the region cannot be
    /// mapped.
    pub fn new(
        block_size: usize,
        initial_blocks: usize,
        growth_blocks: usize,
    ) -> Result<Self, ConfigError> {
        ClassConfig {
            block_size,
            initial_blocks,
            growth_blocks,
        }
        .validate(0)?;
        debug_assert!(block_size >= core::mem::size_of::<FreeBlock>());
        debug_assert!(block_size % core::mem::align_of::<FreeBlock>() == 0);

        let mut pool = FreeListPool {
            block_size,
            growth_blocks,
            head: ptr::null_mut(),
            free_blocks: 0,
            capacity_blocks: 0,
            regions: Vec::new(),
        };
        pool.add_region(initial_blocks);
        Ok(pool)
    }

    /// Pop a free block, growing first if the list is empty.
    #[inline]
    pub fn acquire(&mut self) -> NonNull<u8> {
        if self.head.is_null() {
            self.grow();
        }
        let block = self.head;
        // SAFETY: head is non-null after growth and points at a free block
        // inside one of our regions.
        unsafe {
            self.head = (*block).next;
            self.free_blocks -= 1;
            NonNull::new_unchecked(block as *mut u8)
        }
    }

    /// Push a block back onto the free list.
    ///
    /// # Safety
    /// `block` must have come from `acquire` on this pool and must not be
    /// released twice. The pool does not check either condition in release
    /// builds.
    #[inline]
    pub unsafe fn release(&mut self, block: NonNull<u8>) {
        debug_assert!(self.owns(block.as_ptr()), "block not owned by this pool");
        debug_assert!(self.free_blocks < self.capacity_blocks, "pool over-released");
        let node = block.as_ptr() as *mut FreeBlock;
        ptr::write(node, FreeBlock { next: self.head });
        self.head = node;
        self.free_blocks += 1;
    }

    #[cold]
    #[inline(never)]
    fn grow(&mut self) {
        self.add_region(self.growth_blocks);
        tracing::debug!(
            block_size = self.block_size,
            added = self.growth_blocks,
            capacity = self.capacity_blocks,
            regions = self.regions.len(),
            "free-list pool grew"
        );
    }

    /// Map a region of `count` blocks and prepend all of them to the list.
    fn add_region(&mut self, count: usize) {
        let block_bytes = match self.block_size.checked_mul(count) {
            Some(bytes) => bytes,
            None => platform::abort_with_message("classalloc: pool region size overflows\n"),
        };
        let mapped_len = align_up(block_bytes, platform::page_size());
        // SAFETY: mapped_len is page-aligned and non-zero.
        let base = unsafe { platform::map_anonymous(mapped_len) };
        let base = match NonNull::new(base) {
            Some(base) => base,
            None => platform::abort_with_message("classalloc: failed to map pool region\n"),
        };

        // Thread back to front so the list hands out ascending addresses.
        let mut head = self.head;
        for i in (0..count).rev() {
            // SAFETY: i * block_size < block_bytes <= mapped_len, and every
            // block start is aligned for FreeBlock.
            unsafe {
                let node = base.as_ptr().add(i * self.block_size) as *mut FreeBlock;
                ptr::write(node, FreeBlock { next: head });
                head = node;
            }
        }
        self.head = head;
        self.free_blocks += count;
        self.capacity_blocks += count;
        self.regions.push(Region {
            base,
            mapped_len,
            block_bytes,
        });
    }

    /// Whether `ptr` is the start of a block in one of this pool's regions.
    /// Linear in the number of regions; meant for debug checks and tests.
    pub fn owns(&self, ptr: *const u8) -> bool {
        let addr = ptr as usize;
        self.regions.iter().any(|r| {
            r.contains(addr) && (addr - r.base.as_ptr() as usize) % self.block_size == 0
        })
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub fn growth_blocks(&self) -> usize {
        self.growth_blocks
    }

    /// Blocks currently on the free list.
    #[inline]
    pub fn free_blocks(&self) -> usize {
        self.free_blocks
    }

    /// Blocks across all regions, free or handed out.
    #[inline]
    pub fn capacity_blocks(&self) -> usize {
        self.capacity_blocks
    }

    #[inline]
    pub fn in_use(&self) -> usize {
        self.capacity_blocks - self.free_blocks
    }

    #[inline]
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}

impl Drop for FreeListPool {
    fn drop(&mut self) {
        for region in self.regions.drain(..) {
            // SAFETY: each region was mapped by add_region with this length.
            unsafe { platform::unmap(region.base.as_ptr(), region.mapped_len) };
        }
        self.head = ptr::null_mut();
    }
}
