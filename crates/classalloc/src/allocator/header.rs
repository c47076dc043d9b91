//! The fixed-layout record stamped in front of every payload.

use crate::slab::size_class::Route;
use core::ptr::{self, NonNull};

/// Prefix of every block handed to a caller.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Owning class index, or [`LARGE_OBJECT`].
    pub class: u32,
    pub reserved: u32,
}

/// Bytes between the start of a block and the payload.
pub const HEADER_SIZE: usize = core::mem::size_of::<BlockHeader>();

/// Class value marking a block that came from the system allocator.
pub const LARGE_OBJECT: u32 = 0xFFFF;

/// Stored in `reserved` while a block is live. A released pool block has
/// its first word overwritten by the free-list link, which clobbers this.
pub(crate) const HEADER_MAGIC: u32 = 0xC1A5_5A11;

const _: () = assert!(HEADER_SIZE == 8);
const _: () = assert!(crate::util::MAX_CLASSES < LARGE_OBJECT as usize);

impl BlockHeader {
    #[inline]
    pub const fn for_class(index: usize) -> Self {
        BlockHeader {
            class: index as u32,
            reserved: HEADER_MAGIC,
        }
    }

    #[inline]
    pub const fn large() -> Self {
        BlockHeader {
            class: LARGE_OBJECT,
            reserved: HEADER_MAGIC,
        }
    }

    #[inline]
    pub fn is_large(&self) -> bool {
        self.class == LARGE_OBJECT
    }

    /// Interpret the header against a table of `classes` classes.
    /// Returns `None` for content no allocator would have written.
    #[inline]
    pub fn route(&self, classes: usize) -> Option<Route> {
        if (self.class as usize) < classes {
            Some(Route::Class(self.class as usize))
        } else if self.class == LARGE_OBJECT {
            Some(Route::Large)
        } else {
            None
        }
    }

    /// Write the header at `block` and return the payload address.
    ///
    /// # Safety
    /// `block` must be valid for writes of at least `HEADER_SIZE` bytes and
    /// aligned for `BlockHeader`.
    #[inline]
    pub(crate) unsafe fn stamp(self, block: NonNull<u8>) -> NonNull<u8> {
        ptr::write(block.as_ptr() as *mut BlockHeader, self);
        NonNull::new_unchecked(block.as_ptr().add(HEADER_SIZE))
    }

    /// Recover the block start and header from a payload address.
    ///
    /// # Safety
    /// `payload` must have been produced by `stamp`.
    #[inline]
    pub(crate) unsafe fn read(payload: NonNull<u8>) -> (NonNull<u8>, BlockHeader) {
        let block = payload.as_ptr().sub(HEADER_SIZE);
        let header = ptr::read(block as *const BlockHeader);
        (NonNull::new_unchecked(block), header)
    }
}
