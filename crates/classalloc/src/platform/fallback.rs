use std::alloc::{alloc, dealloc, Layout};
use std::io::Write;

const PAGE: usize = 4096;

/// Allocate a page-aligned region from the Rust global allocator.
///
/// # Safety
/// `size` must be page-aligned and non-zero.
pub unsafe fn map_anonymous(size: usize) -> *mut u8 {
    match Layout::from_size_align(size, PAGE) {
        Ok(layout) => alloc(layout),
        Err(_) => core::ptr::null_mut(),
    }
}

/// # Safety
/// `ptr` must have been returned by `map_anonymous` with the same `size`.
pub unsafe fn unmap(ptr: *mut u8, size: usize) {
    dealloc(ptr, Layout::from_size_align_unchecked(size, PAGE));
}

pub fn query_page_size() -> usize {
    PAGE
}

pub fn write_stderr(msg: &str) {
    let _ = std::io::stderr().write_all(msg.as_bytes());
}
