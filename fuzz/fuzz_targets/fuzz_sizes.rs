#![no_main]

use classalloc::{ClassAllocator, PoolConfig, Route, HEADER_SIZE};
use libfuzzer_sys::fuzz_target;

// Fuzz target that exercises class boundaries.
// Interprets input as a series of u32 sizes, allocates each, checks that the
// routed class can hold the payload plus header, writes the full extent,
// and releases.

fuzz_target!(|data: &[u8]| {
    let mut a = match ClassAllocator::new(
        PoolConfig::default()
            .with_initial_blocks(4)
            .with_growth_blocks(4),
    ) {
        Ok(a) => a,
        Err(_) => return,
    };

    let mut i = 0;
    while i + 4 <= data.len() {
        let raw_size = u32::from_le_bytes([data[i], data[i + 1], data[i + 2], data[i + 3]]);
        i += 4;

        // Cap size to prevent OOM
        let size = (raw_size as usize) % (256 * 1024);

        let block = match a.allocate(size) {
            Some(block) => block,
            None => continue, // large-object OOM is a reported failure
        };

        match block.route() {
            Route::Class(c) => {
                assert!(
                    size + HEADER_SIZE <= a.table().block_size(c),
                    "size {} routed to class {} ({} bytes)",
                    size,
                    c,
                    a.table().block_size(c)
                );
                if size == 0 {
                    assert_eq!(c, 0);
                }
            }
            Route::Large => assert!(size > a.table().max_payload()),
        }

        unsafe {
            std::ptr::write_bytes(block.as_ptr(), 0xBB, size);
            for j in 0..size {
                assert_eq!(*block.as_ptr().add(j), 0xBB);
            }
            a.release(block);
        }
    }
});
