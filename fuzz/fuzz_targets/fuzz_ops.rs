#![no_main]

use classalloc::{Allocation, ClassAllocator, PoolConfig, Route};
use libfuzzer_sys::fuzz_target;

/// Fuzz target that interprets a byte slice as a sequence of allocator operations.
///
/// Each operation is encoded as:
///   byte 0: opcode (0=allocate, 1=release, 2=learn, 3=seed)
///   byte 1-2: size (little-endian u16)
///   byte 3: slot index (which tracked allocation to operate on)
///
/// We track up to 64 live allocations.
const MAX_SLOTS: usize = 64;

fuzz_target!(|data: &[u8]| {
    let mut a = match ClassAllocator::new(
        PoolConfig::default()
            .with_initial_blocks(8)
            .with_growth_blocks(8),
    ) {
        Ok(a) => a,
        Err(_) => return,
    };
    let mut slots: Vec<Option<(Allocation, u8)>> = (0..MAX_SLOTS).map(|_| None).collect();

    let mut i = 0;
    while i + 4 <= data.len() {
        let opcode = data[i] & 0x03;
        let size = u16::from_le_bytes([data[i + 1], data[i + 2]]) as usize;
        let slot = (data[i + 3] as usize) % MAX_SLOTS;
        i += 4;

        match opcode {
            0 => {
                if let Some((old, _)) = slots[slot].take() {
                    unsafe { a.release(old) };
                }
                let block = a.allocate(size).expect("u16 sizes always fit in memory");
                let fill = data[i - 1];
                unsafe { std::ptr::write_bytes(block.as_ptr(), fill, size) };
                slots[slot] = Some((block, fill));
            }
            1 => {
                if let Some((block, fill)) = slots[slot].take() {
                    for j in 0..block.size() {
                        assert_eq!(unsafe { *block.as_ptr().add(j) }, fill, "payload corrupted");
                    }
                    unsafe { a.release(block) };
                }
            }
            2 => {
                let _ = a.learn(size % (a.table().len() + 1));
            }
            3 => {
                a.seed([size, size / 3, size / 7]);
            }
            _ => unreachable!(),
        }

        let stats = a.statistics();
        for (c, pool) in stats.pools.iter().enumerate() {
            let held = slots
                .iter()
                .flatten()
                .filter(|(block, _)| block.route() == Route::Class(c))
                .count();
            assert_eq!(pool.in_use, held, "class {} accounting drifted", c);
        }
        let held_large = slots
            .iter()
            .flatten()
            .filter(|(block, _)| block.route() == Route::Large)
            .count();
        assert_eq!(stats.large.live, held_large as u64);
    }

    // Cleanup
    for entry in slots.iter_mut() {
        if let Some((block, _)) = entry.take() {
            unsafe { a.release(block) };
        }
    }
    let stats = a.statistics();
    assert!(stats.pools.iter().all(|p| p.in_use == 0));
    assert_eq!(stats.large.live, 0);
});
