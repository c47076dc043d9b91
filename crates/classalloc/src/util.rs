/// Align `value` up to the next multiple of `align`.
/// `align` must be a power of two.
#[inline(always)]
pub const fn align_up(value: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    (value + align - 1) & !(align - 1)
}

/// Check if `value` is aligned to `align`.
#[inline(always)]
pub const fn is_aligned(value: usize, align: usize) -> bool {
    value & (align - 1) == 0
}

/// Every class block size must be a multiple of this, so the free-list link
/// and the allocation header stay naturally aligned inside each block.
pub const BLOCK_ALIGN: usize = 8;

/// Default class table.
pub const DEFAULT_CLASS_SIZES: [usize; 6] = [32, 64, 128, 256, 512, 1024];

/// Blocks carved out of the first region of each pool.
pub const DEFAULT_INITIAL_BLOCKS: usize = 8192;

/// Blocks added by each growth step once a pool runs dry.
pub const DEFAULT_GROWTH_BLOCKS: usize = 1024;

/// Upper bound on the number of classes; indices must stay clear of the
/// large-object sentinel stored in the header.
pub const MAX_CLASSES: usize = 64;
