pub mod header;
pub mod pooled;
pub mod stats;

pub use pooled::{Allocation, ClassAllocator};
pub use stats::{PoolStats, Statistics};
