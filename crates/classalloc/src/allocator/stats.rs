use crate::large::LargeStats;
use crate::slab::size_class::RouteCounters;
use crate::slab::FreeListPool;

/// Snapshot of one class pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub block_size: usize,
    pub free_blocks: usize,
    pub capacity_blocks: usize,
    pub in_use: usize,
    pub regions: usize,
    pub growth_blocks: usize,
}

impl PoolStats {
    pub(crate) fn of(pool: &FreeListPool) -> Self {
        PoolStats {
            block_size: pool.block_size(),
            free_blocks: pool.free_blocks(),
            capacity_blocks: pool.capacity_blocks(),
            in_use: pool.in_use(),
            regions: pool.region_count(),
            growth_blocks: pool.growth_blocks(),
        }
    }
}

/// Diagnostic snapshot of a whole allocator. Taking one has no side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statistics {
    /// Class block sizes, ascending.
    pub pool_sizes: Vec<usize>,
    pub pools: Vec<PoolStats>,
    /// `(class, hits)` in class order.
    pub predictor: Vec<(usize, u64)>,
    pub hot_class: usize,
    pub routes: RouteCounters,
    pub large: LargeStats,
}

impl Statistics {
    /// Total class-routed hits recorded by the predictor.
    pub fn total_hits(&self) -> u64 {
        self.predictor.iter().map(|&(_, n)| n).sum()
    }

    /// Free-block count of every pool, in class order.
    pub fn free_blocks(&self) -> Vec<usize> {
        self.pools.iter().map(|p| p.free_blocks).collect()
    }
}
