use crate::allocator::header::HEADER_SIZE;
use crate::config::PoolConfig;
use crate::error::ConfigError;

/// Where a request should be serviced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Index into the class table.
    Class(usize),
    /// Too large for every class; serviced by the system allocator.
    Large,
}

/// Instrumentation for the router.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteCounters {
    /// Requests routed without scanning: the hot class when it fits, and
    /// every zero-size request, which always goes to class 0.
    pub fast_hits: u64,
    /// Requests that fell through to the ascending scan and found a class.
    pub slow_scans: u64,
    /// Requests no class could hold.
    pub large_routes: u64,
}

/// The immutable, strictly ascending table of class block sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTable {
    sizes: Box<[usize]>,
}

impl ClassTable {
    pub fn new(config: &PoolConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(ClassTable {
            sizes: config.class_sizes().into_boxed_slice(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Block size of class `index`, header included.
    #[inline]
    pub fn block_size(&self, index: usize) -> usize {
        self.sizes[index]
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn max_block_size(&self) -> usize {
        self.sizes[self.sizes.len() - 1]
    }

    /// Largest payload any class can hold.
    pub fn max_payload(&self) -> usize {
        self.max_block_size() - HEADER_SIZE
    }

    /// Smallest class whose block holds `needed` bytes.
    #[inline]
    pub fn smallest_fit(&self, needed: usize) -> Option<usize> {
        // Binary search for the first class >= needed
        let mut lo = 0usize;
        let mut hi = self.sizes.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.sizes[mid] < needed {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        if lo < self.sizes.len() {
            Some(lo)
        } else {
            None
        }
    }

    /// Route a payload of `size` bytes, trying the `hot` class first.
    ///
    /// The hot class is taken whenever it fits, even if a smaller class
    /// would also fit. `hot` comes from the predictor and is always in
    /// range; callers outside the crate go through
    /// [`ClassAllocator::route_class`](crate::ClassAllocator::route_class).
    #[inline]
    pub(crate) fn route(&self, size: usize, hot: usize, counters: &mut RouteCounters) -> Route {
        debug_assert!(hot < self.sizes.len(), "hot class {hot} out of range");
        let needed = match size.checked_add(HEADER_SIZE) {
            Some(n) => n,
            None => {
                counters.large_routes += 1;
                return Route::Large;
            }
        };

        if needed <= self.sizes[hot] {
            counters.fast_hits += 1;
            return Route::Class(hot);
        }

        self.route_slow(needed, counters)
    }

    #[cold]
    fn route_slow(&self, needed: usize, counters: &mut RouteCounters) -> Route {
        match self.smallest_fit(needed) {
            Some(index) => {
                counters.slow_scans += 1;
                Route::Class(index)
            }
            None => {
                counters.large_routes += 1;
                Route::Large
            }
        }
    }
}
