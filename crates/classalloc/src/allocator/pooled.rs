use crate::allocator::header::{BlockHeader, HEADER_MAGIC, HEADER_SIZE, LARGE_OBJECT};
use crate::allocator::stats::{PoolStats, Statistics};
use crate::config::PoolConfig;
use crate::error::{ConfigError, Error};
use crate::large::{LargeAllocator, LargeStats};
use crate::predictor::HotClassPredictor;
use crate::slab::size_class::{ClassTable, Route, RouteCounters};
use crate::slab::FreeListPool;
use core::ptr::{self, NonNull};

/// A payload handed out by [`ClassAllocator::allocate`].
///
/// The payload is uninitialized and `size` bytes long. It stays valid until
/// it is passed back to `release` on the allocator that produced it, or that
/// allocator is dropped.
#[must_use = "dropping an Allocation leaks its block"]
#[derive(Debug, PartialEq, Eq)]
pub struct Allocation {
    payload: NonNull<u8>,
    size: usize,
    class: u32,
}

impl Allocation {
    #[inline]
    pub fn as_ptr(&self) -> *mut u8 {
        self.payload.as_ptr()
    }

    #[inline]
    pub fn as_non_null(&self) -> NonNull<u8> {
        self.payload
    }

    /// Requested payload size.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Which pool (or the large-object path) owns the block.
    #[inline]
    pub fn route(&self) -> Route {
        if self.class == LARGE_OBJECT {
            Route::Large
        } else {
            Route::Class(self.class as usize)
        }
    }

    /// Give up the handle, leaving only the raw payload pointer. Pass it to
    /// [`ClassAllocator::release_raw`] to free it.
    #[inline]
    pub fn into_raw(self) -> *mut u8 {
        self.payload.as_ptr()
    }

    /// Rebuild a handle from a raw payload pointer.
    ///
    /// # Safety
    /// `ptr` must be null or a live payload from `allocate`/`allocate_raw`,
    /// and `size` must not exceed what was requested for it.
    pub unsafe fn from_raw(ptr: *mut u8, size: usize) -> Option<Self> {
        let payload = NonNull::new(ptr)?;
        let (_, header) = BlockHeader::read(payload);
        Some(Allocation {
            payload,
            size,
            class: header.class,
        })
    }
}

/// Segregated size-class allocator.
///
/// An instance is not internally synchronized; wrap it in a lock to share
/// it (see the `init` module for the process-wide instance).
pub struct ClassAllocator {
    table: ClassTable,
    pools: Box<[FreeListPool]>,
    predictor: HotClassPredictor,
    routes: RouteCounters,
    large: LargeAllocator,
}

impl ClassAllocator {
    /// Validate `config` and map the initial region of every pool.
    ///
    /// A misconfigured class table is an error; failing to map a region is
    /// fatal and aborts.
    pub fn new(config: PoolConfig) -> Result<Self, Error> {
        let table = ClassTable::new(&config)?;
        let pools: Box<[FreeListPool]> = config
            .classes()
            .iter()
            .map(|c| FreeListPool::new(c.block_size, c.initial_blocks, c.growth_blocks))
            .collect::<Result<_, ConfigError>>()?;
        tracing::info!(
            classes = ?table.sizes(),
            initial_blocks = ?config.classes().iter().map(|c| c.initial_blocks).collect::<Vec<_>>(),
            "class allocator ready"
        );
        Ok(ClassAllocator {
            predictor: HotClassPredictor::new(table.len()),
            table,
            pools,
            routes: RouteCounters::default(),
            large: LargeAllocator::new(),
        })
    }

    pub fn table(&self) -> &ClassTable {
        &self.table
    }

    pub fn predictor(&self) -> &HotClassPredictor {
        &self.predictor
    }

    pub fn route_counters(&self) -> RouteCounters {
        self.routes
    }

    pub fn pool(&self, class: usize) -> &FreeListPool {
        &self.pools[class]
    }

    pub fn large_stats(&self) -> LargeStats {
        self.large.stats()
    }

    /// Pick the class that should service a `size`-byte payload. Updates the
    /// route counters but does not train the predictor.
    #[inline]
    pub fn route_class(&mut self, size: usize) -> Route {
        if size == 0 {
            self.routes.fast_hits += 1;
            return Route::Class(0);
        }
        self.table
            .route(size, self.predictor.current_hot_index(), &mut self.routes)
    }

    #[inline]
    fn route_and_learn(&mut self, size: usize) -> Route {
        let route = self.route_class(size);
        if let Route::Class(class) = route {
            self.predictor.learn(class);
        }
        route
    }

    /// Allocate `size` bytes.
    ///
    /// Class-routed requests always succeed (or abort if a pool cannot grow).
    /// `None` means the system allocator refused a large object.
    #[inline]
    pub fn allocate(&mut self, size: usize) -> Option<Allocation> {
        match self.route_and_learn(size) {
            Route::Class(class) => {
                let block = self.pools[class].acquire();
                // SAFETY: pool blocks are at least HEADER_SIZE bytes and
                // BLOCK_ALIGN-aligned.
                let payload = unsafe { BlockHeader::for_class(class).stamp(block) };
                Some(Allocation {
                    payload,
                    size,
                    class: class as u32,
                })
            }
            Route::Large => self.allocate_large(size),
        }
    }

    #[cold]
    fn allocate_large(&mut self, size: usize) -> Option<Allocation> {
        let block = self.large.alloc(size)?;
        // SAFETY: the block holds size + HEADER_SIZE bytes and malloc
        // alignment covers BlockHeader.
        let payload = unsafe { BlockHeader::large().stamp(block) };
        Some(Allocation {
            payload,
            size,
            class: LARGE_OBJECT,
        })
    }

    /// C-style entry point: null on large-object exhaustion.
    #[inline]
    pub fn allocate_raw(&mut self, size: usize) -> *mut u8 {
        match self.allocate(size) {
            Some(allocation) => allocation.into_raw(),
            None => ptr::null_mut(),
        }
    }

    /// Return an allocation to its pool or to the system allocator.
    ///
    /// # Safety
    /// `allocation` must have been produced by this allocator.
    #[inline]
    pub unsafe fn release(&mut self, allocation: Allocation) {
        debug_assert_eq!(
            BlockHeader::read(allocation.payload).1.class,
            allocation.class,
            "allocation header disagrees with its handle"
        );
        let block = NonNull::new_unchecked(allocation.payload.as_ptr().sub(HEADER_SIZE));
        match allocation.route() {
            Route::Class(class) => self.pools[class].release(block),
            Route::Large => self.large.free(block),
        }
    }

    /// C-style release. Null is ignored.
    ///
    /// # Safety
    /// `ptr` must be null or a payload returned by this allocator that has
    /// not been released yet. Foreign pointers and double releases are not
    /// detected in release builds.
    #[inline]
    pub unsafe fn release_raw(&mut self, ptr: *mut u8) {
        let Some(payload) = NonNull::new(ptr) else {
            return;
        };
        let (block, header) = BlockHeader::read(payload);
        debug_assert_eq!(
            header.reserved, HEADER_MAGIC,
            "release of a foreign or already released pointer"
        );
        match header.route(self.pools.len()) {
            Some(Route::Class(class)) => self.pools[class].release(block),
            Some(Route::Large) => self.large.free(block),
            None => debug_assert!(false, "corrupt allocation header: {:?}", header),
        }
    }

    /// Learning hook: record one hit for `class` exactly as a class-routed
    /// allocation would.
    pub fn learn(&mut self, class: usize) -> Result<(), Error> {
        if class >= self.table.len() {
            return Err(Error::UnknownClass {
                index: class,
                count: self.table.len(),
            });
        }
        self.predictor.learn(class);
        Ok(())
    }

    /// Warm the predictor by replaying historical request sizes through the
    /// same routing and learning path as `allocate`, without taking blocks.
    /// Returns how many of the sizes were class-routed.
    pub fn seed<I>(&mut self, sizes: I) -> usize
    where
        I: IntoIterator<Item = usize>,
    {
        let mut routed = 0;
        for size in sizes {
            if let Route::Class(_) = self.route_and_learn(size) {
                routed += 1;
            }
        }
        tracing::debug!(
            routed,
            hot_class = self.predictor.current_hot_index(),
            "predictor seeded"
        );
        routed
    }

    pub fn statistics(&self) -> Statistics {
        Statistics {
            pool_sizes: self.table.sizes().to_vec(),
            pools: self.pools.iter().map(PoolStats::of).collect(),
            predictor: self.predictor.snapshot(),
            hot_class: self.predictor.current_hot_index(),
            routes: self.routes,
            large: self.large.stats(),
        }
    }
}

impl Drop for ClassAllocator {
    fn drop(&mut self) {
        let outstanding: usize = self.pools.iter().map(FreeListPool::in_use).sum();
        tracing::debug!(
            outstanding,
            large_live = self.large.stats().live,
            "class allocator torn down"
        );
    }
}
