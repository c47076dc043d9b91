//! Fixed-size-class pool allocator with an adaptive hot-class routing hint.
//!
//! Requests are routed to one of a small number of size classes, each backed
//! by an intrusive free-list pool. Requests too large for every class fall
//! through to the system allocator. Every returned block carries a small
//! header so that release can find its way back to the owning pool.
//!
//! ```
//! use classalloc::{ClassAllocator, PoolConfig, Route};
//!
//! # fn main() -> Result<(), classalloc::Error> {
//! let config = PoolConfig::default().with_initial_blocks(64);
//! let mut alloc = ClassAllocator::new(config)?;
//! let block = alloc.allocate(40).expect("class-routed allocation");
//! assert_eq!(block.route(), Route::Class(1));
//! // SAFETY: `block` came from `alloc` and is released once.
//! unsafe { alloc.release(block) };
//! # Ok(())
//! # }
//! ```

pub mod allocator;
#[cfg(feature = "global")]
pub mod api;
pub mod config;
pub mod error;
#[cfg(feature = "global")]
pub mod init;
pub mod large;
pub mod platform;
pub mod predictor;
pub mod slab;
pub mod util;

pub use allocator::header::{BlockHeader, HEADER_SIZE, LARGE_OBJECT};
pub use allocator::{Allocation, ClassAllocator, PoolStats, Statistics};
pub use config::{ClassConfig, PoolConfig};
pub use error::{ConfigError, Error};
pub use large::LargeStats;
pub use predictor::HotClassPredictor;
pub use slab::size_class::{ClassTable, Route, RouteCounters};
pub use slab::FreeListPool;
