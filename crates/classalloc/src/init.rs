//! The process-wide allocator instance.
//!
//! State moves one way: `UNINIT` to `READY` on the first call to any entry
//! point, and `READY` to `SHUT_DOWN` only through an explicit [`shutdown`].
//! A single lock guards the instance, which is the whole synchronization
//! story for multi-threaded callers of the `api` functions.

use crate::allocator::ClassAllocator;
use crate::config::PoolConfig;
use crate::error::Error;
use crate::platform;
use core::sync::atomic::{AtomicU8, Ordering};
use parking_lot::{const_mutex, Mutex};

const UNINIT: u8 = 0;
const READY: u8 = 1;
const SHUT_DOWN: u8 = 2;

pub const STATE_UNINIT: u8 = UNINIT;
pub const STATE_READY: u8 = READY;
pub const STATE_SHUT_DOWN: u8 = SHUT_DOWN;

static INIT_STATE: AtomicU8 = AtomicU8::new(UNINIT);
static ALLOCATOR: Mutex<Option<ClassAllocator>> = const_mutex(None);

#[inline(always)]
pub fn state() -> u8 {
    INIT_STATE.load(Ordering::Acquire)
}

/// Build the process-wide allocator from `config` if nobody has yet.
///
/// Returns `Ok(true)` if this call built it and `Ok(false)` if it was
/// already initialized (or shut down), in which case `config` is ignored.
pub fn initialize_with(config: PoolConfig) -> Result<bool, Error> {
    if state() != UNINIT {
        return Ok(false);
    }
    let mut slot = ALLOCATOR.lock();
    if state() != UNINIT {
        return Ok(false);
    }
    *slot = Some(ClassAllocator::new(config)?);
    INIT_STATE.store(READY, Ordering::Release);
    Ok(true)
}

/// Build the process-wide allocator from the environment-derived
/// configuration. Idempotent.
pub fn initialize() -> bool {
    match initialize_with(PoolConfig::from_env()) {
        Ok(built) => built,
        Err(err) => {
            tracing::error!(%err, "environment configuration rejected");
            platform::abort_with_message("classalloc: invalid configuration\n")
        }
    }
}

#[cold]
#[inline(never)]
pub fn ensure_initialized() {
    initialize();
}

/// Run `f` against the process-wide allocator, initializing it first if
/// needed. Returns `None` after shutdown.
#[inline]
pub fn with_allocator<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut ClassAllocator) -> R,
{
    if state() == UNINIT {
        ensure_initialized();
    }
    let mut slot = ALLOCATOR.lock();
    slot.as_mut().map(f)
}

/// Tear the process-wide allocator down, unmapping every pool region.
/// Later allocations return null and later releases are ignored.
///
/// Returns `true` if an initialized allocator was torn down.
///
/// # Safety
/// Every pointer obtained from the process-wide allocator dangles once this
/// returns.
pub unsafe fn shutdown() -> bool {
    let mut slot = ALLOCATOR.lock();
    let previous = INIT_STATE.swap(SHUT_DOWN, Ordering::AcqRel);
    drop(slot.take());
    if previous == READY {
        tracing::info!("process-wide class allocator shut down");
    }
    previous == READY
}
