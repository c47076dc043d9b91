//! Error types for allocator configuration and the learning hook.
//!
//! Allocation itself never returns these: a class-routed allocation either
//! succeeds or aborts, and a failed large-object allocation is reported as
//! `None` / null.

use thiserror::Error;

/// Rejected class-table or block-count configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No classes were configured.
    #[error("class table is empty")]
    Empty,

    /// More classes than the header can encode.
    #[error("{count} classes configured, at most {max} supported")]
    TooManyClasses { count: usize, max: usize },

    /// Classes must be strictly ascending (no duplicates).
    #[error("class {index} ({size} bytes) does not exceed class {prev_index} ({prev_size} bytes)")]
    NotAscending {
        index: usize,
        size: usize,
        prev_index: usize,
        prev_size: usize,
    },

    /// A block must hold at least the allocation header.
    #[error("class {index} block size {size} is below the {min}-byte minimum")]
    BlockTooSmall { index: usize, size: usize, min: usize },

    /// Block size is not a multiple of the block alignment.
    #[error("class {index} block size {size} is not a multiple of {align}")]
    Misaligned { index: usize, size: usize, align: usize },

    /// Initial or growth block count of zero.
    #[error("class {index} has a zero {which} block count")]
    ZeroBlockCount { index: usize, which: &'static str },
}

/// Errors surfaced by the allocator facade.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The learning hook was handed a class index outside the table.
    #[error("class index {index} out of range for {count} classes")]
    UnknownClass { index: usize, count: usize },

    /// The process-wide allocator was explicitly shut down.
    #[error("allocator has been shut down")]
    ShutDown,
}
