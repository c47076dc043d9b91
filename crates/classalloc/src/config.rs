use crate::allocator::header::HEADER_SIZE;
use crate::error::ConfigError;
use crate::util::{
    is_aligned, BLOCK_ALIGN, DEFAULT_CLASS_SIZES, DEFAULT_GROWTH_BLOCKS, DEFAULT_INITIAL_BLOCKS,
    MAX_CLASSES,
};

const ENV_CLASS_SIZES: &str = "CLASSALLOC_CLASS_SIZES";
const ENV_INITIAL_BLOCKS: &str = "CLASSALLOC_INITIAL_BLOCKS";
const ENV_GROWTH_BLOCKS: &str = "CLASSALLOC_GROWTH_BLOCKS";

/// One size class: its block size and how its pool is provisioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassConfig {
    pub block_size: usize,
    /// Blocks in the region mapped when the pool is created.
    pub initial_blocks: usize,
    /// Blocks in each region mapped when the pool runs dry.
    pub growth_blocks: usize,
}

impl ClassConfig {
    pub const fn new(block_size: usize) -> Self {
        ClassConfig {
            block_size,
            initial_blocks: DEFAULT_INITIAL_BLOCKS,
            growth_blocks: DEFAULT_GROWTH_BLOCKS,
        }
    }

    /// Check one class in isolation; `index` only labels the error.
    ///
    /// A block must hold both the header and the free-list link, be
    /// block-aligned, and both counts must be non-zero.
    pub fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let min = HEADER_SIZE.max(core::mem::size_of::<*mut u8>());
        if self.block_size < min {
            return Err(ConfigError::BlockTooSmall {
                index,
                size: self.block_size,
                min,
            });
        }
        if !is_aligned(self.block_size, BLOCK_ALIGN) {
            return Err(ConfigError::Misaligned {
                index,
                size: self.block_size,
                align: BLOCK_ALIGN,
            });
        }
        if self.initial_blocks == 0 {
            return Err(ConfigError::ZeroBlockCount { index, which: "initial" });
        }
        if self.growth_blocks == 0 {
            return Err(ConfigError::ZeroBlockCount { index, which: "growth" });
        }
        Ok(())
    }
}

/// Allocator configuration, fixed once the allocator is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    classes: Vec<ClassConfig>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            classes: DEFAULT_CLASS_SIZES.iter().map(|&s| ClassConfig::new(s)).collect(),
        }
    }
}

impl PoolConfig {
    /// Build from explicit per-class settings. The table is validated here.
    pub fn new(classes: Vec<ClassConfig>) -> Result<Self, ConfigError> {
        let config = PoolConfig { classes };
        config.validate()?;
        Ok(config)
    }

    /// Every class gets the same initial and growth block counts.
    pub fn uniform(
        sizes: &[usize],
        initial_blocks: usize,
        growth_blocks: usize,
    ) -> Result<Self, ConfigError> {
        Self::new(
            sizes
                .iter()
                .map(|&block_size| ClassConfig {
                    block_size,
                    initial_blocks,
                    growth_blocks,
                })
                .collect(),
        )
    }

    /// Override the initial block count of every class.
    pub fn with_initial_blocks(mut self, blocks: usize) -> Self {
        for class in &mut self.classes {
            class.initial_blocks = blocks;
        }
        self
    }

    /// Override the growth block count of every class.
    pub fn with_growth_blocks(mut self, blocks: usize) -> Self {
        for class in &mut self.classes {
            class.growth_blocks = blocks;
        }
        self
    }

    pub fn classes(&self) -> &[ClassConfig] {
        &self.classes
    }

    pub fn class_sizes(&self) -> Vec<usize> {
        self.classes.iter().map(|c| c.block_size).collect()
    }

    /// Check the class-table contract: non-empty, strictly ascending, every
    /// block large enough for the header and block-aligned, non-zero counts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.classes.is_empty() {
            return Err(ConfigError::Empty);
        }
        if self.classes.len() > MAX_CLASSES {
            return Err(ConfigError::TooManyClasses {
                count: self.classes.len(),
                max: MAX_CLASSES,
            });
        }
        for (index, class) in self.classes.iter().enumerate() {
            class.validate(index)?;
            if index > 0 {
                let prev = &self.classes[index - 1];
                if class.block_size <= prev.block_size {
                    return Err(ConfigError::NotAscending {
                        index,
                        size: class.block_size,
                        prev_index: index - 1,
                        prev_size: prev.block_size,
                    });
                }
            }
        }
        Ok(())
    }

    /// Default configuration with environment overrides applied.
    ///
    /// Malformed or rejected overrides are logged and skipped, so the result
    /// is always a valid configuration.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = PoolConfig::default();

        if let Some(raw) = lookup(ENV_CLASS_SIZES) {
            match parse_size_list(&raw) {
                Some(sizes) => match PoolConfig::uniform(
                    &sizes,
                    DEFAULT_INITIAL_BLOCKS,
                    DEFAULT_GROWTH_BLOCKS,
                ) {
                    Ok(parsed) => config = parsed,
                    Err(err) => {
                        tracing::warn!(key = ENV_CLASS_SIZES, value = %raw, %err, "ignoring class table override")
                    }
                },
                None => {
                    tracing::warn!(key = ENV_CLASS_SIZES, value = %raw, "malformed class table override")
                }
            }
        }

        if let Some(blocks) = lookup_count(&lookup, ENV_INITIAL_BLOCKS) {
            config = config.with_initial_blocks(blocks);
        }
        if let Some(blocks) = lookup_count(&lookup, ENV_GROWTH_BLOCKS) {
            config = config.with_growth_blocks(blocks);
        }
        config
    }
}

/// Read a non-zero block count from the environment.
fn lookup_count<F>(lookup: &F, key: &str) -> Option<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            tracing::warn!(key, value = %raw, "ignoring block count override");
            None
        }
    }
}

fn parse_size_list(raw: &str) -> Option<Vec<usize>> {
    raw.split(',')
        .map(|part| part.trim().parse::<usize>().ok())
        .collect()
}
