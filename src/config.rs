// config.rs - Deployment configuration for collator construction.
//
// Two knobs: how charsets resolve to base orderings, and how many ordering
// blocks the tailoring prefix carries. Both are fixed for the life of a
// context because they change sort-key bytes.

use std::env;

use crate::error::CollationError;
use crate::resolver::ResolutionStrategy;
use crate::tailoring::TailoringPrefixSize;

/// Environment variable selecting `locale` or `table` resolution.
pub const ENV_STRATEGY: &str = "FERROCOLL_STRATEGY";
/// Environment variable holding the tailoring prefix size (0..=5).
pub const ENV_TAILORING_PREFIX_SIZE: &str = "FERROCOLL_TAILORING_PREFIX_SIZE";

/// Configuration shared by every collator a context builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollationConfig {
    pub strategy: ResolutionStrategy,
    pub tailoring_prefix_size: TailoringPrefixSize,
}

impl CollationConfig {
    /// Create a [`CollationConfigBuilder`] starting from the defaults.
    pub fn builder() -> CollationConfigBuilder {
        CollationConfigBuilder::new()
    }

    /// Read overrides from the environment. Unset variables keep their
    /// defaults; unparsable values are errors.
    pub fn from_env() -> Result<CollationConfig, CollationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<CollationConfig, CollationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = CollationConfig::builder();
        if let Some(value) = lookup(ENV_STRATEGY) {
            builder = builder.strategy(value.parse()?);
        }
        if let Some(value) = lookup(ENV_TAILORING_PREFIX_SIZE) {
            let size = value
                .trim()
                .parse::<u8>()
                .map_err(|_| CollationError::InvalidConfig {
                    key: ENV_TAILORING_PREFIX_SIZE.to_string(),
                    value: value.clone(),
                })?;
            builder = builder.tailoring_prefix_size(size);
        }
        builder.build()
    }
}

/// Builder for [`CollationConfig`].
///
/// # Examples
///
/// ```
/// use ferrocoll::config::CollationConfig;
/// use ferrocoll::resolver::ResolutionStrategy;
///
/// let config = CollationConfig::builder()
///     .strategy(ResolutionStrategy::Locale)
///     .tailoring_prefix_size(2)
///     .build()
///     .unwrap();
/// assert_eq!(config.tailoring_prefix_size.get(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct CollationConfigBuilder {
    strategy: ResolutionStrategy,
    tailoring_prefix_size: u8,
}

impl CollationConfigBuilder {
    pub fn new() -> Self {
        let defaults = CollationConfig::default();
        CollationConfigBuilder {
            strategy: defaults.strategy,
            tailoring_prefix_size: defaults.tailoring_prefix_size.get(),
        }
    }

    pub fn strategy(mut self, strategy: ResolutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Number of ordering blocks in the tailoring prefix, validated by `build`.
    pub fn tailoring_prefix_size(mut self, size: u8) -> Self {
        self.tailoring_prefix_size = size;
        self
    }

    pub fn build(self) -> Result<CollationConfig, CollationError> {
        Ok(CollationConfig {
            strategy: self.strategy,
            tailoring_prefix_size: TailoringPrefixSize::new(self.tailoring_prefix_size)?,
        })
    }
}

impl Default for CollationConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
