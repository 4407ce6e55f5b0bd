//! Cache configuration.
//!
//! Controls the listing cache via the `[cache]` section of `postline.toml`.

use std::num::NonZeroUsize;
use std::time::Duration;

const DEFAULT_TTL_SECONDS: u64 = 300;
const DEFAULT_CAPACITY: usize = 256;

/// Runtime cache configuration derived from validated settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// When false, listings always go to the store.
    pub enabled: bool,
    /// How long a cached listing stays fresh.
    pub ttl: Duration,
    /// Maximum keys per store before LRU eviction.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(DEFAULT_TTL_SECONDS),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            ttl: Duration::from_secs(settings.ttl_seconds.get()),
            capacity: settings.capacity.get(),
        }
    }
}

impl CacheConfig {
    /// Returns the capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.capacity).unwrap_or(NonZeroUsize::MIN)
    }
}
