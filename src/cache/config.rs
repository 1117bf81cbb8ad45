//! Cache configuration.
//!
//! Resolved from the `[cache]` section of `rostrum.toml`.

use std::{num::NonZeroUsize, time::Duration};

use crate::config::{
    CacheSettings, DEFAULT_ARTICLE_CAPACITY, DEFAULT_ARTICLE_IDLE_SECS, DEFAULT_CACHE_TTL_SECS,
    DEFAULT_SWEEP_INTERVAL_SECS,
};

/// Cache configuration from `rostrum.toml`.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Freshness window shared by every memoized resource, in seconds.
    pub ttl_seconds: u64,
    /// Maximum number of article slugs with a resident memoizer.
    pub article_capacity: NonZeroUsize,
    /// Idle time after which an article memoizer is dropped, in seconds.
    pub article_idle_seconds: u64,
    /// Interval between idle sweeps of the article registry, in seconds.
    pub sweep_interval_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_CACHE_TTL_SECS,
            article_capacity: NonZeroUsize::new(DEFAULT_ARTICLE_CAPACITY)
                .unwrap_or(NonZeroUsize::MIN),
            article_idle_seconds: DEFAULT_ARTICLE_IDLE_SECS,
            sweep_interval_seconds: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

impl From<&CacheSettings> for CacheConfig {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            ttl_seconds: settings.ttl.as_secs(),
            article_capacity: settings.article_capacity,
            article_idle_seconds: settings.article_idle.as_secs(),
            sweep_interval_seconds: settings.sweep_interval.as_secs(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// Returns the article idle timeout, never shorter than the TTL; zero disables
    /// idle eviction.
    pub fn article_idle(&self) -> Option<Duration> {
        (self.article_idle_seconds > 0)
            .then(|| Duration::from_secs(self.article_idle_seconds.max(self.ttl_seconds)))
    }

    /// Returns the sweep interval, clamped to at least one second.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds.max(1))
    }
}
