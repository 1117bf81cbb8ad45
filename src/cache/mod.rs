//! Rostrum content cache.
//!
//! Backend content is memoized in process memory with purely time-based expiry:
//!
//! - [`Memoizer`]: one producer, one slot, at most one in-flight fetch per TTL window
//! - [`KeyedMemoizer`]: lazily created memoizers per runtime key (article slugs),
//!   bounded by an LRU capacity and an idle timeout
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! ttl_seconds = 600
//! article_capacity = 1024
//! article_idle_seconds = 3600
//! sweep_interval_seconds = 300
//! ```

mod config;
mod keyed;
mod lock;
mod memo;

pub use config::CacheConfig;
pub use keyed::{KeyedMemoizer, ProducerFactory};
pub use memo::{Memoizer, Producer, ProducerFuture};

pub(crate) use keyed::{METRIC_KEYED_ENTRIES, METRIC_KEYED_EVICT};
pub(crate) use memo::{
    METRIC_MEMO_FETCH, METRIC_MEMO_FETCH_ERROR, METRIC_MEMO_FETCH_MS, METRIC_MEMO_HIT,
};
