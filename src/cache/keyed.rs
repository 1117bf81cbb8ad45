//! Lazily-populated registry of per-key memoizers.
//!
//! Each key (an article slug, for instance) gets its own [`Memoizer`], created on first
//! lookup. The registry lock only guards the key → memoizer map; fetches run under the
//! individual memoizer's lock, so a slow fetch for one key never blocks another.
//!
//! The map is bounded: an LRU capacity cap plus an optional idle timeout keep crawler or
//! bogus-slug traffic from growing it without limit.
//!
//! Eviction only drops the registry's handle. A caller already holding the evicted
//! memoizer finishes its fetch, while the next lookup for that key creates a fresh
//! memoizer and may fetch in parallel. Each memoizer still has at most one fetch in
//! flight.

use std::{fmt, future::Future, num::NonZeroUsize, sync::Arc, sync::Mutex, time::Duration};

use futures::future::FutureExt;
use lru::LruCache;
use metrics::{counter, gauge};
use tokio::time::Instant;
use tracing::debug;

use super::lock::mutex_lock;
use super::memo::{Memoizer, Producer};

const SOURCE: &str = "cache::keyed";

pub(crate) const METRIC_KEYED_EVICT: &str = "rostrum_memo_keyed_evict_total";
pub(crate) const METRIC_KEYED_ENTRIES: &str = "rostrum_memo_keyed_entries";

/// Builds the producer for a newly observed key.
pub type ProducerFactory<T, E> = Arc<dyn Fn(&str) -> Producer<T, E> + Send + Sync>;

struct Entry<T, E> {
    memo: Arc<Memoizer<T, E>>,
    last_access: Instant,
}

pub struct KeyedMemoizer<T, E> {
    label: &'static str,
    ttl: Duration,
    idle_timeout: Option<Duration>,
    factory: ProducerFactory<T, E>,
    entries: Mutex<LruCache<String, Entry<T, E>>>,
}

impl<T, E> KeyedMemoizer<T, E>
where
    T: Clone,
    E: Clone + fmt::Display,
{
    /// Create an empty registry.
    ///
    /// Every memoizer it creates shares `ttl`. At most `capacity` keys stay resident;
    /// keys untouched for longer than `idle_timeout` are dropped on the next lookup or
    /// sweep. `None` disables idle eviction.
    pub fn new(
        label: &'static str,
        ttl: Duration,
        capacity: NonZeroUsize,
        idle_timeout: Option<Duration>,
        factory: ProducerFactory<T, E>,
    ) -> Self {
        Self {
            label,
            ttl,
            idle_timeout,
            factory,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Create a registry whose producers call `producer` with the owned key.
    pub fn from_fn<F, Fut>(
        label: &'static str,
        ttl: Duration,
        capacity: NonZeroUsize,
        idle_timeout: Option<Duration>,
        producer: F,
    ) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let producer = Arc::new(producer);
        let factory: ProducerFactory<T, E> = Arc::new(move |key: &str| {
            let producer = producer.clone();
            let key = key.to_owned();
            let bound: Producer<T, E> = Arc::new(move || producer(key.clone()).boxed());
            bound
        });
        Self::new(label, ttl, capacity, idle_timeout, factory)
    }

    /// Return the memoizer for `key`, creating it on first observation.
    ///
    /// Repeated lookups return the same instance for as long as the key stays resident.
    pub fn get_or_create(&self, key: &str) -> Arc<Memoizer<T, E>> {
        let now = Instant::now();
        let mut entries = mutex_lock(&self.entries, SOURCE, "get_or_create");

        if let Some(entry) = entries.get_mut(key) {
            if !self.is_idle(entry, now) {
                entry.last_access = now;
                return entry.memo.clone();
            }
        }

        if entries.pop(key).is_some() {
            self.record_eviction(key, "idle");
        }

        let memo = Arc::new(Memoizer::new(self.label, self.ttl, (self.factory)(key)));
        let entry = Entry {
            memo: memo.clone(),
            last_access: now,
        };
        if let Some((evicted, _)) = entries.push(key.to_owned(), entry) {
            self.record_eviction(&evicted, "capacity");
        }

        debug!(resource = self.label, key, "created memoizer for new key");
        gauge!(METRIC_KEYED_ENTRIES, "resource" => self.label).set(entries.len() as f64);

        memo
    }

    /// Look up (or create) the memoizer for `key` and fetch through it.
    pub async fn get(&self, key: &str) -> Result<T, E> {
        let memo = self.get_or_create(key);
        memo.get().await
    }

    /// Drop every key that has been idle past the idle timeout. Returns the number removed.
    pub fn sweep_idle(&self) -> usize {
        if self.idle_timeout.is_none() {
            return 0;
        }

        let now = Instant::now();
        let mut entries = mutex_lock(&self.entries, SOURCE, "sweep_idle");
        let idle: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| self.is_idle(entry, now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &idle {
            entries.pop(key);
            self.record_eviction(key, "idle");
        }

        gauge!(METRIC_KEYED_ENTRIES, "resource" => self.label).set(entries.len() as f64);
        idle.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        mutex_lock(&self.entries, SOURCE, "contains").contains(key)
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_idle(&self, entry: &Entry<T, E>, now: Instant) -> bool {
        self.idle_timeout
            .is_some_and(|idle| now.saturating_duration_since(entry.last_access) >= idle)
    }

    fn record_eviction(&self, key: &str, reason: &'static str) {
        counter!(METRIC_KEYED_EVICT, "resource" => self.label, "reason" => reason).increment(1);
        debug!(resource = self.label, key, reason, "evicted memoizer");
    }
}

impl<T, E> fmt::Debug for KeyedMemoizer<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedMemoizer")
            .field("label", &self.label)
            .field("ttl", &self.ttl)
            .field("idle_timeout", &self.idle_timeout)
            .finish_non_exhaustive()
    }
}
