//! Single-slot, TTL-gated memoization of an async producer.
//!
//! A [`Memoizer`] wraps one producer (typically a backend query) and guarantees that at
//! most one producer call is in flight at a time. Callers arriving while a refresh runs
//! wait on the same lock and observe the same outcome once it completes. Failed fetches
//! are cached for the full TTL window as well, so a failing backend is asked at most once
//! per window.

use std::{fmt, future::Future, sync::Arc, time::Duration};

use futures::future::{BoxFuture, FutureExt};
use metrics::{counter, histogram};
use tokio::{sync::Mutex, time::Instant};
use tracing::{debug, warn};

pub(crate) const METRIC_MEMO_HIT: &str = "rostrum_memo_hit_total";
pub(crate) const METRIC_MEMO_FETCH: &str = "rostrum_memo_fetch_total";
pub(crate) const METRIC_MEMO_FETCH_ERROR: &str = "rostrum_memo_fetch_error_total";
pub(crate) const METRIC_MEMO_FETCH_MS: &str = "rostrum_memo_fetch_ms";

/// Future returned by a producer.
pub type ProducerFuture<T, E> = BoxFuture<'static, Result<T, E>>;

/// Zero-argument async function that performs the actual fetch.
pub type Producer<T, E> = Arc<dyn Fn() -> ProducerFuture<T, E> + Send + Sync>;

/// Outcome of the most recent completed producer call.
struct CachedValue<T, E> {
    outcome: Result<T, E>,
    fetched_at: Instant,
}

impl<T, E> CachedValue<T, E> {
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }
}

/// TTL-bounded memoizer around a single producer.
///
/// The slot is `None` until the first producer call completes.
pub struct Memoizer<T, E> {
    label: &'static str,
    ttl: Duration,
    producer: Producer<T, E>,
    slot: Mutex<Option<CachedValue<T, E>>>,
}

impl<T, E> Memoizer<T, E>
where
    T: Clone,
    E: Clone + fmt::Display,
{
    /// Create an empty memoizer. `label` names the resource in logs and metrics.
    pub fn new(label: &'static str, ttl: Duration, producer: Producer<T, E>) -> Self {
        Self {
            label,
            ttl,
            producer,
            slot: Mutex::new(None),
        }
    }

    /// Create a memoizer from an async closure.
    pub fn from_fn<F, Fut>(label: &'static str, ttl: Duration, producer: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::new(label, ttl, Arc::new(move || producer().boxed()))
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached outcome while it is fresh, otherwise run the producer once.
    ///
    /// The slot lock is held across the producer call, so concurrent callers during a
    /// refresh queue behind it and then read the outcome it stored.
    pub async fn get(&self) -> Result<T, E> {
        let mut slot = self.slot.lock().await;

        if let Some(cached) = slot.as_ref() {
            if cached.is_fresh(self.ttl, Instant::now()) {
                counter!(METRIC_MEMO_HIT, "resource" => self.label).increment(1);
                return cached.outcome.clone();
            }
        }

        counter!(METRIC_MEMO_FETCH, "resource" => self.label).increment(1);
        debug!(resource = self.label, "memoized value missing or stale, fetching");

        let started_at = Instant::now();
        let outcome = (self.producer)().await;
        let fetched_at = Instant::now();

        histogram!(METRIC_MEMO_FETCH_MS, "resource" => self.label)
            .record(fetched_at.duration_since(started_at).as_secs_f64() * 1000.0);

        if let Err(err) = &outcome {
            counter!(METRIC_MEMO_FETCH_ERROR, "resource" => self.label).increment(1);
            warn!(
                resource = self.label,
                error = %err,
                ttl_secs = self.ttl.as_secs(),
                "fetch failed; caching failure for the ttl window"
            );
        }

        *slot = Some(CachedValue {
            outcome: outcome.clone(),
            fetched_at,
        });

        outcome
    }
}

impl<T, E> fmt::Debug for Memoizer<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoizer")
            .field("label", &self.label)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::future::join_all;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};

    use super::*;

    const TTL: Duration = Duration::from_secs(600);

    fn counting_memo(
        ttl: Duration,
        delay: Duration,
    ) -> (Memoizer<usize, String>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let handle = calls.clone();
        let memo = Memoizer::from_fn("test", ttl, move || {
            let calls = handle.clone();
            async move {
                let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(call)
            }
        });
        (memo, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_single_fetch() {
        let (memo, calls) = counting_memo(TTL, Duration::from_millis(250));

        let results = join_all((0..32).map(|_| memo.get())).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|result| result == &Ok(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_across_tasks_share_single_fetch() {
        let (memo, calls) = counting_memo(TTL, Duration::from_millis(250));
        let memo = Arc::new(memo);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let memo = memo.clone();
                tokio::spawn(async move { memo.get().await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.expect("task should not panic"), Ok(1));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn serves_cached_value_until_ttl_elapses() {
        let (memo, calls) = counting_memo(TTL, Duration::ZERO);

        assert_eq!(memo.get().await, Ok(1));

        tokio::time::advance(TTL - Duration::from_millis(1)).await;
        assert_eq!(memo.get().await, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(memo.get().await, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        assert_eq!(memo.get().await, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_window_triggers_exactly_one_refresh_for_concurrent_callers() {
        let (memo, calls) = counting_memo(TTL, Duration::from_millis(100));

        assert_eq!(memo.get().await, Ok(1));
        tokio::time::advance(TTL).await;

        let results = join_all((0..16).map(|_| memo.get())).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(results.iter().all(|result| result == &Ok(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_cached_for_the_window() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handle = calls.clone();
        let memo: Memoizer<u32, String> = Memoizer::from_fn("failing", TTL, move || {
            let calls = handle.clone();
            async move {
                let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if call == 1 {
                    Err("backend unavailable".to_string())
                } else {
                    Ok(7)
                }
            }
        });

        assert_eq!(memo.get().await, Err("backend unavailable".to_string()));
        assert_eq!(memo.get().await, Err("backend unavailable".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(TTL).await;
        assert_eq!(memo.get().await, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_ttl_fetches_on_every_call() {
        let (memo, calls) = counting_memo(Duration::ZERO, Duration::ZERO);

        assert_eq!(memo.get().await, Ok(1));
        assert_eq!(memo.get().await, Ok(2));
        assert_eq!(memo.get().await, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_fetch_leaves_slot_empty() {
        let (memo, calls) = counting_memo(TTL, Duration::from_secs(5));

        let abandoned = tokio::time::timeout(Duration::from_secs(1), memo.get()).await;
        assert!(abandoned.is_err());

        assert_eq!(memo.get().await, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn records_hit_fetch_and_error_metrics() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("runtime should build");

        metrics::with_local_recorder(&recorder, || {
            runtime.block_on(async {
                let memo: Memoizer<u32, String> = Memoizer::from_fn("metrics", TTL, || async {
                    Err("boom".to_string())
                });
                let _ = memo.get().await;
                let _ = memo.get().await;
                let _ = memo.get().await;
            });
        });

        let mut hits = 0;
        let mut fetches = 0;
        let mut errors = 0;
        for (key, _, _, value) in snapshotter.snapshot().into_vec() {
            let DebugValue::Counter(count) = value else {
                continue;
            };
            match key.key().name() {
                METRIC_MEMO_HIT => hits += count,
                METRIC_MEMO_FETCH => fetches += count,
                METRIC_MEMO_FETCH_ERROR => errors += count,
                _ => {}
            }
        }

        assert_eq!(fetches, 1);
        assert_eq!(errors, 1);
        assert_eq!(hits, 2);
    }
}
