use std::num::NonZeroUsize;
use std::time::Duration;

use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use rostrum::cache::{KeyedMemoizer, Memoizer};

#[tokio::test]
async fn memoizers_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let memo: Memoizer<u32, String> =
        Memoizer::from_fn("metrics-home", Duration::from_secs(60), || async { Ok(1) });
    assert_eq!(memo.get().await, Ok(1));
    assert_eq!(memo.get().await, Ok(1));

    let failing: Memoizer<u32, String> =
        Memoizer::from_fn("metrics-news", Duration::from_secs(60), || async {
            Err("timeout".to_string())
        });
    assert!(failing.get().await.is_err());

    let articles: KeyedMemoizer<String, String> = KeyedMemoizer::from_fn(
        "metrics-article",
        Duration::from_secs(60),
        NonZeroUsize::new(1).expect("non-zero"),
        None,
        |slug: String| async move { Ok(slug) },
    );
    assert_eq!(articles.get("first").await, Ok("first".to_string()));
    assert_eq!(articles.get("second").await, Ok("second".to_string()));
    assert!(!articles.contains("first"));

    let mut names = Vec::new();
    let mut resident = None;
    for (key, _, _, value) in snapshotter.snapshot().into_vec() {
        let name = key.key().name().to_string();
        if name == "rostrum_memo_keyed_entries" {
            if let DebugValue::Gauge(value) = &value {
                resident = Some(value.into_inner());
            }
        }
        names.push(name);
    }

    for expected in [
        "rostrum_memo_hit_total",
        "rostrum_memo_fetch_total",
        "rostrum_memo_fetch_error_total",
        "rostrum_memo_fetch_ms",
        "rostrum_memo_keyed_evict_total",
        "rostrum_memo_keyed_entries",
    ] {
        assert!(
            names.iter().any(|name| name == expected),
            "missing metric {expected}, got {names:?}"
        );
    }
    assert_eq!(resident, Some(1.0));
}
