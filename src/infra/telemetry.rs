use std::sync::Once;

use metrics::{Unit, describe_counter, describe_gauge, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::cache::{
    METRIC_KEYED_ENTRIES, METRIC_KEYED_EVICT, METRIC_MEMO_FETCH, METRIC_MEMO_FETCH_ERROR,
    METRIC_MEMO_FETCH_MS, METRIC_MEMO_HIT,
};
use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_MEMO_HIT,
            Unit::Count,
            "Requests served from a fresh memoized outcome."
        );
        describe_counter!(
            METRIC_MEMO_FETCH,
            Unit::Count,
            "Backend fetches triggered by a missing or stale memoized outcome."
        );
        describe_counter!(
            METRIC_MEMO_FETCH_ERROR,
            Unit::Count,
            "Backend fetches that failed and were cached as errors."
        );
        describe_histogram!(
            METRIC_MEMO_FETCH_MS,
            Unit::Milliseconds,
            "Backend fetch latency in milliseconds."
        );
        describe_counter!(
            METRIC_KEYED_EVICT,
            Unit::Count,
            "Per-key memoizers evicted for capacity or idleness."
        );
        describe_gauge!(
            METRIC_KEYED_ENTRIES,
            Unit::Count,
            "Per-key memoizers currently resident."
        );
    });
}
