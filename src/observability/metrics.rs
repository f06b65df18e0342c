//! Metrics for admission control and input rejection.
//!
//! # Metrics
//! - `ajos_requests_admitted_total` (counter): admissions by limiter
//! - `ajos_rate_limited_total` (counter): denials by limiter
//! - `ajos_input_rejected_total` (counter): sanitizer rejections by input kind and reason

use metrics::counter;

/// Record an admitted operation.
pub fn record_admitted(limiter: &str) {
    counter!("ajos_requests_admitted_total", "limiter" => limiter.to_string()).increment(1);
}

/// Record a denied operation.
pub fn record_rate_limited(limiter: &str) {
    counter!("ajos_rate_limited_total", "limiter" => limiter.to_string()).increment(1);
}

/// Record a rejected input value.
pub fn record_input_rejected(kind: &'static str, reason: &'static str) {
    counter!(
        "ajos_input_rejected_total",
        "kind" => kind,
        "reason" => reason
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
    use metrics_util::MetricKind;

    use crate::security::rate_limit::{ManualClock, RateLimiter};
    use crate::security::sanitize::check_url;

    /// Counter value for `name` carrying every label in `labels`.
    fn counter(snapshotter: &Snapshotter, name: &str, labels: &[(&str, &str)]) -> Option<u64> {
        snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .find_map(|(key, _, _, value)| {
                if key.kind() != MetricKind::Counter || key.key().name() != name {
                    return None;
                }
                let matches = labels.iter().all(|(k, v)| {
                    key.key().labels().any(|l| l.key() == *k && l.value() == *v)
                });
                match value {
                    DebugValue::Counter(n) if matches => Some(n),
                    _ => None,
                }
            })
    }

    #[test]
    fn test_limiter_records_admissions_and_denials() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            let clock = ManualClock::new();
            let mut limiter =
                RateLimiter::with_clock(1, Duration::from_millis(1000), Arc::new(clock))
                    .named("ai");
            assert!(limiter.can_make_request());
            assert!(!limiter.can_make_request());
            assert!(!limiter.can_make_request());
        });

        assert_eq!(
            counter(&snapshotter, "ajos_requests_admitted_total", &[("limiter", "ai")]),
            Some(1)
        );
        assert_eq!(
            counter(&snapshotter, "ajos_rate_limited_total", &[("limiter", "ai")]),
            Some(2)
        );
    }

    #[test]
    fn test_rejected_url_records_reason() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            assert!(!check_url("javascript:alert(1)").is_valid());
            assert!(check_url("https://example.com").is_valid());
        });

        assert_eq!(
            counter(
                &snapshotter,
                "ajos_input_rejected_total",
                &[("kind", "url"), ("reason", "disallowed_scheme")]
            ),
            Some(1)
        );
    }
}
