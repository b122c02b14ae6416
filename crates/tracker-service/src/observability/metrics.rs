//! Prometheus metrics for the episode tracker.
//!
//! Service-level metrics follow Prometheus naming conventions:
//! - `tracker_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! The API counters (`RequestCount`, `ResponseTime`, `SuccessCount`,
//! `ErrorCount`) are emitted by the telemetry sink under their fixed names
//! and bucketed here as well.
//!
//! # Cardinality
//!
//! - `method`: GET, POST and the few others axum may see
//! - `endpoint`: the six known paths plus `/other`
//! - `status`: success, error, timeout
//! - `operation`: get, query, put, scan

use crate::observability::telemetry::MetricName;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and return the handle used by `/metrics`.
///
/// Must be called once, before any metric is recorded.
///
/// # Errors
///
/// Returns error if the recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Prefix("tracker_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        .set_buckets_for_metric(
            Matcher::Prefix("tracker_db_query".to_string()),
            &[
                0.002, 0.005, 0.010, 0.020, 0.050, 0.100, 0.250, 0.500, 1.000,
            ],
        )
        .map_err(|e| format!("Failed to set DB query buckets: {e}"))?
        // ResponseTime is recorded in milliseconds
        .set_buckets_for_metric(
            Matcher::Full(MetricName::ResponseTime.as_str().to_string()),
            &[
                5.0, 10.0, 25.0, 50.0, 100.0, 200.0, 500.0, 1000.0, 2000.0, 5000.0,
            ],
        )
        .map_err(|e| format!("Failed to set response time buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `tracker_http_requests_total`, `tracker_http_request_duration_seconds`
///
/// Captures every response, including framework-level rejections
/// (404 unknown route, 405 wrong method) that never reach a handler.
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("tracker_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("tracker_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Categorize HTTP status code into success/error/timeout
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Collapse unknown paths to `/other` to bound label cardinality.
fn normalize_endpoint(path: &str) -> &'static str {
    match path {
        "/health" => "/health",
        "/metrics" => "/metrics",
        "/api/show_episode" => "/api/show_episode",
        "/api/show_user" => "/api/show_user",
        "/api/update_episode" => "/api/update_episode",
        "/api/show_all" => "/api/show_all",
        _ => "/other",
    }
}

// ============================================================================
// Database Metrics
// ============================================================================

/// Record a backend round trip
///
/// Metric: `tracker_db_query_duration_seconds`, `tracker_db_queries_total`
/// Labels: `operation`, `status`
pub fn record_db_query(operation: &'static str, status: &'static str, duration: Duration) {
    histogram!("tracker_db_query_duration_seconds",
        "operation" => operation
    )
    .record(duration.as_secs_f64());

    counter!("tracker_db_queries_total",
        "operation" => operation,
        "status" => status
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};

    fn counters(recorder: &DebuggingRecorder) -> Vec<(String, Vec<(String, String)>, u64)> {
        recorder
            .snapshotter()
            .snapshot()
            .into_vec()
            .into_iter()
            .filter_map(|(key, _, _, value)| match value {
                DebugValue::Counter(count) => {
                    let labels = key
                        .key()
                        .labels()
                        .map(|l| (l.key().to_string(), l.value().to_string()))
                        .collect();
                    Some((key.key().name().to_string(), labels, count))
                }
                _ => None,
            })
            .collect()
    }

    fn label(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn test_record_http_request_labels() {
        let recorder = DebuggingRecorder::new();

        metrics::with_local_recorder(&recorder, || {
            record_http_request("GET", "/api/show_user", 400, Duration::from_millis(2));
            record_http_request("GET", "/api/show_user", 400, Duration::from_millis(3));
            record_http_request("GET", "/api/show_user/alice", 404, Duration::from_millis(1));
        });

        let counters = counters(&recorder);
        let show_user = counters.iter().find(|(name, labels, _)| {
            name == "tracker_http_requests_total"
                && labels.contains(&label("endpoint", "/api/show_user"))
                && labels.contains(&label("status_code", "400"))
                && labels.contains(&label("method", "GET"))
        });
        assert_eq!(show_user.map(|(_, _, count)| *count), Some(2));

        let other = counters.iter().find(|(_, labels, _)| {
            labels.contains(&label("endpoint", "/other"))
                && labels.contains(&label("status_code", "404"))
        });
        assert_eq!(other.map(|(_, _, count)| *count), Some(1));
    }

    #[test]
    fn test_categorize_status_code() {
        assert_eq!(categorize_status_code(200), "success");
        assert_eq!(categorize_status_code(201), "success");
        assert_eq!(categorize_status_code(299), "success");

        assert_eq!(categorize_status_code(408), "timeout");
        assert_eq!(categorize_status_code(504), "timeout");

        assert_eq!(categorize_status_code(400), "error");
        assert_eq!(categorize_status_code(404), "error");
        assert_eq!(categorize_status_code(405), "error");
        assert_eq!(categorize_status_code(500), "error");
    }

    #[test]
    fn test_normalize_endpoint_known_paths() {
        for path in [
            "/health",
            "/metrics",
            "/api/show_episode",
            "/api/show_user",
            "/api/update_episode",
            "/api/show_all",
        ] {
            assert_eq!(normalize_endpoint(path), path);
        }
    }

    #[test]
    fn test_normalize_endpoint_unknown_paths() {
        assert_eq!(normalize_endpoint("/"), "/other");
        assert_eq!(normalize_endpoint("/api/show_episodes"), "/other");
        assert_eq!(normalize_endpoint("/api/show_user/alice"), "/other");
    }

    #[test]
    fn test_record_db_query_counts_by_operation() {
        let recorder = DebuggingRecorder::new();

        metrics::with_local_recorder(&recorder, || {
            record_db_query("get", "success", Duration::from_millis(3));
            record_db_query("get", "success", Duration::from_millis(4));
            record_db_query("scan", "error", Duration::from_millis(50));
        });

        let counters = counters(&recorder);
        let get_success = counters.iter().find(|(name, labels, _)| {
            name == "tracker_db_queries_total"
                && labels.contains(&("operation".to_string(), "get".to_string()))
        });
        assert_eq!(get_success.map(|(_, _, count)| *count), Some(2));

        let scan_error = counters.iter().find(|(_, labels, _)| {
            labels.contains(&("operation".to_string(), "scan".to_string()))
                && labels.contains(&("status".to_string(), "error".to_string()))
        });
        assert_eq!(scan_error.map(|(_, _, count)| *count), Some(1));
    }
}
