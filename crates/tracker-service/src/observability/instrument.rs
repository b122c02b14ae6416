//! Instrumentation wrapper for API calls.
//!
//! `instrument` takes the future of one API call and returns its outcome
//! unchanged, after logging start/finish events and emitting `RequestCount`,
//! `ResponseTime` and `SuccessCount`/`ErrorCount` through a `TelemetrySink`.
//!
//! ```rust,ignore
//! instrument(state.telemetry.as_ref(), ApiCall::new("show_all", "GET"), async {
//!     state.store.list_all().await
//! })
//! .await
//! ```

use crate::errors::TrackerError;
use crate::observability::telemetry::{
    Dimension, EventKind, MetricName, TelemetryError, TelemetryEvent, TelemetrySink,
};
use std::future::Future;
use std::time::Instant;

/// Status code recorded for successful calls.
pub const SUCCESS_STATUS: u16 = 200;

/// Identity of the call being measured.
#[derive(Debug, Clone)]
pub struct ApiCall {
    pub endpoint: &'static str,
    pub method: &'static str,
    pub user_agent: Option<String>,
}

impl ApiCall {
    pub fn new(endpoint: &'static str, method: &'static str) -> Self {
        Self {
            endpoint,
            method,
            user_agent: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// Run `operation`, measuring and reporting it, and return its result as-is.
pub async fn instrument<T, F>(
    telemetry: &dyn TelemetrySink,
    call: ApiCall,
    operation: F,
) -> Result<T, TrackerError>
where
    F: Future<Output = Result<T, TrackerError>>,
{
    let start = Instant::now();

    let mut start_event = TelemetryEvent::new(EventKind::ApiCallStart, call.endpoint, call.method);
    start_event.user_agent = call.user_agent.clone();
    swallow(telemetry.log(&start_event));

    let result = operation.await;
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

    let (status_code, error_type) = match &result {
        Ok(_) => (SUCCESS_STATUS, None),
        Err(e) => (e.status_code(), Some(e.kind())),
    };

    let mut finish_event = match &result {
        Ok(_) => TelemetryEvent::new(EventKind::ApiCallSuccess, call.endpoint, call.method),
        Err(e) => {
            let mut event =
                TelemetryEvent::new(EventKind::ApiCallError, call.endpoint, call.method);
            event.error_type = error_type;
            event.error = Some(e.to_string());
            event
        }
    };
    finish_event.status_code = Some(status_code);
    finish_event.duration_ms = Some(round_ms(duration_ms));
    swallow(telemetry.log(&finish_event));

    let mut dimensions = vec![
        Dimension::new("Endpoint", call.endpoint),
        Dimension::new("Method", call.method),
        Dimension::new("StatusCode", status_code.to_string()),
    ];
    if let Some(error_type) = error_type {
        dimensions.push(Dimension::new("ErrorType", error_type));
    }

    let outcome_metric = if result.is_ok() {
        MetricName::SuccessCount
    } else {
        MetricName::ErrorCount
    };

    swallow(telemetry.emit_metric(MetricName::RequestCount, 1.0, &dimensions));
    swallow(telemetry.emit_metric(MetricName::ResponseTime, duration_ms, &dimensions));
    swallow(telemetry.emit_metric(outcome_metric, 1.0, &dimensions));

    result
}

fn swallow(result: Result<(), TelemetryError>) {
    if let Err(e) = result {
        tracing::warn!(target: "tracker.telemetry", error = %e, "Failed to emit telemetry");
    }
}

/// Two decimal places, matching the precision of the logged durations.
fn round_ms(duration_ms: f64) -> f64 {
    (duration_ms * 100.0).round() / 100.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<TelemetryEvent>>,
        metrics: Mutex<Vec<(MetricName, f64, Vec<Dimension>)>>,
    }

    impl TelemetrySink for RecordingSink {
        fn log(&self, event: &TelemetryEvent) -> Result<(), TelemetryError> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }

        fn emit_metric(
            &self,
            name: MetricName,
            value: f64,
            dimensions: &[Dimension],
        ) -> Result<(), TelemetryError> {
            self.metrics
                .lock()
                .unwrap()
                .push((name, value, dimensions.to_vec()));
            Ok(())
        }
    }

    struct FailingSink;

    impl TelemetrySink for FailingSink {
        fn log(&self, _event: &TelemetryEvent) -> Result<(), TelemetryError> {
            Err(TelemetryError::SinkUnavailable("log sink down".to_string()))
        }

        fn emit_metric(
            &self,
            _name: MetricName,
            _value: f64,
            _dimensions: &[Dimension],
        ) -> Result<(), TelemetryError> {
            Err(TelemetryError::SinkUnavailable("metric sink down".to_string()))
        }
    }

    fn metric_names(sink: &RecordingSink) -> Vec<MetricName> {
        sink.metrics
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _, _)| *name)
            .collect()
    }

    #[tokio::test]
    async fn test_success_emits_request_response_and_success() {
        let sink = RecordingSink::default();

        let result = instrument(
            &sink,
            ApiCall::new("show_user", "GET").with_user_agent(Some("curl/8.0".to_string())),
            async { Ok::<_, TrackerError>(42) },
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(
            metric_names(&sink),
            vec![
                MetricName::RequestCount,
                MetricName::ResponseTime,
                MetricName::SuccessCount
            ]
        );

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventKind::ApiCallStart);
        assert_eq!(events[0].user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(events[1].kind, EventKind::ApiCallSuccess);
        assert_eq!(events[1].status_code, Some(200));
        assert!(events[1].duration_ms.is_some());

        let metrics = sink.metrics.lock().unwrap();
        let (_, _, dimensions) = &metrics[0];
        assert!(dimensions.contains(&Dimension::new("Endpoint", "show_user")));
        assert!(dimensions.contains(&Dimension::new("Method", "GET")));
        assert!(dimensions.contains(&Dimension::new("StatusCode", "200")));
        assert!(!dimensions.iter().any(|d| d.name == "ErrorType"));
    }

    #[tokio::test]
    async fn test_failure_emits_error_count_and_propagates_error() {
        let sink = RecordingSink::default();

        let result: Result<(), TrackerError> = instrument(
            &sink,
            ApiCall::new("show_episode", "GET"),
            async { Err(TrackerError::NotFound("no such show".to_string())) },
        )
        .await;

        assert!(matches!(result, Err(TrackerError::NotFound(msg)) if msg == "no such show"));
        assert_eq!(
            metric_names(&sink),
            vec![
                MetricName::RequestCount,
                MetricName::ResponseTime,
                MetricName::ErrorCount
            ]
        );

        let metrics = sink.metrics.lock().unwrap();
        let (_, _, dimensions) = &metrics[2];
        assert!(dimensions.contains(&Dimension::new("StatusCode", "404")));
        assert!(dimensions.contains(&Dimension::new("ErrorType", "NotFoundError")));

        let events = sink.events.lock().unwrap();
        let error_event = &events[1];
        assert_eq!(error_event.kind, EventKind::ApiCallError);
        assert_eq!(error_event.error_type, Some("NotFoundError"));
        assert_eq!(error_event.error.as_deref(), Some("Not found: no such show"));
    }

    #[tokio::test]
    async fn test_failing_sink_does_not_change_success() {
        let result = instrument(&FailingSink, ApiCall::new("show_all", "GET"), async {
            Ok::<_, TrackerError>("entries")
        })
        .await;

        assert_eq!(result.unwrap(), "entries");
    }

    #[tokio::test]
    async fn test_failing_sink_does_not_mask_error() {
        let result: Result<(), TrackerError> =
            instrument(&FailingSink, ApiCall::new("show_all", "GET"), async {
                Err(TrackerError::Backend("scan failed".to_string()))
            })
            .await;

        assert!(matches!(result, Err(TrackerError::Backend(msg)) if msg == "scan failed"));
    }

    #[tokio::test]
    async fn test_response_time_is_in_milliseconds() {
        let sink = RecordingSink::default();

        instrument(&sink, ApiCall::new("show_all", "GET"), async {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            Ok::<_, TrackerError>(())
        })
        .await
        .unwrap();

        let metrics = sink.metrics.lock().unwrap();
        let response_time = metrics
            .iter()
            .find(|(name, _, _)| *name == MetricName::ResponseTime)
            .map(|(_, value, _)| *value)
            .unwrap();
        assert!(response_time >= 20.0, "got {response_time}");
    }

    #[test]
    fn test_round_ms() {
        assert_eq!(round_ms(12.3456), 12.35);
        assert_eq!(round_ms(0.0), 0.0);
    }
}
