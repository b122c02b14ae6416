//! API telemetry integration tests.
//!
//! Spawn a server with a recording telemetry sink and check what each
//! endpoint reports.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::{Arc, Mutex};
use tracker_service::observability::telemetry::{
    Dimension, EventKind, MetricName, TelemetryError, TelemetryEvent, TelemetrySink,
};
use tracker_service::repositories::InMemoryEpisodeBackend;
use tracker_test_utils::TestTrackerServer;

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

struct BrokenSink;

impl TelemetrySink for BrokenSink {
    fn log(&self, _event: &TelemetryEvent) -> Result<(), TelemetryError> {
        Err(TelemetryError::SinkUnavailable("collector offline".to_string()))
    }

    fn emit_metric(
        &self,
        _name: MetricName,
        _value: f64,
        _dimensions: &[Dimension],
    ) -> Result<(), TelemetryError> {
        Err(TelemetryError::SinkUnavailable("collector offline".to_string()))
    }
}

async fn spawn_recording() -> Result<(TestTrackerServer, Arc<RecordingSink>), anyhow::Error> {
    let sink = Arc::new(RecordingSink::default());
    let server = TestTrackerServer::spawn_with_telemetry(
        Arc::new(InMemoryEpisodeBackend::new()),
        sink.clone(),
    )
    .await?;
    Ok((server, sink))
}

#[tokio::test]
async fn test_successful_call_reports_success() -> Result<(), anyhow::Error> {
    let (server, sink) = spawn_recording().await?;

    let response = reqwest::Client::builder()
        .user_agent("telemetry-test/1.0")
        .build()?
        .get(format!("{}/show_all", server.api_url()))
        .send()
        .await?;
    assert_eq!(response.status(), 200);

    let events = sink.events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, EventKind::ApiCallStart);
    assert_eq!(events[0].endpoint, "show_all");
    assert_eq!(events[0].user_agent.as_deref(), Some("telemetry-test/1.0"));
    assert_eq!(events[1].kind, EventKind::ApiCallSuccess);

    let metrics = sink.metrics.lock().unwrap();
    let names: Vec<MetricName> = metrics.iter().map(|(name, _, _)| *name).collect();
    assert_eq!(
        names,
        vec![
            MetricName::RequestCount,
            MetricName::ResponseTime,
            MetricName::SuccessCount
        ]
    );

    Ok(())
}

#[tokio::test]
async fn test_validation_failure_reports_error_count() -> Result<(), anyhow::Error> {
    let (server, sink) = spawn_recording().await?;

    let response = reqwest::get(format!("{}/show_user", server.api_url())).await?;
    assert_eq!(response.status(), 400);

    let metrics = sink.metrics.lock().unwrap();
    let (_, value, dimensions) = metrics
        .iter()
        .find(|(name, _, _)| *name == MetricName::ErrorCount)
        .expect("ErrorCount should be emitted");
    assert_eq!(*value, 1.0);
    assert!(dimensions.contains(&Dimension::new("Endpoint", "show_user")));
    assert!(dimensions.contains(&Dimension::new("StatusCode", "400")));
    assert!(dimensions.contains(&Dimension::new("ErrorType", "ValidationError")));

    let events = sink.events.lock().unwrap();
    assert_eq!(events.last().map(|e| e.kind), Some(EventKind::ApiCallError));

    Ok(())
}

#[tokio::test]
async fn test_unreadable_query_string_reports_error_count() -> Result<(), anyhow::Error> {
    let (server, sink) = spawn_recording().await?;

    let response = reqwest::get(format!(
        "{}/show_user?username=a&username=b",
        server.api_url()
    ))
    .await?;
    assert_eq!(response.status(), 400);

    let metrics = sink.metrics.lock().unwrap();
    assert!(metrics
        .iter()
        .any(|(name, _, _)| *name == MetricName::RequestCount));
    let (_, _, dimensions) = metrics
        .iter()
        .find(|(name, _, _)| *name == MetricName::ErrorCount)
        .expect("ErrorCount should be emitted");
    assert!(dimensions.contains(&Dimension::new("Endpoint", "show_user")));
    assert!(dimensions.contains(&Dimension::new("ErrorType", "ValidationError")));

    Ok(())
}

#[tokio::test]
async fn test_broken_sink_does_not_change_responses() -> Result<(), anyhow::Error> {
    let server = TestTrackerServer::spawn_with_telemetry(
        Arc::new(InMemoryEpisodeBackend::new()),
        Arc::new(BrokenSink),
    )
    .await?;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/update_episode", server.api_url()))
        .json(&serde_json::json!({
            "username": "diana",
            "tv_show": "The Crown",
            "season": 2,
            "episode": 6
        }))
        .send()
        .await?;
    assert_eq!(response.status(), 200);

    let response = client
        .get(format!("{}/show_episode", server.api_url()))
        .query(&[("username", "diana"), ("tv_show", "Narcos")])
        .send()
        .await?;
    assert_eq!(response.status(), 404);

    Ok(())
}

#[tokio::test]
async fn test_unknown_route_is_not_instrumented() -> Result<(), anyhow::Error> {
    let (server, sink) = spawn_recording().await?;

    let response = reqwest::get(format!("{}/api/nowhere", server.url())).await?;
    assert_eq!(response.status(), 404);

    assert!(sink.events.lock().unwrap().is_empty());
    assert!(sink.metrics.lock().unwrap().is_empty());

    Ok(())
}
