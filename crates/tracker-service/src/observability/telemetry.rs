//! Telemetry sink adapter.
//!
//! Every API call produces structured log events and a handful of numeric
//! metrics. `TelemetrySink` is the seam between the instrumentation wrapper
//! and wherever those end up. The production sink forwards log events to
//! `tracing` and metrics to the `metrics` facade (exported on `/metrics`).
//!
//! Sinks are fire-and-forget from the caller's point of view: a
//! `TelemetryError` is reported back so the caller can log it locally, but it
//! must never fail the request being measured.

use metrics::{counter, histogram, Label};
use std::fmt;
use thiserror::Error;

/// Namespace shared by all API metrics.
pub const METRIC_NAMESPACE: &str = "TVShowTracker/API";

/// API metrics emitted per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    /// One per call, value 1.
    RequestCount,
    /// Wall-clock duration of the call, in milliseconds.
    ResponseTime,
    /// One per successful call, value 1.
    SuccessCount,
    /// One per failed call, value 1.
    ErrorCount,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::RequestCount => "RequestCount",
            MetricName::ResponseTime => "ResponseTime",
            MetricName::SuccessCount => "SuccessCount",
            MetricName::ErrorCount => "ErrorCount",
        }
    }

    pub fn unit(&self) -> MetricUnit {
        match self {
            MetricName::ResponseTime => MetricUnit::Milliseconds,
            _ => MetricUnit::Count,
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    Count,
    Milliseconds,
}

/// A metric dimension such as `Endpoint=show_user`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub name: &'static str,
    pub value: String,
}

impl Dimension {
    pub fn new(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// Phase of an API call a log event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    ApiCallStart,
    ApiCallSuccess,
    ApiCallError,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ApiCallStart => "API_CALL_START",
            EventKind::ApiCallSuccess => "API_CALL_SUCCESS",
            EventKind::ApiCallError => "API_CALL_ERROR",
        }
    }
}

/// Structured log event for one phase of an API call.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryEvent {
    pub kind: EventKind,
    pub endpoint: &'static str,
    pub method: &'static str,
    pub user_agent: Option<String>,
    pub status_code: Option<u16>,
    pub duration_ms: Option<f64>,
    pub error_type: Option<&'static str>,
    pub error: Option<String>,
}

impl TelemetryEvent {
    pub fn new(kind: EventKind, endpoint: &'static str, method: &'static str) -> Self {
        Self {
            kind,
            endpoint,
            method,
            user_agent: None,
            status_code: None,
            duration_ms: None,
            error_type: None,
            error: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Telemetry sink unavailable: {0}")]
    SinkUnavailable(String),
}

/// Destination for API call telemetry.
pub trait TelemetrySink: Send + Sync {
    /// Emit one structured log event.
    fn log(&self, event: &TelemetryEvent) -> Result<(), TelemetryError>;

    /// Emit one numeric metric with its dimensions.
    fn emit_metric(
        &self,
        name: MetricName,
        value: f64,
        dimensions: &[Dimension],
    ) -> Result<(), TelemetryError>;
}

/// Production sink: `tracing` for events, the `metrics` facade for numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsTelemetrySink;

impl TelemetrySink for MetricsTelemetrySink {
    fn log(&self, event: &TelemetryEvent) -> Result<(), TelemetryError> {
        let user_agent = event.user_agent.as_deref().unwrap_or("unknown");
        match event.kind {
            EventKind::ApiCallStart => tracing::info!(
                target: "tracker.api",
                endpoint = event.endpoint,
                method = event.method,
                user_agent = user_agent,
                "{}",
                event.kind.as_str()
            ),
            EventKind::ApiCallSuccess => tracing::info!(
                target: "tracker.api",
                endpoint = event.endpoint,
                method = event.method,
                status_code = event.status_code,
                duration_ms = event.duration_ms,
                "{}",
                event.kind.as_str()
            ),
            EventKind::ApiCallError => tracing::error!(
                target: "tracker.api",
                endpoint = event.endpoint,
                method = event.method,
                status_code = event.status_code,
                duration_ms = event.duration_ms,
                error_type = event.error_type,
                error = event.error.as_deref(),
                "{}",
                event.kind.as_str()
            ),
        }
        Ok(())
    }

    fn emit_metric(
        &self,
        name: MetricName,
        value: f64,
        dimensions: &[Dimension],
    ) -> Result<(), TelemetryError> {
        let mut labels = Vec::with_capacity(dimensions.len() + 1);
        labels.push(Label::new("Namespace", METRIC_NAMESPACE));
        labels.extend(
            dimensions
                .iter()
                .map(|d| Label::new(d.name, d.value.clone())),
        );

        match name.unit() {
            MetricUnit::Count => {
                if !value.is_finite() || value < 0.0 {
                    return Err(TelemetryError::SinkUnavailable(format!(
                        "{} cannot record count {}",
                        name, value
                    )));
                }
                counter!(name.as_str(), labels).increment(value as u64);
            }
            MetricUnit::Milliseconds => {
                histogram!(name.as_str(), labels).record(value);
            }
        }
        Ok(())
    }
}
