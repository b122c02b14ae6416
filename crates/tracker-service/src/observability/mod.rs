//! Observability for the episode tracker.
//!
//! - `metrics` - Prometheus recorder setup and service-level metrics
//! - `telemetry` - Telemetry sink adapter (log events + API metrics)
//! - `instrument` - Wrapper that measures one API call
//! - `logging` - Default log filters for the binaries

pub mod instrument;
pub mod logging;
pub mod metrics;
pub mod telemetry;

pub use instrument::{instrument, ApiCall};
pub use telemetry::{MetricsTelemetrySink, TelemetrySink};
