//! Episode tracker traffic simulator
//!
//! Issues one random API call per interval against a running server until
//! interrupted.

use anyhow::Context;
use std::env;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracker_service::observability::logging::{env_filter, SIMULATOR_LOG_FILTER};
use tracker_service::simulator::{Simulator, SimulatorConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(SIMULATOR_LOG_FILTER))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = SimulatorConfig::from_vars(&env::vars().collect())
        .context("Failed to load simulator configuration")?;
    let simulator =
        Simulator::new(config.api_url.clone()).context("Failed to build HTTP client")?;

    info!(
        api_url = %config.api_url,
        interval_seconds = config.interval.as_secs(),
        "Starting episode tracker simulator (Ctrl+C to stop)"
    );

    let mut ticker = tokio::time::interval(config.interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let _ = simulator.tick().await;
            }
            result = signal::ctrl_c() => {
                result.context("Failed to listen for SIGINT")?;
                info!("Simulator stopped");
                return Ok(());
            }
        }
    }
}
