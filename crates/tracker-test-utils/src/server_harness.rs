//! Test server harness for E2E testing
//!
//! Provides `TestTrackerServer` for spawning real tracker server instances in
//! tests. Each server gets its own in-memory backend and its own Prometheus
//! handle, so tests never touch DynamoDB or the global metrics recorder.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracker_service::config::Config;
use tracker_service::observability::{MetricsTelemetrySink, TelemetrySink};
use tracker_service::repositories::InMemoryEpisodeBackend;
use tracker_service::routes::{self, AppState};
use tracker_service::services::EpisodeStore;

/// Region reported by test servers.
pub const TEST_REGION: &str = "test-region";

/// Table name reported by test servers.
pub const TEST_TABLE: &str = "tv_show_tracker_test";

/// Test harness for spawning the episode tracker in E2E tests.
///
/// # Example
/// ```rust,ignore
/// let backend = Arc::new(InMemoryEpisodeBackend::failing());
/// let server = TestTrackerServer::spawn_with_backend(backend).await?;
///
/// let response = reqwest::get(format!("{}/api/show_all", server.url())).await?;
/// assert_eq!(response.status(), 500);
/// ```
pub struct TestTrackerServer {
    addr: SocketAddr,
    backend: Arc<InMemoryEpisodeBackend>,
    config: Config,
    _handle: JoinHandle<()>,
}

impl TestTrackerServer {
    /// Spawn a server over an empty in-memory backend.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_backend(Arc::new(InMemoryEpisodeBackend::new())).await
    }

    /// Spawn a server over the given backend.
    ///
    /// The server binds to a random available port (127.0.0.1:0) and runs
    /// in the background until dropped.
    pub async fn spawn_with_backend(
        backend: Arc<InMemoryEpisodeBackend>,
    ) -> Result<Self, anyhow::Error> {
        Self::spawn_with_telemetry(backend, Arc::new(MetricsTelemetrySink)).await
    }

    /// Spawn a server with a custom telemetry sink.
    pub async fn spawn_with_telemetry(
        backend: Arc<InMemoryEpisodeBackend>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Result<Self, anyhow::Error> {
        let vars = HashMap::from([
            ("AWS_REGION".to_string(), TEST_REGION.to_string()),
            ("DYNAMODB_TABLE".to_string(), TEST_TABLE.to_string()),
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
            ("TRACKER_DRAIN_SECONDS".to_string(), "0".to_string()),
        ]);

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let state = Arc::new(AppState {
            config: config.clone(),
            store: EpisodeStore::new(backend.clone()),
            telemetry,
        });

        // Not installed globally; many servers can run in one test binary.
        let metrics_handle = PrometheusBuilder::new().build_recorder().handle();

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            backend,
            config,
            _handle: handle,
        })
    }

    /// Base URL of the test server, e.g. `http://127.0.0.1:41234`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Base URL of the episode API, e.g. `http://127.0.0.1:41234/api`.
    pub fn api_url(&self) -> String {
        format!("{}/api", self.url())
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The backend the server reads and writes.
    pub fn backend(&self) -> &Arc<InMemoryEpisodeBackend> {
        &self.backend
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for TestTrackerServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
