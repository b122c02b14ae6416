//! Default log filters for the tracker binaries.
//!
//! Library events use dotted targets (`tracker.api`, `tracker.store`,
//! `tracker.database`, ...) while each binary logs under its crate name, so
//! every default names both. `RUST_LOG` overrides the default when set.

use tracing_subscriber::EnvFilter;

/// Default filter for `tracker-service`.
pub const SERVICE_LOG_FILTER: &str = "tracker_service=debug,tracker=debug,tower_http=debug";

/// Default filter for `tracker-setup`.
pub const SETUP_LOG_FILTER: &str = "tracker_setup=info,tracker=info";

/// Default filter for `tracker-simulator`.
pub const SIMULATOR_LOG_FILTER: &str = "tracker_simulator=info,tracker=info";

/// `RUST_LOG` if set and valid, otherwise `default`.
pub fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}
