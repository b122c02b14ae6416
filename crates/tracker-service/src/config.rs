//! Episode tracker configuration.
//!
//! Configuration is loaded once at startup from environment variables and
//! shared with handlers through `AppState`. Missing required variables are a
//! fatal startup error, never a per-request error.

use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5000";

/// Default graceful shutdown drain period in seconds.
pub const DEFAULT_DRAIN_SECONDS: u64 = 5;

/// Episode tracker configuration.
#[derive(Clone)]
pub struct Config {
    /// DynamoDB region (e.g., "eu-central-1").
    pub region: String,

    /// DynamoDB table holding episode records.
    pub table_name: String,

    /// Server bind address (default: "0.0.0.0:5000").
    pub bind_address: String,

    /// Optional DynamoDB endpoint override for DynamoDB Local or LocalStack.
    pub endpoint_url: Option<String>,

    /// Seconds to wait for in-flight requests after a shutdown signal.
    pub drain_seconds: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("region", &self.region)
            .field("table_name", &self.table_name)
            .field("bind_address", &self.bind_address)
            .field("endpoint_url", &self.endpoint_url)
            .field("drain_seconds", &self.drain_seconds)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid drain period configuration: {0}")]
    InvalidDrainSeconds(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let region = required(vars, "AWS_REGION")?;
        let table_name = required(vars, "DYNAMODB_TABLE")?;

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let endpoint_url = vars
            .get("DYNAMODB_ENDPOINT_URL")
            .filter(|v| !v.trim().is_empty())
            .cloned();

        let drain_seconds = if let Some(value_str) = vars.get("TRACKER_DRAIN_SECONDS") {
            value_str.parse::<u64>().map_err(|e| {
                ConfigError::InvalidDrainSeconds(format!(
                    "TRACKER_DRAIN_SECONDS must be a non-negative integer, got '{}': {}",
                    value_str, e
                ))
            })?
        } else {
            DEFAULT_DRAIN_SECONDS
        };

        Ok(Config {
            region,
            table_name,
            bind_address,
            endpoint_url,
            drain_seconds,
        })
    }
}

/// Empty values are treated the same as absent ones.
fn required(vars: &HashMap<String, String>, name: &str) -> Result<String, ConfigError> {
    vars.get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn base_vars() -> HashMap<String, String> {
        HashMap::from([
            ("AWS_REGION".to_string(), "eu-central-1".to_string()),
            ("DYNAMODB_TABLE".to_string(), "tv_show_tracker".to_string()),
        ])
    }

    #[test]
    fn test_from_vars_success_with_defaults() {
        let config = Config::from_vars(&base_vars()).expect("Config should load successfully");

        assert_eq!(config.region, "eu-central-1");
        assert_eq!(config.table_name, "tv_show_tracker");
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.endpoint_url, None);
        assert_eq!(config.drain_seconds, DEFAULT_DRAIN_SECONDS);
    }

    #[test]
    fn test_from_vars_success_with_custom_values() {
        let mut vars = base_vars();
        vars.insert("BIND_ADDRESS".to_string(), "127.0.0.1:9000".to_string());
        vars.insert(
            "DYNAMODB_ENDPOINT_URL".to_string(),
            "http://localhost:8000".to_string(),
        );
        vars.insert("TRACKER_DRAIN_SECONDS".to_string(), "0".to_string());

        let config = Config::from_vars(&vars).expect("Config should load successfully");

        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.drain_seconds, 0);
    }

    #[test]
    fn test_from_vars_missing_region() {
        let mut vars = base_vars();
        vars.remove("AWS_REGION");

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "AWS_REGION"));
    }

    #[test]
    fn test_from_vars_missing_table() {
        let mut vars = base_vars();
        vars.remove("DYNAMODB_TABLE");

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "DYNAMODB_TABLE"));
    }

    #[test]
    fn test_from_vars_empty_table_is_missing() {
        let mut vars = base_vars();
        vars.insert("DYNAMODB_TABLE".to_string(), "  ".to_string());

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(v)) if v == "DYNAMODB_TABLE"));
    }

    #[test]
    fn test_empty_endpoint_url_is_ignored() {
        let mut vars = base_vars();
        vars.insert("DYNAMODB_ENDPOINT_URL".to_string(), String::new());

        let config = Config::from_vars(&vars).expect("Config should load successfully");
        assert_eq!(config.endpoint_url, None);
    }

    #[test]
    fn test_drain_seconds_rejects_non_numeric() {
        let mut vars = base_vars();
        vars.insert("TRACKER_DRAIN_SECONDS".to_string(), "soon".to_string());

        let result = Config::from_vars(&vars);
        assert!(
            matches!(result, Err(ConfigError::InvalidDrainSeconds(msg)) if msg.contains("non-negative integer"))
        );
    }

    #[test]
    fn test_drain_seconds_rejects_negative() {
        let mut vars = base_vars();
        vars.insert("TRACKER_DRAIN_SECONDS".to_string(), "-1".to_string());

        let result = Config::from_vars(&vars);
        assert!(matches!(result, Err(ConfigError::InvalidDrainSeconds(_))));
    }
}
