//! Table provisioning for the `tracker-setup` binary.
//!
//! Creates the episode table (`username` HASH, `tv_show` RANGE, on-demand
//! billing) if it does not already exist, waits for it to become active and
//! optionally writes a few sample records.

use crate::errors::TrackerError;
use crate::models::EpisodeRecord;
use crate::repositories::{EpisodeBackend, TV_SHOW_ATTRIBUTE, USERNAME_ATTRIBUTE};
use aws_sdk_dynamodb::error::{BuildError, DisplayErrorContext};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType, TableStatus,
};
use aws_sdk_dynamodb::Client;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Table name used when none is given on the command line.
pub const DEFAULT_TABLE_NAME: &str = "tv_show_tracker";

const SAMPLE_DATA_FLAG: &str = "--sample-data";

/// Delay between table status polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Give up waiting for the table after this long.
pub const ACTIVE_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unexpected argument: {0}")]
    UnexpectedArgument(String),

    #[error("Invalid table definition: {0}")]
    InvalidDefinition(String),

    #[error("DynamoDB request failed: {0}")]
    Request(String),

    #[error("Table {0} did not become active in time")]
    NotActive(String),

    #[error("Failed to write sample data: {0}")]
    SampleData(#[from] TrackerError),
}

impl From<BuildError> for SetupError {
    fn from(err: BuildError) -> Self {
        SetupError::InvalidDefinition(err.to_string())
    }
}

/// Options for one setup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupOptions {
    pub table_name: String,
    pub region: String,
    pub endpoint_url: Option<String>,
    pub sample_data: bool,
}

impl SetupOptions {
    /// Build options from `[table] [--sample-data]` plus the environment.
    pub fn from_args<I>(args: I, vars: &HashMap<String, String>) -> Result<Self, SetupError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut table_name = None;
        let mut sample_data = false;

        for arg in args {
            if arg == SAMPLE_DATA_FLAG {
                sample_data = true;
            } else if arg.starts_with('-') || table_name.is_some() {
                return Err(SetupError::UnexpectedArgument(arg));
            } else {
                table_name = Some(arg);
            }
        }

        let region = vars
            .get("AWS_REGION")
            .filter(|v| !v.trim().is_empty())
            .cloned()
            .ok_or_else(|| SetupError::MissingEnvVar("AWS_REGION".to_string()))?;

        Ok(Self {
            table_name: table_name.unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string()),
            region,
            endpoint_url: vars
                .get("DYNAMODB_ENDPOINT_URL")
                .filter(|v| !v.trim().is_empty())
                .cloned(),
            sample_data,
        })
    }
}

/// Outcome of `create_table`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableCreation {
    Created,
    AlreadyExists,
}

/// Create the episode table. An existing table is not an error.
pub async fn create_table(client: &Client, table_name: &str) -> Result<TableCreation, SetupError> {
    let result = client
        .create_table()
        .table_name(table_name)
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name(USERNAME_ATTRIBUTE)
                .key_type(KeyType::Hash)
                .build()?,
        )
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name(TV_SHOW_ATTRIBUTE)
                .key_type(KeyType::Range)
                .build()?,
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(USERNAME_ATTRIBUTE)
                .attribute_type(ScalarAttributeType::S)
                .build()?,
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(TV_SHOW_ATTRIBUTE)
                .attribute_type(ScalarAttributeType::S)
                .build()?,
        )
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await;

    match result {
        Ok(_) => {
            info!(target: "tracker.setup", table = %table_name, "Table creation started");
            Ok(TableCreation::Created)
        }
        Err(err)
            if err
                .as_service_error()
                .is_some_and(|e| e.is_resource_in_use_exception()) =>
        {
            info!(target: "tracker.setup", table = %table_name, "Table already exists");
            Ok(TableCreation::AlreadyExists)
        }
        Err(err) => Err(SetupError::Request(DisplayErrorContext(err).to_string())),
    }
}

/// Poll the table status until it is `ACTIVE`.
pub async fn wait_until_active(client: &Client, table_name: &str) -> Result<(), SetupError> {
    let deadline = tokio::time::Instant::now() + ACTIVE_TIMEOUT;

    loop {
        let output = client
            .describe_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(|e| SetupError::Request(DisplayErrorContext(e).to_string()))?;

        let status = output.table().and_then(|t| t.table_status()).cloned();
        if status == Some(TableStatus::Active) {
            info!(target: "tracker.setup", table = %table_name, "Table is active");
            return Ok(());
        }

        if tokio::time::Instant::now() >= deadline {
            return Err(SetupError::NotActive(table_name.to_string()));
        }

        info!(
            target: "tracker.setup",
            table = %table_name,
            status = ?status,
            "Waiting for table to become active"
        );
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Records written by `--sample-data`.
pub fn sample_records() -> Vec<EpisodeRecord> {
    let sample = |username: &str, show: &str, season, episode, ts| EpisodeRecord {
        username: username.to_string(),
        show_title: show.to_string(),
        season,
        episode,
        last_updated: ts,
    };

    vec![
        sample(
            "john_doe",
            "Breaking Bad",
            3,
            7,
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).single(),
        ),
        sample(
            "john_doe",
            "The Office",
            5,
            12,
            Utc.with_ymd_and_hms(2024, 1, 14, 20, 15, 0).single(),
        ),
        sample(
            "jane_smith",
            "Stranger Things",
            4,
            3,
            Utc.with_ymd_and_hms(2024, 1, 16, 14, 45, 0).single(),
        ),
    ]
}

/// Write the sample records through `backend`. Returns how many were written.
pub async fn load_sample_data(backend: &dyn EpisodeBackend) -> Result<usize, SetupError> {
    let records = sample_records();
    for record in &records {
        backend.put_item(record).await?;
        info!(
            target: "tracker.setup",
            username = %record.username,
            tv_show = %record.show_title,
            "Added sample record"
        );
    }
    Ok(records.len())
}
