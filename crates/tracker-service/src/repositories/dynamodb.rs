//! DynamoDB episode backend.
//!
//! Items are mapped with `serde_dynamo`:
//! - `username` (S, HASH)
//! - `tv_show` (S, RANGE)
//! - `season`, `episode` (N)
//! - `last_updated` (S, RFC 3339)
//!
//! SDK retries are disabled so every call is exactly one round trip.

use super::{EpisodeBackend, TV_SHOW_ATTRIBUTE, USERNAME_ATTRIBUTE};
use crate::config::Config;
use crate::errors::TrackerError;
use crate::models::EpisodeRecord;
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;
use tracing::info;

/// DynamoDB implementation of `EpisodeBackend`.
#[derive(Clone)]
pub struct DynamoDbEpisodeBackend {
    client: Client,
    table_name: String,
}

impl DynamoDbEpisodeBackend {
    /// Wrap an already configured client.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Build a client for the configured region, honoring the optional
    /// endpoint override.
    pub async fn from_config(config: &Config) -> Self {
        let client = build_client(&config.region, config.endpoint_url.as_deref()).await;
        info!(
            target: "tracker.store",
            table = %config.table_name,
            region = %config.region,
            "DynamoDB client initialized"
        );
        Self::new(client, config.table_name.clone())
    }

    fn key(username: &str, show_title: &str) -> HashMap<String, AttributeValue> {
        HashMap::from([
            (
                USERNAME_ATTRIBUTE.to_string(),
                AttributeValue::S(username.to_string()),
            ),
            (
                TV_SHOW_ATTRIBUTE.to_string(),
                AttributeValue::S(show_title.to_string()),
            ),
        ])
    }
}

/// Build a DynamoDB client with retries disabled.
pub async fn build_client(region: &str, endpoint_url: Option<&str>) -> Client {
    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .retry_config(RetryConfig::disabled())
        .load()
        .await;

    match endpoint_url {
        Some(endpoint) => {
            let dynamo_config = aws_sdk_dynamodb::config::Builder::from(&sdk_config)
                .endpoint_url(endpoint)
                .build();
            Client::from_conf(dynamo_config)
        }
        None => Client::new(&sdk_config),
    }
}

fn backend_error(operation: &str, err: impl std::error::Error) -> TrackerError {
    TrackerError::Backend(format!(
        "DynamoDB {} failed: {}",
        operation,
        DisplayErrorContext(err)
    ))
}

fn decode_error(err: serde_dynamo::Error) -> TrackerError {
    TrackerError::Backend(format!("Malformed episode item: {}", err))
}

#[async_trait]
impl EpisodeBackend for DynamoDbEpisodeBackend {
    async fn get_item(
        &self,
        username: &str,
        show_title: &str,
    ) -> Result<Option<EpisodeRecord>, TrackerError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key(username, show_title)))
            .send()
            .await
            .map_err(|e| backend_error("get_item", e))?;

        output
            .item
            .map(serde_dynamo::from_item)
            .transpose()
            .map_err(decode_error)
    }

    async fn query_partition(&self, username: &str) -> Result<Vec<EpisodeRecord>, TrackerError> {
        let output = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("#pk = :pk")
            .expression_attribute_names("#pk", USERNAME_ATTRIBUTE)
            .expression_attribute_values(":pk", AttributeValue::S(username.to_string()))
            .send()
            .await
            .map_err(|e| backend_error("query", e))?;

        serde_dynamo::from_items(output.items.unwrap_or_default()).map_err(decode_error)
    }

    async fn put_item(&self, record: &EpisodeRecord) -> Result<(), TrackerError> {
        let item: HashMap<String, AttributeValue> =
            serde_dynamo::to_item(record).map_err(decode_error)?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| backend_error("put_item", e))?;

        Ok(())
    }

    async fn scan(&self) -> Result<Vec<EpisodeRecord>, TrackerError> {
        let output = self
            .client
            .scan()
            .table_name(&self.table_name)
            .send()
            .await
            .map_err(|e| backend_error("scan", e))?;

        serde_dynamo::from_items(output.items.unwrap_or_default()).map_err(decode_error)
    }

    async fn ping(&self) -> Result<(), TrackerError> {
        self.client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
            .map_err(|e| backend_error("describe_table", e))?;

        Ok(())
    }
}
