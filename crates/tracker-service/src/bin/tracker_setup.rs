//! Episode table setup
//!
//! Usage: `tracker-setup [table] [--sample-data]`

use std::env;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracker_service::observability::logging::{env_filter, SETUP_LOG_FILTER};
use tracker_service::repositories::dynamodb::build_client;
use tracker_service::repositories::DynamoDbEpisodeBackend;
use tracker_service::setup::{self, SetupOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(env_filter(SETUP_LOG_FILTER))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = SetupOptions::from_args(env::args().skip(1), &env::vars().collect())
        .map_err(|e| {
            error!("Invalid setup options: {}", e);
            e
        })?;

    info!(
        table = %options.table_name,
        region = %options.region,
        sample_data = options.sample_data,
        "Setting up episode table"
    );

    let client = build_client(&options.region, options.endpoint_url.as_deref()).await;

    setup::create_table(&client, &options.table_name).await?;
    setup::wait_until_active(&client, &options.table_name).await?;

    if options.sample_data {
        let backend = DynamoDbEpisodeBackend::new(client, options.table_name.clone());
        let written = setup::load_sample_data(&backend).await?;
        info!(records = written, "Sample data added");
    }

    info!(
        "Setup complete. Run the service with DYNAMODB_TABLE={}",
        options.table_name
    );

    Ok(())
}
