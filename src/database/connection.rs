use std::time::Duration;

use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::Client;
use tracing::{error, info};

use crate::config::DatabaseSettings;
use crate::error::AppError;

const APP_NAME: &str = "btc-price-tracker";

/// Builds a client for `settings.uri` and pings the server, so an unreachable
/// host fails here rather than on the first write. Timeouts given in the URI
/// take precedence over `settings.timeout_seconds`.
pub async fn establish_connection(settings: &DatabaseSettings) -> Result<Client, AppError> {
    info!("Establishing MongoDB connection");

    let mut options = ClientOptions::parse(&settings.uri).await.map_err(|e| {
        error!("Invalid MongoDB connection string: {}", e);
        AppError::PersistenceError(format!("Invalid connection string: {}", e))
    })?;

    let timeout = Duration::from_secs(settings.timeout_seconds);
    options.server_selection_timeout.get_or_insert(timeout);
    options.connect_timeout.get_or_insert(timeout);
    options.app_name.get_or_insert_with(|| APP_NAME.to_string());

    let client = Client::with_options(options).map_err(|e| {
        error!("Failed to create MongoDB client: {}", e);
        AppError::PersistenceError(format!("Client creation failed: {}", e))
    })?;

    test_connection(&client).await?;

    info!("MongoDB connection established successfully");
    Ok(client)
}

pub async fn test_connection(client: &Client) -> Result<(), AppError> {
    client
        .database("admin")
        .run_command(doc! { "ping": 1 }, None)
        .await
        .map_err(|e| {
            error!("Failed to connect to MongoDB: {}", e);
            AppError::PersistenceError(format!("Connection failed: {}", e))
        })?;

    info!("MongoDB connection test successful");
    Ok(())
}
