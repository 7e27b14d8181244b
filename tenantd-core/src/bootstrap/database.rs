//! Catalog database initialization

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{error, info};

use crate::Config;

/// Initialize the shared catalog connection pool
///
/// The connection string is a secret and is never logged; only the provider
/// name appears in the startup output.
pub async fn init_catalog_pool(config: &Config) -> Result<PgPool> {
    info!(provider = %config.database.provider, "Connecting to catalog database");

    let pool: PgPool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.database.idle_timeout_seconds))
        .connect(config.database.url.as_str())
        .await
        .map_err(|e| {
            error!("Failed to connect to catalog database: {e}");
            anyhow::anyhow!("Catalog connection failed: {e}")
        })?;

    info!("Catalog database connected");

    Ok(pool)
}
