//! Database connection pool management.

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::time::Duration;

/// Pool settings handed over by the API configuration.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// Connection options for `settings.url` with every session pinned to UTC,
/// matching the UTC timestamps the API reads and writes.
pub fn connect_options(settings: &PoolSettings) -> Result<PgConnectOptions, sqlx::Error> {
    let options: PgConnectOptions = settings.url.parse()?;
    Ok(options.options([("TimeZone", "UTC")]))
}

/// Creates a PostgreSQL connection pool.
///
/// Connections are checked out per query and returned when the query
/// finishes, on success and on error alike.
pub async fn create_pool(settings: &PoolSettings) -> Result<PgPool, sqlx::Error> {
    let options = connect_options(settings)?;
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(settings.idle_timeout_secs))
        .connect_with(options)
        .await
}
