//! Database connection pool management

use std::time::Duration;

use anyhow::Context;
use bookstore_kernel::settings::DatabaseSettings;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

/// Connect options built field by field so credentials never need URL escaping.
pub fn connect_options(settings: &DatabaseSettings) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .database(&settings.name)
        .username(&settings.user)
        .password(settings.password.expose())
}

fn pool_options(settings: &DatabaseSettings) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
}

/// Create the process-wide pool and verify the database is reachable.
///
/// # Errors
///
/// Returns an error if no connection can be established within the
/// configured acquire timeout.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<PgPool> {
    tracing::info!(
        db = %settings.redacted_url(),
        max_connections = settings.max_connections,
        "connecting to database"
    );

    let pool = pool_options(settings)
        .connect_with(connect_options(settings))
        .await
        .with_context(|| format!("failed to connect to {}", settings.redacted_url()))?;

    Ok(pool)
}

/// Create a pool without opening any connection up front.
pub fn connect_lazy(settings: &DatabaseSettings) -> PgPool {
    pool_options(settings).connect_lazy_with(connect_options(settings))
}
