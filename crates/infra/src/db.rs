//! Postgres connection pool.

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::repositories::{RepositoryError, map_sqlx_error};

/// Create the process-wide pool. Connects eagerly so a bad URL fails startup.
///
/// Repositories check a connection out per statement; sqlx returns it to the
/// pool on every exit path.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, RepositoryError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))?;

    tracing::info!(max_connections = config.max_connections, "connected to postgres");
    Ok(pool)
}
