pub mod reflect;
pub mod rows;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors talking to the store after startup.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Open the connection pool. The pool is bounded and checks connection
/// liveness before handing one out, so stale connections are replaced
/// instead of surfacing as query errors.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .test_before_acquire(true)
        .connect(&config.url)
        .await?;

    info!("connected to {}", config.redacted_url());
    Ok(pool)
}
