//! PostgreSQL persistence for Greenlight.
//!
//! Pool construction, migrations, and the [`repositories::PgMovieStore`]
//! implementation of the core `MovieStore` contract.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    /// Upper bound on open (in-use + idle) connections.
    pub max_open_conns: u32,
    /// Idle connections kept warm; capped at `max_open_conns`.
    pub max_idle_conns: u32,
    /// Idle connections older than this are closed.
    pub max_idle_time: Duration,
}

/// Create a connection pool, failing if no connection can be made within 5 seconds.
pub async fn create_pool(config: &DbConfig) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_open_conns)
        .min_connections(config.max_idle_conns.min(config.max_open_conns))
        .idle_timeout(config.max_idle_time)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.url)
        .await
}

/// Run a trivial query to verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
