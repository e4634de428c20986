//! Postgres persistence for movies, users, tokens and permissions.
//!
//! Every repository call runs under [`storage::QUERY_TIMEOUT`] and maps
//! driver failures onto [`greenlight_core::error::CoreError`].

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;
pub mod storage;

pub type DbPool = sqlx::PgPool;

/// Idle connections are closed after this long.
const IDLE_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .idle_timeout(IDLE_TIMEOUT)
        .acquire_timeout(storage::QUERY_TIMEOUT)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|_| ())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
