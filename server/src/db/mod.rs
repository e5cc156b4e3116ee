//! Database Layer
//!
//! `PostgreSQL` connection, migrations and the [`Repository`] abstraction the
//! HTTP handlers persist through.

#[cfg(any(test, feature = "test-support"))]
pub mod memory;
mod models;
mod postgres;
mod queries;
mod repository;


use std::time::Duration;

use anyhow::Result;
pub use models::*;
pub use postgres::PgRepository;
pub use repository::{Repository, StoreError, StoreResult};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Create `PostgreSQL` connection pool with health configuration.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .min_connections(2)
        .max_connections(20)
        // Prevent hanging requests on pool exhaustion
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(600))
        .test_before_acquire(true)
        .connect(database_url)
        .await?;

    info!("Connected to PostgreSQL");
    Ok(pool)
}

/// Run database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed");
    Ok(())
}
