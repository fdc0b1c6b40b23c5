//! Postgres persistence for the prompt pipeline engine.
//!
//! `models` holds `FromRow` entities and create DTOs; `repositories`
//! holds one unit-struct repository per table. Migrations live in
//! `migrations/` and run via `sqlx::migrate!`.

pub mod models;
pub mod repositories;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Default maximum connections for the engine's pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Connect to Postgres and run pending migrations.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(DEFAULT_MAX_CONNECTIONS)
        .connect(database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

/// Cheap connectivity probe.
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
