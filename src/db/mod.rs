mod admins;
mod models;
mod seed;

pub use admins::{AdminStore, NewAdmin};
pub use models::*;
pub use seed::seed_super_admin;

use anyhow::{Context, Result};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

pub type DbPool = SqlitePool;

/// Execute a SQL migration file, properly handling comments.
///
/// Comment lines are dropped before the statement split so punctuation
/// inside a comment never ends up executed as SQL.
async fn execute_sql(pool: &SqlitePool, sql: &str) -> Result<()> {
    let cleaned: String = sql
        .lines()
        .filter(|line| !line.trim().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    for statement in cleaned.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }
    Ok(())
}

pub async fn init(data_dir: &Path) -> Result<DbPool> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    let db_path = data_dir.join("gatekeepr.db");
    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    info!("Initializing database at {}", db_path.display());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    // Enable WAL mode for better concurrency
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // Run migrations
    run_migrations(&pool).await?;

    info!("Database initialized successfully");
    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Running database migrations...");

    // Migration 001: Admin accounts
    execute_sql(pool, include_str!("../../migrations/001_admins.sql")).await?;

    // Migration 002: Add optional phone contact
    let has_phone: Option<(String,)> =
        sqlx::query_as("SELECT name FROM pragma_table_info('admins') WHERE name = 'phone'")
            .fetch_optional(pool)
            .await?;
    if has_phone.is_none() {
        execute_sql(pool, include_str!("../../migrations/002_phone.sql")).await?;
    }

    info!("Migrations completed");
    Ok(())
}

/// Fresh in-memory database for tests. A single never-recycled connection
/// keeps the data alive for the life of the pool.
#[cfg(test)]
pub(crate) async fn test_pool() -> DbPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    run_migrations(&pool).await.expect("migrations");
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_execute_sql_drops_comments_before_splitting() {
        let pool = test_pool().await;

        // Semicolons inside comment lines must not produce statements
        let sql = "-- scratch table; holds nothing durable\n\
                   CREATE TABLE scratch (id INTEGER PRIMARY KEY);\n\
                   -- seed row; id 1\n\
                   INSERT INTO scratch (id) VALUES (1);";
        execute_sql(&pool, sql).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scratch")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_migrations_rerun_is_a_noop() {
        let pool = test_pool().await;
        // test_pool already migrated once; a second pass must not fail
        run_migrations(&pool).await.unwrap();
    }
}
