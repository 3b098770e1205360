//! Database schema and upgrades
//!
//! This module creates the vocabulary table on first open and rebuilds it
//! when the stored schema version is older than [`SCHEMA_VERSION`].
//! Rebuilding drops every cached vocabulary; the next sync repopulates it.

use crate::error::Result;
use sqlx::{sqlite::SqlitePool, Row};

/// Current version of the vocabulary table layout
pub const SCHEMA_VERSION: i32 = 1;

const CREATE_VOCABULARY: &str = include_str!("migrations/001_vocabulary.sql");

/// Initialize database with schema
pub async fn initialize_database(pool: &SqlitePool) -> Result<()> {
    tracing::info!("Initializing database schema");

    // WAL keeps readers unblocked while a sync rewrites the table
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    migrate_to(pool, SCHEMA_VERSION).await?;

    tracing::info!("Database initialization complete");
    Ok(())
}

async fn current_version(pool: &SqlitePool) -> Result<i32> {
    let version: i32 = sqlx::query("SELECT COALESCE(MAX(version), 0) FROM migrations")
        .fetch_one(pool)
        .await?
        .get(0);

    Ok(version)
}

async fn migrate_to(pool: &SqlitePool, target_version: i32) -> Result<()> {
    let current = current_version(pool).await?;
    tracing::info!("Current database version: {}", current);

    if current >= target_version {
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    if current > 0 {
        tracing::warn!(
            "Upgrading vocabulary table from version {} to {}; cached vocabularies are dropped",
            current,
            target_version
        );
        sqlx::query("DROP TABLE IF EXISTS vocabulary")
            .execute(&mut *tx)
            .await?;
    }

    for statement in CREATE_VOCABULARY.split(';').filter(|s| !s.trim().is_empty()) {
        sqlx::query(statement).execute(&mut *tx).await?;
    }

    sqlx::query("INSERT INTO migrations (version) VALUES (?)")
        .bind(target_version)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!("Schema version {} applied successfully", target_version);
    Ok(())
}
