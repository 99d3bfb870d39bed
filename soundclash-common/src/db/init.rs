//! Database initialization
//!
//! Opens (or creates) the SQLite database and creates the schema
//! idempotently. Tournaments are stored one document per row with the
//! contestant pool and round tree as JSON columns, so the document stays
//! the unit of consistency; vote logs are a separate append-only table.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL allows concurrent bracket reads while a vote or round
    // transition is being written
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes (idempotent - safe to call multiple times)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_tournaments_table(pool).await?;
    create_vote_logs_table(pool).await?;
    Ok(())
}

async fn create_tournaments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tournaments (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            voting_duration_minutes INTEGER NOT NULL,
            current_round_index INTEGER NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'draft',
            contestants TEXT NOT NULL DEFAULT '[]',
            rounds TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_vote_logs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS vote_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tournament_id TEXT NOT NULL,
            round_index INTEGER NOT NULL,
            match_id INTEGER NOT NULL,
            voter_fingerprint TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Covering index for the dedup lookup
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_vote_logs_dedup
        ON vote_logs (tournament_id, round_index, match_id, voter_fingerprint)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
