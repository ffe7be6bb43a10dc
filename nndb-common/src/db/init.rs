//! Database initialization
//!
//! Opens (or creates) the SQLite document store and makes sure the
//! document and import-run tables exist. Safe to call on every start.

use crate::{Error, Result};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open the document store, creating the file and tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL keeps readers unblocked while an import rewrites a collection
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Open an existing document store read-only
///
/// Readers use this so a mistyped path fails instead of creating an empty
/// store.
pub async fn open_existing_database(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.is_file() {
        return Err(Error::NotFound(format!(
            "database {}",
            db_path.display()
        )));
    }

    let db_url = format!("sqlite://{}?mode=ro", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    info!("Opened database read-only: {}", db_path.display());
    Ok(pool)
}

/// Create all document store tables (idempotent)
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_food_documents_table(pool).await?;
    create_import_runs_table(pool).await?;
    Ok(())
}

/// Create the food_documents table
///
/// The full document lives in `document` as JSON. `food_group_code` and
/// `survey` are copied out so the selector can filter without parsing.
pub async fn create_food_documents_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS food_documents (
            collection TEXT NOT NULL,
            ndb_num TEXT NOT NULL,
            food_group_code TEXT NOT NULL,
            survey TEXT NOT NULL DEFAULT '',
            document TEXT NOT NULL,
            imported_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (collection, ndb_num)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_food_documents_selection
        ON food_documents (collection, food_group_code, survey)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the import_runs table
pub async fn create_import_runs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS import_runs (
            run_id TEXT PRIMARY KEY,
            collection TEXT NOT NULL,
            source_dir TEXT NOT NULL,
            status TEXT NOT NULL,
            stats TEXT,
            error TEXT,
            started_at TEXT NOT NULL,
            ended_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
