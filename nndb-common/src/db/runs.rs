//! Import run bookkeeping
//!
//! Each importer invocation records one row so repeated loads of a
//! collection can be audited after the fact.

use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Lifecycle of an import run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "RUNNING",
            RunStatus::Completed => "COMPLETED",
            RunStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "RUNNING" => Ok(RunStatus::Running),
            "COMPLETED" => Ok(RunStatus::Completed),
            "FAILED" => Ok(RunStatus::Failed),
            other => Err(Error::Internal(format!("Unknown run status: {}", other))),
        }
    }
}

/// One import of a source directory into a collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRun {
    pub run_id: Uuid,
    pub collection: String,
    pub source_dir: String,
    pub status: RunStatus,
    /// Importer statistics, stored as JSON
    pub stats: Option<serde_json::Value>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl ImportRun {
    /// Start a new run
    pub fn start(collection: &str, source_dir: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            collection: collection.to_string(),
            source_dir: source_dir.to_string(),
            status: RunStatus::Running,
            stats: None,
            error: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Mark the run completed with its statistics
    pub fn complete(&mut self, stats: serde_json::Value) {
        self.status = RunStatus::Completed;
        self.stats = Some(stats);
        self.ended_at = Some(Utc::now());
    }

    /// Mark the run failed
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = RunStatus::Failed;
        self.error = Some(error.into());
        self.ended_at = Some(Utc::now());
    }
}

/// Insert or update an import run
pub async fn save_run(pool: &SqlitePool, run: &ImportRun) -> Result<()> {
    let stats = run.stats.as_ref().map(serde_json::to_string).transpose()?;

    sqlx::query(
        r#"
        INSERT INTO import_runs (run_id, collection, source_dir, status, stats, error, started_at, ended_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(run_id) DO UPDATE SET
            status = excluded.status,
            stats = excluded.stats,
            error = excluded.error,
            ended_at = excluded.ended_at
        "#,
    )
    .bind(run.run_id.to_string())
    .bind(&run.collection)
    .bind(&run.source_dir)
    .bind(run.status.as_str())
    .bind(&stats)
    .bind(&run.error)
    .bind(format_timestamp(&run.started_at))
    .bind(run.ended_at.as_ref().map(format_timestamp))
    .execute(pool)
    .await?;

    Ok(())
}

/// Most recent run for a collection
pub async fn latest_run(pool: &SqlitePool, collection: &str) -> Result<Option<ImportRun>> {
    let row = sqlx::query(
        r#"
        SELECT run_id, collection, source_dir, status, stats, error, started_at, ended_at
        FROM import_runs
        WHERE collection = ?
        ORDER BY started_at DESC, rowid DESC
        LIMIT 1
        "#,
    )
    .bind(collection)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let run_id: String = row.get("run_id");
    let status: String = row.get("status");
    let stats: Option<String> = row.get("stats");
    let started_at: String = row.get("started_at");
    let ended_at: Option<String> = row.get("ended_at");

    Ok(Some(ImportRun {
        run_id: Uuid::parse_str(&run_id)
            .map_err(|e| Error::Internal(format!("Invalid run id {}: {}", run_id, e)))?,
        collection: row.get("collection"),
        source_dir: row.get("source_dir"),
        status: RunStatus::parse(&status)?,
        stats: stats.map(|s| serde_json::from_str(&s)).transpose()?,
        error: row.get("error"),
        started_at: parse_timestamp(&started_at)?,
        ended_at: ended_at.as_deref().map(parse_timestamp).transpose()?,
    }))
}

/// Fixed-width timestamps so text ordering matches time ordering
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Invalid timestamp {}: {}", s, e)))
}
