//! nndb-import - SR27 nutrient database importer
//!
//! Loads the USDA National Nutrient Database (SR27) ASCII files from a
//! directory into a document store collection. Previous contents of the
//! collection are replaced.

use anyhow::{Context, Result};
use clap::Parser;
use nndb_common::config::{load_toml_config, resolve_collection, resolve_database_path};
use nndb_import::services::{build_documents, import_directory, log_summary};
use std::path::PathBuf;
use tracing::info;

/// Command-line arguments for nndb-import
#[derive(Parser, Debug)]
#[command(name = "nndb-import")]
#[command(about = "Load SR27 nutrient database files into a document collection")]
#[command(version)]
struct Args {
    /// Directory containing the SR27 ASCII data files
    targetdir: PathBuf,

    /// SQLite document store to write
    #[arg(long)]
    database: Option<PathBuf>,

    /// Collection to load (previous data will be deleted)
    #[arg(long)]
    collection: Option<String>,

    /// TOML config file (defaults to ~/.config/nndb/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Parse and join without writing to the database
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = load_toml_config(args.config.as_deref())
        .context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&toml_config.logging.level)),
        )
        .init();

    info!(
        "Starting nndb-import v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    info!("Processing files using directory {}", args.targetdir.display());

    if args.dry_run {
        let (docs, stats) = build_documents(&args.targetdir)
            .with_context(|| format!("Failed to read {}", args.targetdir.display()))?;
        info!("Dry run: {} documents built, nothing written", docs.len());
        log_summary(&stats);
        return Ok(());
    }

    let db_path = resolve_database_path(args.database.as_deref(), &toml_config);
    let collection = resolve_collection(args.collection.as_deref(), &toml_config);

    info!("Database: {}", db_path.display());
    let pool = nndb_common::db::init_database(&db_path)
        .await
        .context("Failed to open database")?;

    info!("Using collection {}", collection);
    let stats = import_directory(&pool, &args.targetdir, &collection)
        .await
        .context("Import failed")?;

    log_summary(&stats);
    info!("Import complete");

    Ok(())
}
