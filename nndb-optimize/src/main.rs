//! nndb-optimize - micronutrient food combination search
//!
//! `select` exports foods from an imported collection to a JSON-lines file,
//! `run` searches for food combinations that cover micronutrient targets,
//! and `food-scores` ranks every food on its own.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use nndb_common::config::{
    load_toml_config, resolve_collection, resolve_database_path, TomlConfig,
};
use nndb_common::FoodDocument;
use nndb_optimize::micros::ALL_MICROS;
use nndb_optimize::selector::{read_foods, select_foods, write_foods_file};
use nndb_optimize::{runner, FoodCriteria, GaParams, OptEngine};
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::info;

/// Command-line arguments for nndb-optimize
#[derive(Parser, Debug)]
#[command(name = "nndb-optimize")]
#[command(about = "Search for food combinations that meet micronutrient targets")]
#[command(version)]
struct Cli {
    /// TOML config file (defaults to ~/.config/nndb/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export the selected foods as JSON lines
    Select {
        #[command(flatten)]
        source: SourceArgs,

        /// File to write
        #[arg(long, default_value = "foods.jsonl")]
        output: PathBuf,
    },

    /// Run the genetic search
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Generations after warm-up (overrides config)
        #[arg(long)]
        generations: Option<usize>,

        /// Random seed for a repeatable run (overrides config)
        #[arg(long)]
        seed: Option<u64>,

        /// File receiving first sightings of top solutions
        #[arg(long, default_value = "results")]
        results: PathBuf,
    },

    /// Score and rank every selected food on its own
    FoodScores {
        #[command(flatten)]
        source: SourceArgs,
    },
}

/// Where foods come from: a JSON-lines file, or the database
#[derive(Args, Debug)]
struct SourceArgs {
    /// Read foods from a JSON-lines file instead of the database
    #[arg(long)]
    input: Option<PathBuf>,

    /// SQLite document store to read
    #[arg(long)]
    database: Option<PathBuf>,

    /// Collection to read
    #[arg(long)]
    collection: Option<String>,

    /// Food group code to include (repeatable, overrides config)
    #[arg(long = "food-group")]
    food_groups: Vec<String>,

    /// Include foods whose nutrient data is not survey complete
    #[arg(long)]
    all_foods: bool,
}

impl SourceArgs {
    fn criteria(&self, toml_config: &TomlConfig) -> FoodCriteria {
        let mut criteria = FoodCriteria::from_config(&toml_config.selector);
        if !self.food_groups.is_empty() {
            criteria.food_groups = self.food_groups.clone();
        }
        if self.all_foods {
            criteria.survey_only = false;
        }
        criteria
    }

    async fn load(&self, toml_config: &TomlConfig) -> Result<Vec<FoodDocument>> {
        let criteria = self.criteria(toml_config);

        if let Some(input) = &self.input {
            info!("Reading input file {}", input.display());
            let foods = read_foods(input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            return Ok(criteria.filter(foods));
        }

        let db_path = resolve_database_path(self.database.as_deref(), toml_config);
        let collection = resolve_collection(self.collection.as_deref(), toml_config);
        info!("Reading collection {} from {}", collection, db_path.display());

        let pool = nndb_common::db::open_existing_database(&db_path)
            .await
            .context("Failed to open database")?;
        let foods = select_foods(&pool, &collection, &criteria)
            .await
            .context("Food selection failed")?;
        pool.close().await;

        Ok(foods)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let toml_config = load_toml_config(cli.config.as_deref())
        .context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&toml_config.logging.level)),
        )
        .init();

    info!(
        "Starting nndb-optimize v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match cli.command {
        Command::Select { source, output } => {
            let foods = source.load(&toml_config).await?;
            write_foods_file(&output, &foods)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            info!("Wrote {} foods to {}", foods.len(), output.display());
        }

        Command::Run {
            source,
            generations,
            seed,
            results,
        } => {
            let mut params = GaParams::from_config(&toml_config.optimizer);
            if let Some(generations) = generations {
                params.generations = generations;
            }
            if seed.is_some() {
                params.seed = seed;
            }

            let mut engine = build_engine(&source, &toml_config, params).await?;
            let generations = engine.params().generations;

            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&results)
                .with_context(|| format!("Failed to open {}", results.display()))?;

            let summary = runner::run(&mut engine, generations, &mut file)
                .with_context(|| format!("Failed to write {}", results.display()))?;
            info!(
                "Finished {} generations, best score {:.4}, {} solutions written to {}",
                summary.generations,
                summary.best_score,
                summary.first_sightings,
                results.display()
            );
        }

        Command::FoodScores { source } => {
            let params = GaParams::from_config(&toml_config.optimizer);
            let mut engine = build_engine(&source, &toml_config, params).await?;
            runner::log_food_scores(&mut engine);
        }
    }

    Ok(())
}

async fn build_engine(
    source: &SourceArgs,
    toml_config: &TomlConfig,
    params: GaParams,
) -> Result<OptEngine> {
    info!("Micronutrients used for calcs: {}", ALL_MICROS.len());

    let foods = source.load(toml_config).await?;
    let engine = OptEngine::new(foods, params).context("Failed to start optimizer")?;

    info!("Init population size: {}", engine.population().len());
    info!("Food matrix shape: ({}, {})", engine.food_count(), ALL_MICROS.len());

    Ok(engine)
}
