//! Import orchestration
//!
//! Runs the whole pipeline for one SR27 directory:
//! 1. Verify every distribution file is present
//! 2. Read the code tables (food groups, LanguaL, source/derivation codes,
//!    data sources, nutrient definitions)
//! 3. Create one document per food, then attach weights, LanguaL factors,
//!    footnotes, data-source citations and nutrient values
//! 4. Replace the target collection with the joined documents
//!
//! Each run is recorded in `import_runs` with its final statistics.

use crate::error::{ImportError, ImportResult};
use crate::models::ImportStats;
use crate::readers::{
    self, files, records, DataSource, DataSourceLink, FoodDescription, LangualLink,
    NutrientDefinition, NutrientValue,
};
use crate::services::joiner::{Joiner, Lookups};
use crate::services::loader::replace_collection;
use nndb_common::db::{save_run, ImportRun};
use nndb_common::models::{Footnote, LangualEntry, Measure};
use nndb_common::FoodDocument;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{info, warn};

const FOOD_PROGRESS_EVERY: usize = 3_000;
const LINK_PROGRESS_EVERY: usize = 10_000;
const DETAIL_PROGRESS_EVERY: usize = 50_000;

/// Fail early, naming every distribution file missing from `dir`
pub fn verify_source_dir(dir: &Path) -> ImportResult<()> {
    let missing: Vec<String> = files::ALL
        .iter()
        .filter(|name| !dir.join(name).is_file())
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ImportError::MissingFiles {
            dir: dir.to_path_buf(),
            files: missing,
        })
    }
}

/// Read every code table the joiner resolves against
pub fn load_lookups(dir: &Path) -> ImportResult<Lookups> {
    info!("Reading food group codes");
    let food_groups = readers::read_lookup(&dir.join(files::FD_GROUP))?;

    info!("Reading LanguaL codes");
    let langual = readers::read_keyed::<LangualEntry, _>(dir, |e| e.code.clone())?;

    info!("Reading source code descrips");
    let source_codes = readers::read_lookup(&dir.join(files::SRC_CD))?;

    info!("Reading data derivation code descrips");
    let derivation_codes = readers::read_lookup(&dir.join(files::DERIV_CD))?;

    info!("Reading data sources for footnotes");
    let data_sources = readers::read_keyed::<DataSource, _>(dir, |s| s.datasrc_id.clone())?;

    info!("Reading nutrient defs");
    let nutrient_defs =
        readers::read_keyed::<NutrientDefinition, _>(dir, |d| d.nutrient_id.clone())?;

    Ok(Lookups {
        food_groups,
        langual,
        source_codes,
        derivation_codes,
        data_sources,
        nutrient_defs,
    })
}

/// Parse and join a directory into food documents without touching the database
pub fn build_documents(dir: &Path) -> ImportResult<(Vec<FoodDocument>, ImportStats)> {
    verify_source_dir(dir)?;
    let lookups = load_lookups(dir)?;
    let mut joiner = Joiner::new();

    info!("Creating entries...");
    for item in records::<FoodDescription>(dir)? {
        let (line, food) = item?;
        joiner.add_food(line, food, &lookups)?;
        if joiner.food_count() % FOOD_PROGRESS_EVERY == 0 {
            info!("  Created {:7}", joiner.food_count());
        }
    }
    info!("...Total foods created: {}", joiner.food_count());

    info!("Loading weights/measures");
    let mut count = 0usize;
    for item in records::<Measure>(dir)? {
        let (_, measure) = item?;
        joiner.attach_measure(measure);
        count += 1;
        if count % LINK_PROGRESS_EVERY == 0 {
            info!("  weights: {:7}", count);
        }
    }
    info!("...Total weights read: {}", count);

    info!("Loading LanguaL codes");
    count = 0;
    for item in records::<LangualLink>(dir)? {
        let (line, link) = item?;
        joiner.attach_langual(line, link, &lookups)?;
        count += 1;
        if count % LINK_PROGRESS_EVERY == 0 {
            info!("  LanguaL items: {:7}", count);
        }
    }
    info!("...Total codes read: {}", count);

    info!("Adding footnotes to food items");
    count = 0;
    for item in records::<Footnote>(dir)? {
        let (_, footnote) = item?;
        joiner.attach_footnote(footnote);
        count += 1;
        if count % DETAIL_PROGRESS_EVERY == 0 {
            info!("  footnotes: {:7}", count);
        }
    }
    info!("...Total footnotes: {:7}", count);

    info!("Adding data sources to food items as footnotes");
    count = 0;
    for item in records::<DataSourceLink>(dir)? {
        let (line, link) = item?;
        joiner.attach_data_source(line, link, &lookups)?;
        count += 1;
        if count % DETAIL_PROGRESS_EVERY == 0 {
            info!("  data sources: {:7}", count);
        }
    }
    info!("...Total data sources: {:7}", count);

    info!("Loading nutrition items");
    count = 0;
    for item in records::<NutrientValue>(dir)? {
        let (line, value) = item?;
        joiner.attach_nutrient(line, value, &lookups)?;
        count += 1;
        if count % DETAIL_PROGRESS_EVERY == 0 {
            info!("  nutrient items: {:7}", count);
        }
    }
    info!("...Total nutrient items: {:7}", count);

    let (docs, stats) = joiner.finish();
    if stats.orphans() > 0 {
        warn!(
            "Dropped {} rows referencing unknown foods (weights {}, LanguaL {}, footnotes {}, data sources {}, nutrients {})",
            stats.orphans(),
            stats.measures.orphaned,
            stats.langual.orphaned,
            stats.footnotes.orphaned,
            stats.data_sources.orphaned,
            stats.nutrients.orphaned,
        );
    }

    Ok((docs, stats))
}

/// Import `dir` into `collection`, replacing its previous contents
pub async fn import_directory(
    pool: &SqlitePool,
    dir: &Path,
    collection: &str,
) -> ImportResult<ImportStats> {
    let mut run = ImportRun::start(collection, &dir.display().to_string());
    save_run(pool, &run).await?;
    info!("Import run {} started", run.run_id);

    let result = build_and_load(pool, dir, collection).await;

    match &result {
        Ok(stats) => {
            run.complete(serde_json::to_value(stats).unwrap_or_default());
        }
        Err(e) => run.fail(e.to_string()),
    }

    if let Err(e) = save_run(pool, &run).await {
        warn!("Failed to record import run {}: {}", run.run_id, e);
    }

    result
}

async fn build_and_load(
    pool: &SqlitePool,
    dir: &Path,
    collection: &str,
) -> ImportResult<ImportStats> {
    let (docs, mut stats) = build_documents(dir)?;

    let outcome = replace_collection(pool, collection, &docs).await?;
    stats.removed = outcome.removed;
    stats.inserted = outcome.inserted;

    Ok(stats)
}

/// Log the end-of-run summary
pub fn log_summary(stats: &ImportStats) {
    info!("...Total Records Seen: {}", stats.foods);
    info!("...Total Inserts Seen: {}", stats.inserted);
    info!("Survey stats:");
    for line in stats.survey_lines() {
        info!("  {}", line);
    }
    info!("Weights: {}", stats.measures);
    info!("LanguaL: {}", stats.langual);
    info!("Footnotes: {}", stats.footnotes);
    info!("Data sources: {}", stats.data_sources);
    info!("Nutrients: {}", stats.nutrients);
}
