//! Food selection
//!
//! Narrows an imported collection down to the foods worth optimizing over:
//! a database filter on food group and survey flag, then a description
//! filter that drops prepared, processed and otherwise unhelpful items.
//! Selections travel between steps as JSON-lines files, one document per
//! line.

use crate::error::{OptimizeError, OptimizeResult};
use nndb_common::config::SelectorConfig;
use nndb_common::db::select_documents;
use nndb_common::FoodDocument;
use sqlx::SqlitePool;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Fruits, vegetables, nuts and seeds, legumes
pub const DEFAULT_FOOD_GROUPS: [&str; 4] = ["0900", "1100", "1200", "1600"];

/// Descriptions containing any of these are dropped
pub const DEFAULT_EXCLUDE_WORDS: [&str; 52] = [
    "applesauce",
    "bacon",
    "beverage",
    "breaded",
    "bulgur",
    "candied",
    "catsup",
    "celery flakes",
    "chili",
    "chowchow",
    "cilantro",
    "cocktail",
    "cornmeal",
    "cornstarch",
    "couscous",
    "dehydrated",
    "flour",
    "franks",
    "fried",
    "groats",
    "hash brown",
    "hominy",
    "hummus",
    "juice",
    "lambsquarters",
    "liquid from",
    "macaroni",
    "mashed",
    "meatless",
    "millet",
    "nectar",
    "noodles",
    "oil-roasted",
    "pork",
    "products",
    "puffs",
    "ranch",
    "relish",
    "rice",
    "soymilk",
    "spaghetti",
    "spread",
    "succotash",
    "syrup",
    "tapioca",
    "taro",
    "tomato products",
    "vegetables",
    "vegetarian",
    "veggie",
    "vermicelli",
    "wheat",
];

/// Descriptions with a comma-separated part equal to one of these are dropped
pub const DEFAULT_EXCLUDE_PARTS: [&str; 3] = ["sweet", "sweetened", "wheat"];

/// Which foods take part in an optimization
#[derive(Debug, Clone, PartialEq)]
pub struct FoodCriteria {
    /// Food group codes to keep; empty keeps every group
    pub food_groups: Vec<String>,
    /// Keep only foods whose survey flag is `Y`
    pub survey_only: bool,
    pub exclude_words: Vec<String>,
    pub exclude_parts: Vec<String>,
}

impl Default for FoodCriteria {
    fn default() -> Self {
        Self {
            food_groups: to_strings(&DEFAULT_FOOD_GROUPS),
            survey_only: true,
            exclude_words: to_strings(&DEFAULT_EXCLUDE_WORDS),
            exclude_parts: to_strings(&DEFAULT_EXCLUDE_PARTS),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl FoodCriteria {
    /// Defaults overridden by whatever the config file sets
    pub fn from_config(config: &SelectorConfig) -> Self {
        let defaults = Self::default();
        Self {
            food_groups: config.food_groups.clone().unwrap_or(defaults.food_groups),
            survey_only: config.survey_only.unwrap_or(defaults.survey_only),
            exclude_words: config
                .exclude_words
                .clone()
                .unwrap_or(defaults.exclude_words),
            exclude_parts: config
                .exclude_parts
                .clone()
                .unwrap_or(defaults.exclude_parts),
        }
    }

    /// Apply the description filter
    ///
    /// Matching is case-insensitive. Foods without a description never pass.
    pub fn accepts(&self, food: &FoodDocument) -> bool {
        let descrip = food.descrip.to_lowercase();
        if descrip.trim().is_empty() {
            return false;
        }

        if let Some(word) = self
            .exclude_words
            .iter()
            .find(|w| descrip.contains(&w.to_lowercase()))
        {
            debug!("Excluding {} ({}): contains '{}'", food.ndb_num, food.descrip, word);
            return false;
        }

        let excluded_part = descrip
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .any(|part| self.exclude_parts.iter().any(|p| p.eq_ignore_ascii_case(part)));
        if excluded_part {
            debug!("Excluding {} ({}): excluded description part", food.ndb_num, food.descrip);
            return false;
        }

        true
    }

    /// Drop foods that fail the description filter, keeping order
    pub fn filter(&self, foods: Vec<FoodDocument>) -> Vec<FoodDocument> {
        let before = foods.len();
        let kept: Vec<FoodDocument> = foods.into_iter().filter(|f| self.accepts(f)).collect();
        info!("Description filter kept {} of {} foods", kept.len(), before);
        kept
    }
}

/// Select foods from a collection: database filter, then description filter
pub async fn select_foods(
    pool: &SqlitePool,
    collection: &str,
    criteria: &FoodCriteria,
) -> OptimizeResult<Vec<FoodDocument>> {
    let docs = select_documents(
        pool,
        collection,
        &criteria.food_groups,
        criteria.survey_only,
    )
    .await?;

    info!(
        "Collection {} has {} foods in groups {:?} (survey only: {})",
        collection,
        docs.len(),
        criteria.food_groups,
        criteria.survey_only
    );

    Ok(criteria.filter(docs))
}

/// Read a JSON-lines food file; blank lines are skipped
pub fn read_foods(path: &Path) -> OptimizeResult<Vec<FoodDocument>> {
    let reader = BufReader::new(File::open(path)?);
    let mut foods = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let food: FoodDocument = serde_json::from_str(&line).map_err(|source| OptimizeError::Json {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        foods.push(food);
    }

    Ok(foods)
}

/// Write foods as JSON lines
pub fn write_foods<W: Write>(writer: W, foods: &[FoodDocument]) -> OptimizeResult<()> {
    let mut writer = BufWriter::new(writer);
    for food in foods {
        serde_json::to_writer(&mut writer, food).map_err(nndb_common::Error::from)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Write foods as JSON lines to `path`, replacing any existing file
pub fn write_foods_file(path: &Path, foods: &[FoodDocument]) -> OptimizeResult<()> {
    write_foods(File::create(path)?, foods)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn food(ndb_num: &str, descrip: &str) -> FoodDocument {
        let mut doc: FoodDocument = serde_json::from_value(serde_json::json!({
            "_id": ndb_num,
            "ndb_num": ndb_num,
            "food_group_code": "1100",
            "food_group_descrip": "Vegetables and Vegetable Products",
            "descrip": "",
            "short_descrip": "",
            "common_name": "",
            "mfg_name": "",
            "survey": "Y",
            "refuse_descrip": "",
            "refuse": null,
            "scientific_name": "",
            "n_factor": null,
            "protein_factor": null,
            "fat_factor": null,
            "carb_factor": null
        }))
        .unwrap();
        doc.descrip = descrip.to_string();
        doc
    }

    #[test]
    fn test_defaults() {
        let criteria = FoodCriteria::default();
        assert_eq!(criteria.food_groups, vec!["0900", "1100", "1200", "1600"]);
        assert!(criteria.survey_only);
        assert!(criteria.exclude_parts.contains(&"wheat".to_string()));
    }

    #[test]
    fn test_excluded_word_anywhere_in_description() {
        let criteria = FoodCriteria::default();
        assert!(!criteria.accepts(&food("1", "Apple juice, canned")));
        assert!(!criteria.accepts(&food("2", "Potatoes, HASH BROWN, frozen")));
        assert!(criteria.accepts(&food("3", "Broccoli, raw")));
        // The phrase is matched whole, not as its separate words
        assert!(criteria.accepts(&food("4", "Lentils, brown, raw")));
    }

    #[test]
    fn test_excluded_part_must_match_whole_part() {
        let criteria = FoodCriteria::default();
        assert!(!criteria.accepts(&food("1", "Cherries, sweet, raw")));
        // "sweet" inside a longer part is fine
        assert!(criteria.accepts(&food("2", "Potatoes, sweet potato, raw")));
    }

    #[test]
    fn test_empty_description_dropped() {
        let criteria = FoodCriteria::default();
        assert!(!criteria.accepts(&food("1", "")));
        assert!(!criteria.accepts(&food("2", "   ")));
    }

    #[test]
    fn test_from_config_overrides_only_set_fields() {
        let config = SelectorConfig {
            food_groups: Some(vec!["0100".to_string()]),
            survey_only: None,
            exclude_words: Some(vec![]),
            exclude_parts: None,
        };
        let criteria = FoodCriteria::from_config(&config);

        assert_eq!(criteria.food_groups, vec!["0100"]);
        assert!(criteria.survey_only);
        assert!(criteria.exclude_words.is_empty());
        assert_eq!(criteria.exclude_parts.len(), DEFAULT_EXCLUDE_PARTS.len());
        assert!(criteria.accepts(&food("1", "Apple juice, canned")));
    }

    #[test]
    fn test_filter_keeps_order() {
        let criteria = FoodCriteria::default();
        let kept = criteria.filter(vec![
            food("3", "Spinach, raw"),
            food("1", "Rice, white"),
            food("2", "Kale, raw"),
        ]);
        let ids: Vec<&str> = kept.iter().map(|f| f.ndb_num.as_str()).collect();
        assert_eq!(ids, vec!["3", "2"]);
    }

    #[test]
    fn test_jsonl_file_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("foods.jsonl");
        write_foods_file(&path, &[food("1", "Kale, raw"), food("2", "Spinach, raw")]).unwrap();

        let foods = read_foods(&path).unwrap();
        assert_eq!(foods.len(), 2);
        assert_eq!(foods[1].descrip, "Spinach, raw");
    }

    #[test]
    fn test_read_reports_bad_line() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("foods.jsonl");
        std::fs::write(&path, "\n{not json}\n").unwrap();

        match read_foods(&path).unwrap_err() {
            OptimizeError::Json { line, .. } => assert_eq!(line, 2),
            other => panic!("Unexpected error: {}", other),
        }
    }
}
