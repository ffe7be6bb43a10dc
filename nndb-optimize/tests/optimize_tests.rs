//! Selection and search against a small on-disk collection

use chrono::Utc;
use nndb_common::db::{init_database, insert_document};
use nndb_common::models::NutrientEntry;
use nndb_common::FoodDocument;
use nndb_optimize::report::describe;
use nndb_optimize::selector::{read_foods, select_foods, write_foods_file};
use nndb_optimize::{runner, FoodCriteria, GaParams, OptEngine};
use sqlx::SqlitePool;
use tempfile::TempDir;

fn nutrient(ndb_num: &str, id: &str, val: f64) -> NutrientEntry {
    NutrientEntry {
        ndb_num: ndb_num.to_string(),
        nutrient_id: id.to_string(),
        nutrient_val: Some(val),
        data_point_count: None,
        std_error: None,
        source_code: String::new(),
        source_descrip: String::new(),
        derivation_code: String::new(),
        derivation_descrip: String::new(),
        ref_ndb_num: String::new(),
        add_nutrition_mark: String::new(),
        num_studies: None,
        min_value: None,
        max_value: None,
        degrees_freedom: None,
        lower_err_bound: None,
        upper_err_bound: None,
        statistical_comments: String::new(),
        confidence_code: String::new(),
        units: String::new(),
        tagname: String::new(),
        nutrient_descrip: String::new(),
        decimal_places: String::new(),
        sr_sort_order: String::new(),
    }
}

fn food(ndb_num: &str, group: &str, survey: &str, descrip: &str, values: &[(&str, f64)]) -> FoodDocument {
    FoodDocument {
        id: ndb_num.to_string(),
        ndb_num: ndb_num.to_string(),
        food_group_code: group.to_string(),
        food_group_descrip: format!("Group {}", group),
        descrip: descrip.to_string(),
        short_descrip: descrip.to_uppercase(),
        common_name: String::new(),
        mfg_name: String::new(),
        survey: survey.to_string(),
        refuse_descrip: String::new(),
        refuse: None,
        scientific_name: String::new(),
        n_factor: None,
        protein_factor: None,
        fat_factor: None,
        carb_factor: None,
        nutrients: values
            .iter()
            .map(|(id, val)| nutrient(ndb_num, id, *val))
            .collect(),
        measures: vec![],
        langual_entries: vec![],
        footnotes: vec![],
    }
}

fn sample_foods() -> Vec<FoodDocument> {
    vec![
        food("01001", "0100", "Y", "Butter, salted", &[("208", 717.0), ("320", 684.0)]),
        food("09003", "0900", "Y", "Apples, raw, with skin", &[("208", 52.0), ("401", 4.6), ("269", 10.39)]),
        food("09016", "0900", "Y", "Apple juice, canned", &[("208", 46.0), ("401", 0.9)]),
        food("11090", "1100", "Y", "Broccoli, raw", &[("208", 34.0), ("401", 89.2), ("320", 31.0), ("435", 63.0)]),
        food("11091", "1100", "", "Broccoli, cooked", &[("208", 35.0), ("401", 64.9)]),
        food("11457", "1100", "Y", "Spinach, raw", &[("208", 23.0), ("303", 2.71), ("304", 79.0), ("435", 194.0)]),
        food("12061", "1200", "Y", "Nuts, almonds", &[("208", 579.0), ("304", 270.0), ("323", 25.63)]),
    ]
}

async fn setup() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("nndb.db")).await.unwrap();
    let now = Utc::now();
    for doc in sample_foods() {
        insert_document(&pool, "nndb", &doc, now).await.unwrap();
    }
    (dir, pool)
}

fn ids(foods: &[FoodDocument]) -> Vec<&str> {
    foods.iter().map(|f| f.ndb_num.as_str()).collect()
}

#[tokio::test]
async fn test_select_with_default_criteria() {
    let (_dir, pool) = setup().await;

    let foods = select_foods(&pool, "nndb", &FoodCriteria::default())
        .await
        .unwrap();

    // Butter is outside the default groups, the juice is filtered by
    // description and cooked broccoli is not survey complete
    assert_eq!(ids(&foods), vec!["09003", "11090", "11457", "12061"]);
}

#[tokio::test]
async fn test_select_all_groups_and_survey_states() {
    let (_dir, pool) = setup().await;
    let criteria = FoodCriteria {
        food_groups: vec![],
        survey_only: false,
        exclude_words: vec![],
        exclude_parts: vec![],
    };

    let foods = select_foods(&pool, "nndb", &criteria).await.unwrap();
    assert_eq!(foods.len(), 7);
    assert_eq!(foods[0].ndb_num, "01001");
}

#[tokio::test]
async fn test_select_unknown_collection_is_empty() {
    let (_dir, pool) = setup().await;
    let foods = select_foods(&pool, "other", &FoodCriteria::default())
        .await
        .unwrap();
    assert!(foods.is_empty());
}

#[tokio::test]
async fn test_exported_selection_reloads() {
    let (dir, pool) = setup().await;
    let foods = select_foods(&pool, "nndb", &FoodCriteria::default())
        .await
        .unwrap();

    let path = dir.path().join("foods.jsonl");
    write_foods_file(&path, &foods).unwrap();
    let reloaded = read_foods(&path).unwrap();

    assert_eq!(reloaded, foods);
    assert_eq!(reloaded[1].nutrient_value("401"), Some(89.2));
}

fn small_params() -> GaParams {
    GaParams {
        init_randoms: 50,
        population_size: 20,
        generations: 4,
        seed: Some(2015),
        ..GaParams::default()
    }
}

#[tokio::test]
async fn test_run_writes_first_sightings() {
    let (_dir, pool) = setup().await;
    let foods = select_foods(&pool, "nndb", &FoodCriteria::default())
        .await
        .unwrap();
    let mut engine = OptEngine::new(foods, small_params()).unwrap();

    let mut results = Vec::new();
    let summary = runner::run(&mut engine, 4, &mut results).unwrap();
    let text = String::from_utf8(results).unwrap();

    assert_eq!(summary.generations, 4);
    assert!(summary.best_score.is_finite());
    assert!(summary.first_sightings >= 3);
    assert!(text.starts_with("First Seen Generation 1\n"));
    assert_eq!(text.matches(&"=".repeat(78)).count(), summary.first_sightings);
    assert!(text.contains("  NUTR Vitamin C"));
    assert!(text.contains("Total Calories:"));
}

#[test]
fn test_report_lists_foods_and_calories() {
    let foods = vec![
        food("11090", "1100", "Y", "Broccoli, raw", &[("208", 34.0), ("401", 89.2)]),
        food("99999", "1100", "Y", "Mystery greens", &[("401", 10.0)]),
    ];
    let engine = OptEngine::new(foods, small_params()).unwrap();
    let solution = engine.evaluate(vec![2.0, 1.0]);
    let lines = describe(&engine, &solution);

    assert!(lines[0].starts_with("Solution with score"));
    let vit_c = lines.iter().find(|l| l.contains("NUTR Vitamin C")).unwrap();
    assert!(vit_c.contains("188.40 mg"));
    assert!(vit_c.contains("209.33% of RDA"));

    let food_lines: Vec<&String> = lines.iter().filter(|l| l.starts_with("  FOOD")).collect();
    assert_eq!(food_lines.len(), 2);
    assert!(food_lines[0].contains("(   68.00 cals) of BROCCOLI, RAW (grp Group 1100)"));
    assert!(food_lines[1].contains("(???????? cals)"));
    assert_eq!(lines.last().unwrap(), "Total Calories:    68.00");
}

#[test]
fn test_food_scores_rank_best_first() {
    let mut engine = OptEngine::new(sample_foods(), small_params()).unwrap();
    let scores = engine.food_scores();

    assert_eq!(scores.len(), 7);
    assert!(scores.windows(2).all(|w| w[0].score <= w[1].score));
}
