//! Tests for the SQLite document store

use chrono::Utc;
use nndb_common::db::{
    count_documents, delete_collection, init_database, insert_document, latest_run,
    load_collection, load_document, open_existing_database, save_run, select_documents,
    ImportRun, RunStatus,
};
use nndb_common::FoodDocument;
use sqlx::SqlitePool;
use tempfile::TempDir;

fn food(ndb_num: &str, group: &str, survey: &str) -> FoodDocument {
    FoodDocument {
        id: ndb_num.to_string(),
        ndb_num: ndb_num.to_string(),
        food_group_code: group.to_string(),
        food_group_descrip: format!("Group {}", group),
        descrip: format!("Food {}", ndb_num),
        short_descrip: format!("FOOD {}", ndb_num),
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
        nutrients: vec![],
        measures: vec![],
        langual_entries: vec![],
        footnotes: vec![],
    }
}

async fn setup_db() -> (TempDir, SqlitePool) {
    let temp_dir = TempDir::new().unwrap();
    let pool = init_database(&temp_dir.path().join("nndb.db")).await.unwrap();
    (temp_dir, pool)
}

async fn insert_all(pool: &SqlitePool, collection: &str, docs: &[FoodDocument]) {
    let now = Utc::now();
    for doc in docs {
        insert_document(pool, collection, doc, now).await.unwrap();
    }
}

#[tokio::test]
async fn test_database_created_in_missing_directory() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("dir").join("nndb.db");

    let pool = init_database(&db_path).await.unwrap();
    assert!(db_path.exists(), "Database file was not created");

    // Reopening is idempotent
    drop(pool);
    let reopened = init_database(&db_path).await;
    assert!(reopened.is_ok(), "Failed to reopen: {:?}", reopened.err());
}

#[tokio::test]
async fn test_open_existing_rejects_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("typo.db");

    let result = open_existing_database(&db_path).await;
    assert!(matches!(result, Err(nndb_common::Error::NotFound(_))));
    assert!(!db_path.exists(), "Missing database must not be created");
}

#[tokio::test]
async fn test_open_existing_reads_documents() {
    let (dir, pool) = setup_db().await;
    insert_all(&pool, "nndb", &[food("11090", "1100", "Y")]).await;
    pool.close().await;

    let reader = open_existing_database(&dir.path().join("nndb.db"))
        .await
        .unwrap();
    let docs = select_documents(&reader, "nndb", &[], false).await.unwrap();
    assert_eq!(docs.len(), 1);

    // Read-only connection refuses writes
    let write = delete_collection(&reader, "nndb").await;
    assert!(write.is_err());
}

#[tokio::test]
async fn test_insert_and_load_document() {
    let (_dir, pool) = setup_db().await;
    insert_all(&pool, "nndb", &[food("01001", "0100", "Y")]).await;

    let loaded = load_document(&pool, "nndb", "01001").await.unwrap();
    assert_eq!(loaded, Some(food("01001", "0100", "Y")));

    assert!(load_document(&pool, "nndb", "99999").await.unwrap().is_none());
    assert!(load_document(&pool, "other", "01001").await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_collection_leaves_others() {
    let (_dir, pool) = setup_db().await;
    insert_all(&pool, "a", &[food("1", "0100", "Y"), food("2", "0100", "")]).await;
    insert_all(&pool, "b", &[food("1", "0100", "Y")]).await;

    let removed = delete_collection(&pool, "a").await.unwrap();
    assert_eq!(removed, 2);
    assert_eq!(count_documents(&pool, "a").await.unwrap(), 0);
    assert_eq!(count_documents(&pool, "b").await.unwrap(), 1);
}

#[tokio::test]
async fn test_duplicate_document_rejected() {
    let (_dir, pool) = setup_db().await;
    let doc = food("01001", "0100", "Y");
    insert_document(&pool, "nndb", &doc, Utc::now()).await.unwrap();

    let second = insert_document(&pool, "nndb", &doc, Utc::now()).await;
    assert!(second.is_err(), "Primary key should reject duplicates");
}

#[tokio::test]
async fn test_document_without_id_rejected() {
    let (_dir, pool) = setup_db().await;
    let doc = food("", "0100", "Y");

    let result = insert_document(&pool, "nndb", &doc, Utc::now()).await;
    assert!(matches!(result, Err(nndb_common::Error::InvalidInput(_))));
    assert_eq!(count_documents(&pool, "nndb").await.unwrap(), 0);
}

#[tokio::test]
async fn test_select_by_group_and_survey() {
    let (_dir, pool) = setup_db().await;
    insert_all(
        &pool,
        "nndb",
        &[
            food("11003", "1100", "Y"),
            food("09003", "0900", "Y"),
            food("11001", "1100", ""),
            food("01001", "0100", "Y"),
        ],
    )
    .await;

    let groups = vec!["1100".to_string(), "0900".to_string()];

    let survey = select_documents(&pool, "nndb", &groups, true).await.unwrap();
    let ids: Vec<&str> = survey.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["09003", "11003"]);

    let all_in_groups = select_documents(&pool, "nndb", &groups, false).await.unwrap();
    assert_eq!(all_in_groups.len(), 3);

    let everything = load_collection(&pool, "nndb").await.unwrap();
    assert_eq!(everything.len(), 4);
    assert_eq!(everything[0].id, "01001");
}

#[tokio::test]
async fn test_import_run_lifecycle() {
    let (_dir, pool) = setup_db().await;

    assert!(latest_run(&pool, "nndb").await.unwrap().is_none());

    let mut run = ImportRun::start("nndb", "/data/sr27");
    save_run(&pool, &run).await.unwrap();

    let loaded = latest_run(&pool, "nndb").await.unwrap().unwrap();
    assert_eq!(loaded.run_id, run.run_id);
    assert_eq!(loaded.status, RunStatus::Running);
    assert!(loaded.ended_at.is_none());

    run.complete(serde_json::json!({ "foods": 3 }));
    save_run(&pool, &run).await.unwrap();

    let loaded = latest_run(&pool, "nndb").await.unwrap().unwrap();
    assert_eq!(loaded.status, RunStatus::Completed);
    assert_eq!(loaded.stats.unwrap()["foods"], 3);
    assert!(loaded.ended_at.is_some());
}
