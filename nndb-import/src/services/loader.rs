//! Collection loader
//!
//! Replaces the whole contents of a collection in one transaction: prior
//! documents are removed and the new set inserted. Either every document
//! lands or the collection is left as it was.

use crate::error::{ImportError, ImportResult};
use chrono::Utc;
use nndb_common::db::{delete_collection, insert_document};
use nndb_common::FoodDocument;
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Progress log interval for inserts
const INSERT_PROGRESS_EVERY: usize = 3000;

/// Counts from one collection replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOutcome {
    pub removed: u64,
    pub inserted: u64,
}

/// Replace `collection` with `docs`
pub async fn replace_collection(
    pool: &SqlitePool,
    collection: &str,
    docs: &[FoodDocument],
) -> ImportResult<LoadOutcome> {
    let mut tx = pool.begin().await?;

    info!("Clearing collection {}", collection);
    let removed = delete_collection(&mut *tx, collection).await?;
    debug!("Removed {} prior documents", removed);

    info!("Sending bulk inserts ({} documents)", docs.len());
    let imported_at = Utc::now();
    let mut inserted = 0u64;

    for (i, doc) in docs.iter().enumerate() {
        inserted += insert_document(&mut *tx, collection, doc, imported_at).await?;

        if (i + 1) % INSERT_PROGRESS_EVERY == 0 {
            info!("  Inserted {:7}", i + 1);
        }
    }

    if inserted != docs.len() as u64 {
        tx.rollback().await?;
        return Err(ImportError::BulkFailure {
            expected: docs.len(),
            inserted,
        });
    }

    tx.commit().await?;

    Ok(LoadOutcome { removed, inserted })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nndb_common::db::{count_documents, init_database, load_document};
    use tempfile::TempDir;

    fn doc(ndb_num: &str) -> FoodDocument {
        FoodDocument {
            id: ndb_num.to_string(),
            ndb_num: ndb_num.to_string(),
            food_group_code: "0900".to_string(),
            food_group_descrip: "Fruits and Fruit Juices".to_string(),
            descrip: "Apples, raw, with skin".to_string(),
            short_descrip: "APPLES,RAW,WITH SKIN".to_string(),
            common_name: String::new(),
            mfg_name: String::new(),
            survey: "Y".to_string(),
            refuse_descrip: "Core and stem".to_string(),
            refuse: Some(10.0),
            scientific_name: "Malus domestica".to_string(),
            n_factor: Some(6.25),
            protein_factor: Some(3.36),
            fat_factor: Some(8.37),
            carb_factor: Some(3.6),
            nutrients: vec![],
            measures: vec![],
            langual_entries: vec![],
            footnotes: vec![],
        }
    }

    async fn setup() -> (TempDir, SqlitePool) {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("loader.db")).await.unwrap();
        (dir, pool)
    }

    #[tokio::test]
    async fn test_replace_removes_prior_contents() {
        let (_dir, pool) = setup().await;

        let first = replace_collection(&pool, "nndb", &[doc("09003"), doc("09004")])
            .await
            .unwrap();
        assert_eq!(first, LoadOutcome { removed: 0, inserted: 2 });

        let second = replace_collection(&pool, "nndb", &[doc("09005")]).await.unwrap();
        assert_eq!(second, LoadOutcome { removed: 2, inserted: 1 });

        assert_eq!(count_documents(&pool, "nndb").await.unwrap(), 1);
        assert!(load_document(&pool, "nndb", "09003").await.unwrap().is_none());
        assert!(load_document(&pool, "nndb", "09005").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_collection() {
        let (_dir, pool) = setup().await;
        replace_collection(&pool, "nndb", &[doc("09003")]).await.unwrap();

        // Duplicate ids violate the primary key mid-transaction
        let result = replace_collection(&pool, "nndb", &[doc("09010"), doc("09010")]).await;
        assert!(result.is_err());

        assert_eq!(count_documents(&pool, "nndb").await.unwrap(), 1);
        assert!(load_document(&pool, "nndb", "09003").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_other_collections_untouched() {
        let (_dir, pool) = setup().await;
        replace_collection(&pool, "a", &[doc("1"), doc("2")]).await.unwrap();
        replace_collection(&pool, "b", &[doc("3")]).await.unwrap();

        assert_eq!(count_documents(&pool, "a").await.unwrap(), 2);
        assert_eq!(count_documents(&pool, "b").await.unwrap(), 1);
    }
}
