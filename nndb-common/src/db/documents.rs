//! Food document queries
//!
//! Write helpers take any executor so the importer can run them inside a
//! single transaction; read helpers take the pool.

use crate::models::FoodDocument;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};

/// Delete every document of a collection, returning the number removed
pub async fn delete_collection<'e, E>(executor: E, collection: &str) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM food_documents WHERE collection = ?")
        .bind(collection)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// Insert one document, returning the number of rows written
pub async fn insert_document<'e, E>(
    executor: E,
    collection: &str,
    doc: &FoodDocument,
    imported_at: DateTime<Utc>,
) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    if collection.is_empty() {
        return Err(Error::InvalidInput("empty collection name".to_string()));
    }
    if doc.id.is_empty() {
        return Err(Error::InvalidInput(format!(
            "document without an NDB number ({})",
            doc.descrip
        )));
    }

    let document = serde_json::to_string(doc)?;

    let result = sqlx::query(
        r#"
        INSERT INTO food_documents (collection, ndb_num, food_group_code, survey, document, imported_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(collection)
    .bind(&doc.id)
    .bind(&doc.food_group_code)
    .bind(&doc.survey)
    .bind(&document)
    .bind(imported_at.to_rfc3339())
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Count documents in a collection
pub async fn count_documents(pool: &SqlitePool, collection: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM food_documents WHERE collection = ?")
        .bind(collection)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Load a single document by NDB number
pub async fn load_document(
    pool: &SqlitePool,
    collection: &str,
    ndb_num: &str,
) -> Result<Option<FoodDocument>> {
    let row: Option<String> = sqlx::query_scalar(
        "SELECT document FROM food_documents WHERE collection = ? AND ndb_num = ?",
    )
    .bind(collection)
    .bind(ndb_num)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Load every document of a collection ordered by NDB number
pub async fn load_collection(pool: &SqlitePool, collection: &str) -> Result<Vec<FoodDocument>> {
    select_documents(pool, collection, &[], false).await
}

/// Select documents by food group and survey flag, ordered by NDB number
///
/// An empty `food_groups` slice matches every group. With `survey_only`,
/// only foods flagged as used in FNDDS are returned.
pub async fn select_documents(
    pool: &SqlitePool,
    collection: &str,
    food_groups: &[String],
    survey_only: bool,
) -> Result<Vec<FoodDocument>> {
    let mut sql = String::from("SELECT document FROM food_documents WHERE collection = ?");

    if !food_groups.is_empty() {
        let placeholders = vec!["?"; food_groups.len()].join(", ");
        sql.push_str(&format!(" AND food_group_code IN ({})", placeholders));
    }
    if survey_only {
        sql.push_str(" AND survey = ?");
    }
    sql.push_str(" ORDER BY ndb_num");

    let mut query = sqlx::query_scalar::<_, String>(&sql).bind(collection);
    for group in food_groups {
        query = query.bind(group);
    }
    if survey_only {
        query = query.bind(crate::models::SURVEY_COMPLETE);
    }

    let rows = query.fetch_all(pool).await?;

    rows.iter()
        .map(|json| serde_json::from_str::<FoodDocument>(json).map_err(Error::from))
        .collect()
}
