//! Posting persistence for the `scraped_jobs` table.
//!
//! Rows are keyed by the hash of the posting's link identity. Writing a posting
//! whose hash already exists overwrites its mutable fields and refreshes
//! `scraped_at`; the original `source` and `link` are kept.

use crate::error::{DatabaseError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use sqlx::{Pool, Row, Sqlite};
use workly_core::{ConversionMethod, Posting};

/// Value stored in the `source` column for postings from the listing site.
pub const SOURCE_WORKANA: &str = "workana";

/// A persisted posting row.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredJob {
    /// Row id
    pub id: i64,
    /// Site the posting came from
    pub source: String,
    /// Posting title
    pub title: Option<String>,
    /// Posting link as first seen
    pub link: Option<String>,
    /// SHA-256 of the link identity
    pub link_hash: String,
    /// Description
    pub description: Option<String>,
    /// Skills joined with `" | "`
    pub skills: Option<String>,
    /// Budget text as displayed
    pub original_budget: Option<String>,
    /// Lower bound in BRL
    pub min_budget: Option<Decimal>,
    /// Upper bound in BRL
    pub max_budget: Option<Decimal>,
    /// Proposal count
    pub proposals: Option<u32>,
    /// Provenance of the BRL figures
    pub conversion_method: Option<ConversionMethod>,
    /// Last time the posting was written
    pub scraped_at: DateTime<Utc>,
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn to_real(amount: Option<Decimal>) -> Option<f64> {
    amount.and_then(|a| a.to_f64())
}

/// Insert or update `postings` in one transaction.
///
/// Returns the number of rows written. An empty slice is a no-op.
///
/// # Errors
/// Returns `DatabaseError` if any statement fails; the transaction is rolled back.
pub async fn upsert_postings(pool: &Pool<Sqlite>, postings: &[Posting]) -> Result<usize> {
    if postings.is_empty() {
        tracing::info!("No postings to save");
        return Ok(0);
    }

    let scraped_at = Utc::now().to_rfc3339();
    let mut tx = pool.begin().await?;

    for posting in postings {
        sqlx::query(
            r"INSERT INTO scraped_jobs
                (source, title, link, link_hash, description, skills, original_budget,
                 min_budget, max_budget, proposals, conversion_method, scraped_at)
              VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
              ON CONFLICT (link_hash) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                skills = excluded.skills,
                original_budget = excluded.original_budget,
                min_budget = excluded.min_budget,
                max_budget = excluded.max_budget,
                proposals = excluded.proposals,
                conversion_method = excluded.conversion_method,
                scraped_at = excluded.scraped_at",
        )
        .bind(SOURCE_WORKANA)
        .bind(non_empty(&posting.title))
        .bind(non_empty(&posting.link))
        .bind(posting.link_hash())
        .bind(non_empty(&posting.description))
        .bind(non_empty(&posting.skills_joined()))
        .bind(non_empty(&posting.original_budget_text))
        .bind(to_real(posting.min_amount_brl))
        .bind(to_real(posting.max_amount_brl))
        .bind(posting.proposal_count.map(i64::from))
        .bind(posting.conversion_method.as_str())
        .bind(&scraped_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::info!("Saved {} postings", postings.len());
    Ok(postings.len())
}

fn row_to_job(row: &sqlx::sqlite::SqliteRow) -> Result<StoredJob> {
    let scraped_at: String = row.try_get("scraped_at")?;
    let scraped_at = DateTime::parse_from_rfc3339(&scraped_at)
        .map_err(|e| DatabaseError::Decode(format!("invalid scraped_at '{scraped_at}': {e}")))?
        .with_timezone(&Utc);

    let proposals: Option<i64> = row.try_get("proposals")?;
    let conversion_method: Option<String> = row.try_get("conversion_method")?;
    let min_budget: Option<f64> = row.try_get("min_budget")?;
    let max_budget: Option<f64> = row.try_get("max_budget")?;

    Ok(StoredJob {
        id: row.try_get("id")?,
        source: row.try_get("source")?,
        title: row.try_get("title")?,
        link: row.try_get("link")?,
        link_hash: row.try_get("link_hash")?,
        description: row.try_get("description")?,
        skills: row.try_get("skills")?,
        original_budget: row.try_get("original_budget")?,
        min_budget: min_budget.and_then(Decimal::from_f64),
        max_budget: max_budget.and_then(Decimal::from_f64),
        proposals: proposals.and_then(|p| u32::try_from(p).ok()),
        conversion_method: conversion_method.as_deref().and_then(ConversionMethod::parse),
        scraped_at,
    })
}

/// Look up a posting by its link hash.
///
/// # Errors
/// Returns `DatabaseError` if the query fails or the row cannot be decoded.
pub async fn get_by_link_hash(pool: &Pool<Sqlite>, link_hash: &str) -> Result<Option<StoredJob>> {
    let row = sqlx::query("SELECT * FROM scraped_jobs WHERE link_hash = ?")
        .bind(link_hash)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_job).transpose()
}

/// Most recently written postings, newest first.
///
/// # Errors
/// Returns `DatabaseError` if the query fails or a row cannot be decoded.
pub async fn list_recent(pool: &Pool<Sqlite>, limit: u32) -> Result<Vec<StoredJob>> {
    let rows = sqlx::query("SELECT * FROM scraped_jobs ORDER BY scraped_at DESC, id DESC LIMIT ?")
        .bind(i64::from(limit))
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_job).collect()
}

/// Number of stored postings.
///
/// # Errors
/// Returns `DatabaseError` if the query fails.
pub async fn count_postings(pool: &Pool<Sqlite>) -> Result<i64> {
    Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM scraped_jobs")
        .fetch_one(pool)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::open_pool;
    use crate::migrations::run_migrations;
    use std::str::FromStr;
    use workly_core::link_hash;

    async fn setup() -> Pool<Sqlite> {
        let pool = open_pool(":memory:").await.expect("open pool");
        run_migrations(&pool).await.expect("run migrations");
        pool
    }

    fn posting(title: &str, link: &str) -> Posting {
        Posting {
            title: title.to_string(),
            link: link.to_string(),
            description: "Integração com ERP".to_string(),
            skills: vec!["Rust".to_string(), "SQL".to_string()],
            original_budget_text: "US$ 100 - 200".to_string(),
            min_amount_brl: Some(Decimal::from_str("543.21").unwrap()),
            max_amount_brl: Some(Decimal::from_str("1086.42").unwrap()),
            proposal_count: Some(9),
            conversion_method: ConversionMethod::ConvertApi,
            ..Posting::default()
        }
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let pool = setup().await;
        let p = posting("Integração ERP", "https://www.workana.com/job/erp");

        assert_eq!(upsert_postings(&pool, &[p.clone()]).await.expect("upsert"), 1);

        let stored = get_by_link_hash(&pool, &p.link_hash())
            .await
            .expect("query")
            .expect("row exists");
        assert_eq!(stored.source, "workana");
        assert_eq!(stored.title.as_deref(), Some("Integração ERP"));
        assert_eq!(stored.skills.as_deref(), Some("Rust | SQL"));
        assert_eq!(stored.min_budget, Some(Decimal::from_str("543.21").unwrap()));
        assert_eq!(stored.proposals, Some(9));
        assert_eq!(stored.conversion_method, Some(ConversionMethod::ConvertApi));
        assert_eq!(stored.link_hash, link_hash("https://www.workana.com/job/erp"));
    }

    #[tokio::test]
    async fn test_conflict_overwrites_and_keeps_one_row() {
        let pool = setup().await;
        let first = posting("Old title", "https://www.workana.com/job/erp?ref=a");
        upsert_postings(&pool, &[first.clone()]).await.expect("first upsert");
        let before = get_by_link_hash(&pool, &first.link_hash())
            .await
            .expect("query")
            .expect("row exists");

        let mut second = posting("New title", "https://www.workana.com/job/erp/?ref=b");
        second.min_amount_brl = None;
        second.conversion_method = ConversionMethod::ListingBrl;
        upsert_postings(&pool, &[second]).await.expect("second upsert");

        assert_eq!(count_postings(&pool).await.expect("count"), 1);
        let after = get_by_link_hash(&pool, &first.link_hash())
            .await
            .expect("query")
            .expect("row exists");
        assert_eq!(after.id, before.id);
        assert_eq!(after.title.as_deref(), Some("New title"));
        assert_eq!(after.link.as_deref(), Some("https://www.workana.com/job/erp?ref=a"));
        assert_eq!(after.min_budget, None);
        assert_eq!(after.conversion_method, Some(ConversionMethod::ListingBrl));
        assert!(after.scraped_at >= before.scraped_at);
    }

    #[tokio::test]
    async fn test_empty_batch_is_noop() {
        let pool = setup().await;
        assert_eq!(upsert_postings(&pool, &[]).await.expect("upsert"), 0);
        assert_eq!(count_postings(&pool).await.expect("count"), 0);
    }

    #[tokio::test]
    async fn test_empty_strings_are_stored_as_null() {
        let pool = setup().await;
        let p = Posting {
            link: "https://www.workana.com/job/x".to_string(),
            ..Posting::default()
        };
        upsert_postings(&pool, &[p.clone()]).await.expect("upsert");

        let stored = get_by_link_hash(&pool, &p.link_hash())
            .await
            .expect("query")
            .expect("row exists");
        assert_eq!(stored.title, None);
        assert_eq!(stored.skills, None);
        assert_eq!(stored.proposals, None);
        assert_eq!(stored.conversion_method, Some(ConversionMethod::Listing));
    }

    #[tokio::test]
    async fn test_list_recent() {
        let pool = setup().await;
        upsert_postings(
            &pool,
            &[
                posting("a", "https://www.workana.com/job/a"),
                posting("b", "https://www.workana.com/job/b"),
                posting("c", "https://www.workana.com/job/c"),
            ],
        )
        .await
        .expect("upsert");

        let recent = list_recent(&pool, 2).await.expect("list");
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].title.as_deref(), Some("c"));
    }
}
