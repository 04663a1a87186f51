//! Workly Database Layer
//!
//! Provides `SQLite` storage for scraped postings. Uses `SQLx` with embedded
//! migrations and a small connection pool.
//!
//! # Architecture
//!
//! - **Migrations**: SQL migrations are embedded and versioned using `SQLx`
//! - **Connection Pooling**: pool of up to 5 connections, created on demand
//! - **Upserts**: postings are keyed by the SHA-256 of their link identity
//!
//! # Example
//!
//! ```ignore
//! use workly_db::Database;
//!
//! let db = Database::new("workly.db").await?;
//! db.run_migrations().await?;
//! db.upsert_postings(&postings).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod connection;
pub mod error;
pub mod migrations;
pub mod postings;

// Re-export commonly used types
pub use connection::open_pool;
pub use error::{DatabaseError, Result};
pub use postings::{StoredJob, SOURCE_WORKANA};

use async_trait::async_trait;
use std::path::Path;
use workly_core::{PersistenceGateway, Posting};

/// High-level database interface.
#[derive(Debug, Clone)]
pub struct Database {
    pool: sqlx::Pool<sqlx::Sqlite>,
}

impl Database {
    /// Open (or create) the database at `path`.
    ///
    /// # Arguments
    /// * `path` - Path to the database file (or `:memory:` for in-memory)
    ///
    /// # Errors
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let pool = open_pool(path).await?;
        Ok(Self { pool })
    }

    /// Run all pending database migrations.
    ///
    /// # Errors
    /// Returns `DatabaseError::Migration` if any migration fails.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Get the current schema version.
    ///
    /// Returns the number of applied migrations.
    pub async fn get_schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(&self.pool).await
    }

    /// Get a reference to the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Sqlite> {
        &self.pool
    }

    /// Insert or update postings in one transaction.
    pub async fn upsert_postings(&self, postings: &[Posting]) -> Result<usize> {
        postings::upsert_postings(&self.pool, postings).await
    }

    /// Look up a stored posting by link hash.
    pub async fn get_by_link_hash(&self, link_hash: &str) -> Result<Option<StoredJob>> {
        postings::get_by_link_hash(&self.pool, link_hash).await
    }

    /// Most recently written postings, newest first.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<StoredJob>> {
        postings::list_recent(&self.pool, limit).await
    }

    /// Number of stored postings.
    pub async fn count_postings(&self) -> Result<i64> {
        postings::count_postings(&self.pool).await
    }

    /// Close the database connection gracefully.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl PersistenceGateway for Database {
    async fn upsert_many(&self, postings: &[Posting]) -> workly_core::Result<usize> {
        self.upsert_postings(postings).await.map_err(Into::into)
    }
}
