//! Stand-in persistence used when the database cannot be opened.

use async_trait::async_trait;
use workly_core::{PersistenceGateway, Posting, WorklyError};

/// Gateway whose every write fails with the reason the database was unavailable.
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: String) -> Self {
        Self { reason }
    }
}

#[async_trait]
impl PersistenceGateway for UnavailableStore {
    async fn upsert_many(&self, _postings: &[Posting]) -> workly_core::Result<usize> {
        Err(WorklyError::Database(self.reason.clone()))
    }
}
