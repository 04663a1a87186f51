//! Persistence seam for postings.

use crate::error::Result;
use crate::types::Posting;
use async_trait::async_trait;

/// Stores postings keyed by their link hash.
///
/// Conflicting keys overwrite every mutable field and refresh the scrape
/// timestamp; new keys insert. Implementations own batch atomicity.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Insert or update all postings, returning how many rows were written.
    async fn upsert_many(&self, postings: &[Posting]) -> Result<usize>;
}
