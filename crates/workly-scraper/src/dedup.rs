//! Link-based deduplication.

use std::collections::HashSet;
use workly_core::Posting;

/// Keep the first posting per link identity, preserving order.
///
/// Postings without a link share the empty identity, so at most one of them
/// survives.
#[must_use]
pub fn deduplicate(postings: Vec<Posting>) -> Vec<Posting> {
    let mut seen = HashSet::with_capacity(postings.len());
    postings
        .into_iter()
        .filter(|posting| seen.insert(posting.link_identity()))
        .collect()
}
