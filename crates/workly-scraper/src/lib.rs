//! Workly Scraper - Job listing extraction and normalization pipeline.
//!
//! This crate turns the cards of a JavaScript-rendered job listing into
//! normalized, deduplicated [`workly_core::Posting`] records. It coordinates
//! field extraction with ordered selector fallbacks, description enrichment
//! from the detail page, budget parsing and BRL conversion.
//!
//! # Features
//!
//! - Ordered selector candidates per field, tolerant of layout variants
//! - Description escalation: card text, in-place expansion, detail page
//! - Budget parsing with currency detection and Brazilian number notation
//! - BRL normalization with provenance tags
//! - Link-based deduplication and CSV fallback export
//!
//! # Example
//!
//! ```rust,ignore
//! use workly_scraper::Crawler;
//! use std::sync::Arc;
//!
//! let crawler = Crawler::new(
//!     Arc::new(browser_engine),
//!     Arc::new(rate_provider),
//!     Arc::new(database),
//!     config.scraping.clone(),
//!     config.fallback_export_path()?,
//! );
//!
//! let report = crawler.run(Some("rust")).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod assembler;
pub mod budget;
pub mod dedup;
pub mod enricher;
#[allow(missing_docs)]
pub mod error;
pub mod export;
pub mod extractor;
pub mod filter;
pub mod orchestrator;
pub mod resolver;
pub mod selectors;

#[cfg(test)]
mod fake;

// Re-export commonly used types
pub use assembler::{parse_proposal_count, PostingAssembler};
pub use budget::{parse_budget, ParsedBudget};
pub use dedup::deduplicate;
pub use enricher::{is_more_control, merge_detail, needs_detail, DescriptionEnricher, EnrichedText};
pub use error::{Result, ScrapeError};
pub use export::export_csv;
pub use extractor::{extract_all_texts, extract_text, extract_title_and_link};
pub use filter::LanguageFilter;
pub use orchestrator::{CrawlReport, Crawler};
pub use resolver::{resolve_budget, scan_budget_text, DetailBudgetSource, ResolvedBudget, SessionBudgetSource};
pub use selectors::ListingSelectors;
