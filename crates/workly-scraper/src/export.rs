//! CSV export used when postings cannot be persisted.

use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs;
use std::path::Path;
use workly_core::Posting;

/// Column order of [`CsvRow`].
const HEADERS: [&str; 12] = [
    "title",
    "link",
    "description",
    "skills",
    "original_budget",
    "currency",
    "min_original",
    "max_original",
    "min_brl",
    "max_brl",
    "proposals",
    "conversion_method",
];

#[derive(Serialize)]
struct CsvRow<'a> {
    title: &'a str,
    link: &'a str,
    description: &'a str,
    skills: String,
    original_budget: &'a str,
    currency: &'static str,
    min_original: Option<Decimal>,
    max_original: Option<Decimal>,
    min_brl: Option<Decimal>,
    max_brl: Option<Decimal>,
    proposals: Option<u32>,
    conversion_method: &'static str,
}

impl<'a> From<&'a Posting> for CsvRow<'a> {
    fn from(posting: &'a Posting) -> Self {
        Self {
            title: &posting.title,
            link: &posting.link,
            description: &posting.description,
            skills: posting.skills_joined(),
            original_budget: &posting.original_budget_text,
            currency: posting.currency.as_str(),
            min_original: posting.min_amount_original,
            max_original: posting.max_amount_original,
            min_brl: posting.min_amount_brl,
            max_brl: posting.max_amount_brl,
            proposals: posting.proposal_count,
            conversion_method: posting.conversion_method.as_str(),
        }
    }
}

/// Write `postings` to `path` with a header row, replacing any existing file.
pub fn export_csv(path: &Path, postings: &[Posting]) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(HEADERS)?;
    for posting in postings {
        writer.serialize(CsvRow::from(posting))?;
    }
    writer.flush()?;

    tracing::info!("Exported {} postings to {}", postings.len(), path.display());
    Ok(())
}
