//! Ordered CSS selector candidates for every extracted field.
//!
//! Each list is tried front to back and the first useful match wins, so the
//! most specific selector of a known layout variant comes first.

use crate::error::{Result, ScrapeError};
use serde::Deserialize;
use std::path::Path;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

/// Selectors for the listing page, its cards and the detail page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListingSelectors {
    /// One listing card
    pub card: String,
    /// Title anchor inside a card
    pub title: Vec<String>,
    /// Budget text inside a card
    pub budget: Vec<String>,
    /// Proposal count text inside a card
    pub bids: Vec<String>,
    /// Short description inside a card
    pub card_description: Vec<String>,
    /// Candidate "show more" anchors inside a card
    pub more_controls: Vec<String>,
    /// Spans rendered after the description is expanded in place
    pub expanded_description: String,
    /// Skill tags inside a card
    pub card_skills: Vec<String>,
    /// Lowercase markers identifying a "show more" control
    pub more_markers: Vec<String>,
    /// Lowercase markers meaning a description is truncated
    pub truncation_markers: Vec<String>,
    /// Any of these present means the detail page body has rendered
    pub detail_ready: String,
    /// Description paragraphs on the detail page
    pub detail_description: Vec<String>,
    /// Skill tags on the detail page
    pub detail_skills: Vec<String>,
    /// Any of these present means the detail budget has rendered
    pub detail_budget_ready: String,
    /// Budget text on the detail page
    pub detail_budget: Vec<String>,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            card: "div.project-item".to_string(),
            title: strings(&["h2.project-title a", "h2.h3.project-title a", "h2 a"]),
            budget: strings(&[
                "h4.budget span.values span",
                "h4.budget .values span",
                "h4.budget",
                ".budget",
            ]),
            bids: strings(&["div.project-main-details span.bids", "span.bids", ".bids"]),
            card_description: strings(&[
                "div.html-desc.project-details p",
                "div.project-details p",
                ".project-body p",
                "p",
            ]),
            more_controls: strings(&["a.link.small", "a.link.link-small", "a.link"]),
            expanded_description: "div.html-desc.project-details p span".to_string(),
            card_skills: strings(&[
                ".project-skills a, .project-skills span, div.skills a, div.skills span",
            ]),
            more_markers: strings(&["ver mais", "ver", "more"]),
            truncation_markers: strings(&["ver mais", "more"]),
            detail_ready: "div.html-desc, section.project-description, div.project-details"
                .to_string(),
            detail_description: strings(&[
                "div#project-detail div.html-desc p",
                "section.project-description p",
                "div.project-details p",
                ".project-description p",
                ".project-description",
            ]),
            detail_skills: strings(&[
                "div#project-detail div.skills a",
                "section.project-skills a",
                "div.skills a",
                ".skills a",
            ]),
            detail_budget_ready: "h4.budget, div.project-actions h4.budget".to_string(),
            detail_budget: strings(&[
                "h4.budget span.values span",
                "h4.budget .values span",
                "h4.budget",
                "div.project-actions h4.budget",
                "div.project-header h4.budget",
            ]),
        }
    }
}

impl ListingSelectors {
    /// Read selector overrides from a TOML file; fields it omits keep their defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let selectors: Self = toml::from_str(&contents)
            .map_err(|e| ScrapeError::Selectors(format!("{}: {e}", path.display())))?;
        if selectors.card.trim().is_empty() {
            return Err(ScrapeError::Selectors(format!(
                "{}: card selector must not be empty",
                path.display()
            )));
        }
        tracing::debug!("Loaded selector overrides from {}", path.display());
        Ok(selectors)
    }
}
