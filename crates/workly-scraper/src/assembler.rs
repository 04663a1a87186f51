//! Turns one listing card into one [`Posting`].

use crate::enricher::DescriptionEnricher;
use crate::error::Result;
use crate::extractor::{extract_text, extract_title_and_link};
use crate::resolver::{resolve_budget, SessionBudgetSource};
use crate::selectors::ListingSelectors;
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::OnceLock;
use std::time::Duration;
use workly_browser::PageSession;
use workly_core::{absolutize, Posting, ScrapingConfig};

fn first_integer() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("valid integer regex"))
}

/// First integer in a bids text such as `"Propostas: 12"`.
#[must_use]
pub fn parse_proposal_count(text: &str) -> Option<u32> {
    first_integer()
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

/// Assembles postings from cards of one listing page.
pub struct PostingAssembler<'a, S> {
    session: &'a S,
    selectors: &'a ListingSelectors,
    config: &'a ScrapingConfig,
    rate: Decimal,
}

impl<'a, S: PageSession> PostingAssembler<'a, S> {
    /// Assembler converting USD budgets at `rate`.
    pub fn new(
        session: &'a S,
        selectors: &'a ListingSelectors,
        config: &'a ScrapingConfig,
        rate: Decimal,
    ) -> Self {
        Self {
            session,
            selectors,
            config,
            rate,
        }
    }

    /// Build the posting for `card`.
    ///
    /// Returns an error only when the card itself cannot be read; the caller
    /// skips such cards.
    pub async fn assemble(&self, card: &S::Element) -> Result<Posting> {
        let (title, href) = extract_title_and_link(card, &self.selectors.title).await?;
        let link = absolutize(&href, &self.config.base_url);

        let enriched = DescriptionEnricher::new(self.selectors, self.config)
            .enrich(self.session, card, &link)
            .await;

        let budget_text = extract_text(card, &self.selectors.budget).await;
        let proposal_count = parse_proposal_count(&extract_text(card, &self.selectors.bids).await);

        let detail = SessionBudgetSource::new(
            self.session,
            self.selectors,
            Duration::from_secs(self.config.budget_wait_secs),
        );
        let budget = resolve_budget(&budget_text, &link, self.rate, &detail).await;

        Ok(Posting {
            title,
            link,
            description: enriched.description,
            skills: enriched.skills,
            original_budget_text: budget.original_text,
            currency: budget.currency,
            min_amount_original: budget.min_original,
            max_amount_original: budget.max_original,
            min_amount_brl: budget.min_brl,
            max_amount_brl: budget.max_brl,
            proposal_count,
            conversion_method: budget.method,
        })
    }
}
