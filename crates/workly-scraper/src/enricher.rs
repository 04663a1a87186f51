//! Description and skills enrichment.
//!
//! Cards show a truncated description. Enrichment escalates through three
//! tiers: the card text, the card expanded in place through its "show more"
//! control, and finally the posting's detail page opened in an isolated
//! context. Every failure is logged and the best value so far is kept.

use crate::extractor::{extract_all_texts, extract_text, texts_of};
use crate::selectors::ListingSelectors;
use std::time::Duration;
use workly_browser::{wait_until, Element, PageSession};
use workly_core::ScrapingConfig;

/// Description and skills gathered for one posting.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnrichedText {
    /// Best description found
    pub description: String,
    /// Skills in page order
    pub skills: Vec<String>,
}

fn contains_marker(text: &str, markers: &[String]) -> bool {
    let lower = text.to_lowercase();
    markers.iter().any(|marker| lower.contains(marker.as_str()))
}

/// Whether an anchor's text identifies it as a "show more" control.
#[must_use]
pub fn is_more_control(text: &str, markers: &[String]) -> bool {
    let text = text.trim();
    !text.is_empty() && contains_marker(text, markers)
}

/// Whether the card-level result is too thin and the detail page should be read.
#[must_use]
pub fn needs_detail(
    current: &EnrichedText,
    min_chars: usize,
    truncation_markers: &[String],
) -> bool {
    current.description.is_empty()
        || current.description.chars().count() < min_chars
        || contains_marker(&current.description, truncation_markers)
        || current.skills.is_empty()
}

/// Detail values replace card values only when non-empty.
#[must_use]
pub fn merge_detail(current: EnrichedText, detail: EnrichedText) -> EnrichedText {
    EnrichedText {
        description: if detail.description.is_empty() {
            current.description
        } else {
            detail.description
        },
        skills: if detail.skills.is_empty() {
            current.skills
        } else {
            detail.skills
        },
    }
}

/// Runs the enrichment tiers for one card.
pub struct DescriptionEnricher<'a> {
    selectors: &'a ListingSelectors,
    expand_wait: Duration,
    detail_wait: Duration,
    min_chars: usize,
}

impl<'a> DescriptionEnricher<'a> {
    /// Enricher using the waits and thresholds from `config`.
    #[must_use]
    pub fn new(selectors: &'a ListingSelectors, config: &ScrapingConfig) -> Self {
        Self {
            selectors,
            expand_wait: Duration::from_secs(config.expand_wait_secs),
            detail_wait: Duration::from_secs(config.detail_wait_secs),
            min_chars: config.min_description_chars,
        }
    }

    /// Best description and skills for `card`. Never fails.
    pub async fn enrich<S: PageSession>(&self, session: &S, card: &S::Element, link: &str) -> EnrichedText {
        let initial = extract_text(card, &self.selectors.card_description).await;

        let description = match self.expand_in_place(card).await {
            Some(expanded) => expanded,
            None => initial,
        };
        let skills = extract_all_texts(card, &self.selectors.card_skills).await;
        let current = EnrichedText { description, skills };

        if link.is_empty() || !needs_detail(&current, self.min_chars, &self.selectors.truncation_markers) {
            return current;
        }

        match self.read_detail(session, link).await {
            Ok(detail) => merge_detail(current, detail),
            Err(e) => {
                tracing::debug!("Detail page {} unavailable: {}", link, e);
                current
            }
        }
    }

    async fn find_more_control<E: Element>(&self, card: &E) -> Option<E> {
        for selector in &self.selectors.more_controls {
            let Ok(candidates) = card.find_all(selector).await else {
                continue;
            };
            let Some(candidate) = candidates.into_iter().next() else {
                continue;
            };
            let text = candidate.text().await.unwrap_or_default();
            if is_more_control(&text, &self.selectors.more_markers) {
                return Some(candidate);
            }
        }
        None
    }

    /// Click the card's "show more" control and collect the expanded text.
    async fn expand_in_place<E: Element>(&self, card: &E) -> Option<String> {
        let control = self.find_more_control(card).await?;
        if let Err(e) = control.click().await {
            tracing::debug!("Expanding card description failed: {}", e);
            return None;
        }

        let expanded = self.selectors.expanded_description.as_str();
        wait_until(self.expand_wait, move || async move {
            card.find_all(expanded).await.map(|found| !found.is_empty()).unwrap_or(false)
        })
        .await;

        let spans = card.find_all(expanded).await.ok()?;
        let texts = texts_of(&spans).await;
        if texts.is_empty() {
            None
        } else {
            Some(texts.join(" "))
        }
    }

    /// Read description and skills from the detail page, always returning to the listing.
    async fn read_detail<S: PageSession>(&self, session: &S, link: &str) -> workly_browser::Result<EnrichedText> {
        let handle = session.open_isolated_context().await?;
        let result = self.read_detail_page(session, link).await;
        if let Err(e) = session.close_context(handle).await {
            tracing::debug!("Closing {} failed: {}", handle, e);
        }
        result
    }

    async fn read_detail_page<S: PageSession>(&self, session: &S, link: &str) -> workly_browser::Result<EnrichedText> {
        session.navigate(link).await?;

        let ready = self.selectors.detail_ready.as_str();
        if !wait_until(self.detail_wait, move || async move {
            session.find_all(ready).await.map(|found| !found.is_empty()).unwrap_or(false)
        })
        .await
        {
            tracing::debug!("Detail content did not render on {}", link);
        }

        let Some(root) = session.document().await? else {
            return Ok(EnrichedText::default());
        };
        Ok(EnrichedText {
            description: extract_all_texts(&root, &self.selectors.detail_description)
                .await
                .join(" "),
            skills: extract_all_texts(&root, &self.selectors.detail_skills).await,
        })
    }
}
