//! Crawl orchestration.
//!
//! One crawl loads the listing, scrolls until no more cards appear, assembles
//! every card in order and hands the filtered, deduplicated postings to the
//! persistence gateway. Cards are processed strictly one after another because
//! enrichment borrows the single browsing session.

use crate::assembler::PostingAssembler;
use crate::dedup::deduplicate;
use crate::error::{Result, ScrapeError};
use crate::export::export_csv;
use crate::filter::LanguageFilter;
use crate::selectors::ListingSelectors;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use workly_browser::{wait_until, PageSession};
use workly_core::{PersistenceGateway, Posting, ScrapingConfig};
use workly_rates::RateProvider;

const PAGE_HEIGHT_SCRIPT: &str = "document.body.scrollHeight";
const SCROLL_TO_BOTTOM_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight)";

/// Outcome of one crawl.
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Postings assembled from cards
    pub collected: usize,
    /// Postings left after filtering and deduplication
    pub kept: usize,
    /// Rows written by the gateway, `None` when persistence failed
    pub persisted: Option<usize>,
    /// CSV written after a persistence failure
    pub exported_to: Option<PathBuf>,
    /// The kept postings
    pub postings: Vec<Posting>,
}

/// Runs crawls over one page session.
pub struct Crawler<S> {
    session: Arc<S>,
    rates: Arc<dyn RateProvider>,
    gateway: Arc<dyn PersistenceGateway>,
    config: ScrapingConfig,
    selectors: ListingSelectors,
    filter: LanguageFilter,
    fallback_export: PathBuf,
}

impl<S: PageSession> Crawler<S> {
    /// Crawler with the default selectors and the filter keywords from `config`.
    pub fn new(
        session: Arc<S>,
        rates: Arc<dyn RateProvider>,
        gateway: Arc<dyn PersistenceGateway>,
        config: ScrapingConfig,
        fallback_export: PathBuf,
    ) -> Self {
        let filter = LanguageFilter::new(&config.language_filter);
        Self {
            session,
            rates,
            gateway,
            config,
            selectors: ListingSelectors::default(),
            filter,
            fallback_export,
        }
    }

    /// Replace the selector set.
    #[must_use]
    pub fn with_selectors(mut self, selectors: ListingSelectors) -> Self {
        self.selectors = selectors;
        self
    }

    /// Replace the keyword filter.
    #[must_use]
    pub fn with_filter(mut self, filter: LanguageFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Crawl the listing for `query` (all IT postings when `None`).
    ///
    /// Fails only when the listing cannot be loaded. Persistence failures are
    /// reported through [`CrawlReport::persisted`] and the CSV fallback.
    pub async fn run(&self, query: Option<&str>) -> Result<CrawlReport> {
        let url = self.config.listing_url_for(query);
        tracing::info!("Starting crawl of {} (query: {})", url, query.unwrap_or("all IT"));

        let rate = self.rates.get_rate().await;
        tracing::info!("Using USD/BRL rate {}", rate);

        self.session
            .navigate(&url)
            .await
            .map_err(|e| ScrapeError::Session(e.to_string()))?;

        if !self.wait_for_cards().await {
            tracing::warn!("Timed out waiting for listing cards, continuing anyway");
        }
        if !self.scroll_until_end().await {
            tracing::info!(
                "Scroll limit reached ({} attempts)",
                self.config.max_scroll_attempts
            );
        }

        let cards = match self.session.current_cards(&self.selectors.card).await {
            Ok(cards) => cards,
            Err(e) => {
                tracing::error!("Reading listing cards failed: {}", e);
                Vec::new()
            }
        };
        tracing::info!("Found {} listing cards", cards.len());

        let assembler = PostingAssembler::new(
            self.session.as_ref(),
            &self.selectors,
            &self.config,
            rate,
        );
        let mut collected = Vec::with_capacity(cards.len());
        for (index, card) in cards.iter().enumerate() {
            match assembler.assemble(card).await {
                Ok(posting) => collected.push(posting),
                Err(e) => {
                    let err = ScrapeError::Card {
                        index: index + 1,
                        reason: e.to_string(),
                    };
                    tracing::error!("{}", err);
                }
            }
        }

        let collected_count = collected.len();
        let postings = deduplicate(self.filter.apply(collected));
        tracing::info!(
            "Collected {} postings, {} kept after filtering and deduplication",
            collected_count,
            postings.len()
        );

        let mut report = CrawlReport {
            collected: collected_count,
            kept: postings.len(),
            ..CrawlReport::default()
        };
        self.persist(&postings, &mut report).await;
        report.postings = postings;
        Ok(report)
    }

    async fn persist(&self, postings: &[Posting], report: &mut CrawlReport) {
        match self.gateway.upsert_many(postings).await {
            Ok(written) => report.persisted = Some(written),
            Err(e) => {
                tracing::error!("Saving postings failed: {}", e);
                match export_csv(&self.fallback_export, postings) {
                    Ok(()) => report.exported_to = Some(self.fallback_export.clone()),
                    Err(e) => tracing::error!("Fallback CSV export failed: {}", e),
                }
            }
        }
    }

    async fn wait_for_cards(&self) -> bool {
        let session = self.session.as_ref();
        let card = self.selectors.card.as_str();
        wait_until(Duration::from_secs(self.config.listing_wait_secs), move || async move {
            session.current_cards(card).await.map(|found| !found.is_empty()).unwrap_or(false)
        })
        .await
    }

    #[allow(clippy::cast_possible_truncation)]
    async fn page_height(&self) -> Option<i64> {
        match self.session.evaluate_script(PAGE_HEIGHT_SCRIPT).await {
            Ok(value) => value.as_i64().or_else(|| value.as_f64().map(|h| h as i64)),
            Err(e) => {
                tracing::debug!("Reading page height failed: {}", e);
                None
            }
        }
    }

    /// Scroll to the bottom until the page stops growing.
    ///
    /// Returns `false` when the attempt limit was reached first.
    async fn scroll_until_end(&self) -> bool {
        let pause = Duration::from_millis(self.config.scroll_pause_ms);
        let mut last_height = self.page_height().await;

        for _ in 0..self.config.max_scroll_attempts {
            if let Err(e) = self.session.evaluate_script(SCROLL_TO_BOTTOM_SCRIPT).await {
                tracing::debug!("Scrolling failed: {}", e);
            }
            tokio::time::sleep(pause).await;

            let height = self.page_height().await;
            if height == last_height {
                return true;
            }
            last_height = height;
        }
        false
    }
}
