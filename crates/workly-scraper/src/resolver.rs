//! BRL normalization policy for a posting's budget.
//!
//! The listing budget decides the path. USD and unknown-currency budgets are
//! checked against the detail page first, since it sometimes shows the BRL
//! figure directly; otherwise USD amounts are converted with the run's rate.

use crate::budget::{parse_budget, ParsedBudget};
use crate::extractor::extract_text;
use crate::selectors::ListingSelectors;
use async_trait::async_trait;
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use std::time::Duration;
use workly_browser::{wait_until, BrowserError, PageSession};
use workly_core::{ConversionMethod, Currency};

/// Longest text accepted by the page-wide budget scan.
const MAX_SCANNED_BUDGET_CHARS: usize = 120;

/// Budget with its BRL figures and their provenance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedBudget {
    /// Currency of the original figures
    pub currency: Currency,
    /// Lower bound in `currency`
    pub min_original: Option<Decimal>,
    /// Upper bound in `currency`
    pub max_original: Option<Decimal>,
    /// Lower bound in BRL
    pub min_brl: Option<Decimal>,
    /// Upper bound in BRL
    pub max_brl: Option<Decimal>,
    /// Budget text as displayed where the figures were taken from
    pub original_text: String,
    /// How the BRL figures were obtained
    pub method: ConversionMethod,
}

/// Source of the budget text shown on a posting's detail page.
#[async_trait]
pub trait DetailBudgetSource: Send + Sync {
    /// Budget text on the detail page at `link`, empty when none is shown.
    async fn fetch_budget_text(&self, link: &str) -> Result<String, BrowserError>;
}

fn converted(amount: Option<Decimal>, rate: Decimal) -> Option<Decimal> {
    let value = amount?;
    let result = value.checked_mul(rate).map(|v| v.round_dp(2));
    if result.is_none() {
        tracing::warn!("Converting {} at rate {} overflows, leaving BRL amount empty", value, rate);
    }
    result
}

fn listing_only(listing: ParsedBudget, text: &str) -> ResolvedBudget {
    ResolvedBudget {
        currency: listing.currency,
        min_original: listing.min,
        max_original: listing.max,
        original_text: text.to_string(),
        ..ResolvedBudget::default()
    }
}

fn adopt_detail(detail: &ParsedBudget, detail_text: String, method: ConversionMethod) -> ResolvedBudget {
    ResolvedBudget {
        currency: detail.currency,
        min_original: detail.min,
        max_original: detail.max,
        min_brl: detail.min,
        max_brl: detail.max,
        original_text: detail_text,
        method,
    }
}

fn convert_usd(listing: ParsedBudget, text: &str, rate: Decimal, method: ConversionMethod) -> ResolvedBudget {
    ResolvedBudget {
        min_brl: converted(listing.min, rate),
        max_brl: converted(listing.max, rate),
        method,
        ..listing_only(listing, text)
    }
}

/// Decide the BRL figures for a listing budget.
///
/// Never fails: a detail lookup error only changes the recorded method.
pub async fn resolve_budget<D>(listing_text: &str, link: &str, rate: Decimal, detail: &D) -> ResolvedBudget
where
    D: DetailBudgetSource + ?Sized,
{
    let listing = parse_budget(listing_text);

    let resolved = match listing.currency {
        Currency::Brl => ResolvedBudget {
            min_brl: listing.min,
            max_brl: listing.max,
            method: ConversionMethod::ListingBrl,
            ..listing_only(listing, listing_text)
        },
        Currency::Usd if !link.is_empty() => match detail.fetch_budget_text(link).await {
            Ok(detail_text) => {
                let parsed = parse_budget(&detail_text);
                if parsed.currency == Currency::Brl && parsed.min.is_some() {
                    adopt_detail(&parsed, detail_text, ConversionMethod::DetailPageBrl)
                } else {
                    convert_usd(listing, listing_text, rate, ConversionMethod::ConvertApi)
                }
            }
            Err(e) => {
                tracing::debug!("Detail budget lookup for {} failed: {}", link, e);
                convert_usd(listing, listing_text, rate, ConversionMethod::ConvertApiErrorFallback)
            }
        },
        Currency::Unknown if !link.is_empty() => match detail.fetch_budget_text(link).await {
            Ok(detail_text) => {
                let parsed = parse_budget(&detail_text);
                if parsed.currency == Currency::Brl {
                    adopt_detail(&parsed, detail_text, ConversionMethod::DetailPageBrlUnknown)
                } else {
                    listing_only(listing, listing_text)
                }
            }
            Err(e) => {
                tracing::debug!("Detail budget lookup for {} failed: {}", link, e);
                listing_only(listing, listing_text)
            }
        },
        _ => listing_only(listing, listing_text),
    };

    if let (Some(min), Some(max)) = (resolved.min_original, resolved.max_original) {
        if min > max {
            tracing::warn!("Budget range is reversed ({} > {}) for {}", min, max, link);
        }
    }

    resolved
}

/// Reads the budget from a posting's detail page in an isolated context.
pub struct SessionBudgetSource<'a, S> {
    session: &'a S,
    selectors: &'a ListingSelectors,
    wait: Duration,
}

impl<'a, S: PageSession> SessionBudgetSource<'a, S> {
    /// Source over `session`, waiting up to `wait` for the budget to render.
    pub fn new(session: &'a S, selectors: &'a ListingSelectors, wait: Duration) -> Self {
        Self {
            session,
            selectors,
            wait,
        }
    }

    async fn read_detail_budget(&self, link: &str) -> Result<String, BrowserError> {
        self.session.navigate(link).await?;

        let session = self.session;
        let ready = self.selectors.detail_budget_ready.as_str();
        if !wait_until(self.wait, move || async move {
            session.find_all(ready).await.map(|found| !found.is_empty()).unwrap_or(false)
        })
        .await
        {
            tracing::debug!("Budget did not render on {}", link);
        }

        if let Some(root) = self.session.document().await? {
            let text = extract_text(&root, &self.selectors.detail_budget).await;
            if !text.is_empty() {
                return Ok(text);
            }
        }

        let html = self.session.page_html().await?;
        Ok(scan_budget_text(&html).unwrap_or_default())
    }
}

#[async_trait]
impl<S: PageSession> DetailBudgetSource for SessionBudgetSource<'_, S> {
    async fn fetch_budget_text(&self, link: &str) -> Result<String, BrowserError> {
        let handle = self.session.open_isolated_context().await?;
        let result = self.read_detail_budget(link).await;
        if let Err(e) = self.session.close_context(handle).await {
            tracing::debug!("Closing {} failed: {}", handle, e);
        }
        result
    }
}

fn has_currency_marker(text: &str) -> bool {
    text.contains("R$") || text.contains("US$") || text.contains("USD")
}

/// First short element text in the page that carries a currency marker.
///
/// Only elements whose own text nodes carry the marker are considered, so a
/// container does not win over the element that actually shows the budget.
#[must_use]
pub fn scan_budget_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let Ok(all) = Selector::parse("body *") else {
        return None;
    };

    document
        .select(&all)
        .filter(|el| !matches!(el.value().name(), "script" | "style" | "noscript"))
        .filter(|el| {
            el.children()
                .filter_map(|child| child.value().as_text())
                .any(|text| has_currency_marker(text))
        })
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .find(|text| {
            !text.is_empty()
                && text.chars().count() < MAX_SCANNED_BUDGET_CHARS
                && has_currency_marker(text)
        })
}
