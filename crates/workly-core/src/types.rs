//! Shared types used across the Workly job feed.
//!
//! This module defines the canonical posting record and the small enums that
//! describe how its budget figures were obtained.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency detected in a budget text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// United States dollar (`US$`, `USD`)
    Usd,
    /// Brazilian real (`R$`, `BRL`)
    Brl,
    /// No recognizable currency marker
    #[default]
    Unknown,
}

impl Currency {
    /// Currency code as shown in exports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Brl => "BRL",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of a posting's BRL figures.
///
/// The string forms are what the `scraped_jobs.conversion_method` column holds
/// and must stay stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConversionMethod {
    /// Listing figures only, nothing resolved in BRL
    #[default]
    #[serde(rename = "listagem")]
    Listing,
    /// Listing budget was already in BRL
    #[serde(rename = "listagem_BRL")]
    ListingBrl,
    /// USD listing, BRL figures found on the detail page
    #[serde(rename = "detail_page_BRL")]
    DetailPageBrl,
    /// USD listing converted with the exchange rate
    #[serde(rename = "convert_api")]
    ConvertApi,
    /// USD listing converted after the detail page fetch failed
    #[serde(rename = "convert_api_error_fallback")]
    ConvertApiErrorFallback,
    /// Unknown listing currency, BRL figures found on the detail page
    #[serde(rename = "detail_page_BRL_unknown")]
    DetailPageBrlUnknown,
}

impl ConversionMethod {
    /// Stable string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Listing => "listagem",
            Self::ListingBrl => "listagem_BRL",
            Self::DetailPageBrl => "detail_page_BRL",
            Self::ConvertApi => "convert_api",
            Self::ConvertApiErrorFallback => "convert_api_error_fallback",
            Self::DetailPageBrlUnknown => "detail_page_BRL_unknown",
        }
    }

    /// Parse from the stored string form, `None` for unrecognized values.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "listagem" => Some(Self::Listing),
            "listagem_BRL" => Some(Self::ListingBrl),
            "detail_page_BRL" => Some(Self::DetailPageBrl),
            "convert_api" => Some(Self::ConvertApi),
            "convert_api_error_fallback" => Some(Self::ConvertApiErrorFallback),
            "detail_page_BRL_unknown" => Some(Self::DetailPageBrlUnknown),
            _ => None,
        }
    }
}

impl fmt::Display for ConversionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Separator used when skills are flattened into a single column.
pub const SKILLS_SEPARATOR: &str = " | ";

/// One normalized job listing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Posting {
    /// Posting title, empty when extraction failed
    pub title: String,
    /// Absolute URL of the posting's detail page
    pub link: String,
    /// Free text description, enriched from the detail page when needed
    pub description: String,
    /// Skills in page order
    pub skills: Vec<String>,
    /// Budget text as displayed (possibly taken from the detail page)
    pub original_budget_text: String,
    /// Currency of the original figures
    pub currency: Currency,
    /// Lower bound in `currency`
    pub min_amount_original: Option<Decimal>,
    /// Upper bound in `currency`
    pub max_amount_original: Option<Decimal>,
    /// Lower bound in BRL
    pub min_amount_brl: Option<Decimal>,
    /// Upper bound in BRL
    pub max_amount_brl: Option<Decimal>,
    /// Number of proposals already submitted
    pub proposal_count: Option<u32>,
    /// How the BRL figures were derived
    pub conversion_method: ConversionMethod,
}

impl Posting {
    /// Skills joined with [`SKILLS_SEPARATOR`].
    #[must_use]
    pub fn skills_joined(&self) -> String {
        self.skills.join(SKILLS_SEPARATOR)
    }

    /// Normalized link identity of this posting.
    #[must_use]
    pub fn link_identity(&self) -> String {
        crate::link::link_identity(&self.link)
    }

    /// Stable hash of the link identity, used as the upsert key.
    #[must_use]
    pub fn link_hash(&self) -> String {
        crate::link::link_hash(&self.link)
    }
}
