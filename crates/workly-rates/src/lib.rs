//! Workly Rates - USD→BRL exchange rate provider.
//!
//! The provider never fails: it answers from a time-boxed cache, then from an
//! ordered list of JSON currency APIs, and finally from a fixed fallback rate.
//!
//! # Example
//!
//! ```rust,ignore
//! use workly_rates::{ExchangeRateProvider, FileRateCache, ReqwestJsonClient};
//!
//! let provider = ExchangeRateProvider::new(
//!     ReqwestJsonClient::new()?,
//!     FileRateCache::new(cache_path),
//!     &config.rates,
//! );
//! let rate = provider.get_rate().await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod cache;
pub mod client;
pub mod error;
pub mod provider;

pub use cache::{CachedRate, FileRateCache, MemoryRateCache, RateCache};
pub use client::{HttpJsonClient, ReqwestJsonClient};
pub use error::{RateError, Result};
pub use provider::{
    default_sources, ExchangeRateProvider, RateProvider, RateSource, AWESOME_API_URL, FRANKFURTER_URL,
};
