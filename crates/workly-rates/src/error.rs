//! Error types for the exchange rate subsystem.
//!
//! None of these reach callers of [`crate::ExchangeRateProvider::get_rate`];
//! they describe why a single source or cache access was skipped.

use thiserror::Error;

/// Errors that can occur while obtaining a rate from one source.
#[derive(Error, Debug)]
pub enum RateError {
    /// Network failure or timeout
    #[error("request to {url} failed: {message}")]
    Request {
        /// Requested URL
        url: String,
        /// Error message
        message: String,
    },

    /// Non-success HTTP status
    #[error("API error from {url}: status {status}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Body was not the expected JSON shape
    #[error("unexpected response from {source_name}: {message}")]
    InvalidResponse {
        /// Source name
        source_name: String,
        /// What was wrong
        message: String,
    },

    /// HTTP client could not be built
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

/// Result type alias for rate operations.
pub type Result<T> = std::result::Result<T, RateError>;
