//! Browser session for the JavaScript-rendered job listing.
//!
//! Exposes the narrow page/element capabilities the scraper consumes and a
//! chromiumoxide-backed implementation with a single primary tab plus
//! short-lived isolated tabs for detail pages.

pub mod actions;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod wait;

pub use actions::{extract_domain, ContextHandle, Element, PageSession};
pub use engine::{BrowserElement, BrowserEngine};
pub use error::{BrowserError, Result};
pub use wait::wait_until;
