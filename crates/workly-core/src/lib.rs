//! Workly Core - Foundation crate for the Workly job feed.
//!
//! This crate provides the shared posting model, link identity hashing,
//! error handling, configuration management and the persistence seam that
//! all other Workly crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared domain types (`Posting`, `Currency`, `ConversionMethod`)
//! - [`link`] - Link identity normalization and hashing
//! - [`gateway`] - The `PersistenceGateway` trait implemented by storage crates
//!
//! # Example
//!
//! ```rust
//! use workly_core::{link_hash, link_identity};
//!
//! let identity = link_identity("https://WWW.Workana.com/job/site-x/?ref=feed");
//! assert_eq!(identity, "https://www.workana.com/job/site-x");
//! assert_eq!(link_hash("https://www.workana.com/job/site-x").len(), 64);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod gateway;
pub mod link;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, BrowserConfig, RatesConfig, ScrapingConfig, StorageConfig};
pub use error::{ConfigError, ConfigResult, Result, WorklyError};
pub use gateway::PersistenceGateway;
pub use link::{absolutize, link_hash, link_identity};
pub use types::{ConversionMethod, Currency, Posting};
