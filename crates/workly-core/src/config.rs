//! Configuration management for Workly.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration.
///
/// This is loaded from `~/.config/workly/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listing site and crawl behavior
    pub scraping: ScrapingConfig,
    /// Exchange rate sources and cache
    pub rates: RatesConfig,
    /// Browser automation settings
    pub browser: BrowserConfig,
    /// Database and fallback export locations
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from the default path, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, falling back to defaults if not found.
    pub fn load_from(config_path: &Path) -> ConfigResult<Self> {
        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(config_path)?;
            let config: Self = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `WORKLY_HEADLESS`: Override browser headless mode (true/false)
    /// - `WORKLY_DATABASE_PATH`: Override the SQLite database path
    /// - `WORKLY_FALLBACK_RATE`: Override the fixed USD→BRL fallback rate
    /// - `WORKLY_QUERY`: Default search query when none is given on the command line
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("WORKLY_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Ok(val) = std::env::var("WORKLY_DATABASE_PATH") {
            if !val.trim().is_empty() {
                tracing::debug!("Override storage.database_path from env: {}", val);
                self.storage.database_path = Some(PathBuf::from(val));
            }
        }

        if let Ok(val) = std::env::var("WORKLY_FALLBACK_RATE") {
            if let Ok(rate) = val.parse::<rust_decimal::Decimal>() {
                self.rates.fallback_rate = rate;
                tracing::debug!("Override rates.fallback_rate from env: {}", rate);
            }
        }

        if let Ok(val) = std::env::var("WORKLY_QUERY") {
            if !val.trim().is_empty() {
                self.scraping.query = Some(val);
            }
        }

        self
    }

    /// Check values that would make a crawl meaningless.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.rates.fallback_rate <= rust_decimal::Decimal::ZERO {
            return Err(ConfigError::InvalidValue {
                field: "rates.fallback_rate".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if !self.scraping.search_url_template.contains("{query}") {
            return Err(ConfigError::InvalidValue {
                field: "scraping.search_url_template".to_string(),
                reason: "must contain a {query} placeholder".to_string(),
            });
        }
        Ok(())
    }

    /// Save configuration to the default path.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/workly/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Get the data directory path (`~/.local/share/workly`).
    pub fn data_dir() -> ConfigResult<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().to_path_buf())
    }

    /// Get the cache directory path (`~/.cache/workly`).
    pub fn cache_dir() -> ConfigResult<PathBuf> {
        Ok(Self::project_dirs()?.cache_dir().to_path_buf())
    }

    /// Resolved database path: explicit setting or `<data_dir>/workly.db`.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        match &self.storage.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("workly.db")),
        }
    }

    /// Resolved rate cache path: explicit setting or `<cache_dir>/usd_brl_cache.txt`.
    pub fn rate_cache_path(&self) -> ConfigResult<PathBuf> {
        match &self.rates.cache_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::cache_dir()?.join("usd_brl_cache.txt")),
        }
    }

    /// Resolved CSV fallback export path: explicit setting or `<data_dir>/postings.csv`.
    pub fn fallback_export_path(&self) -> ConfigResult<PathBuf> {
        match &self.storage.fallback_export_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("postings.csv")),
        }
    }

    fn project_dirs() -> ConfigResult<ProjectDirs> {
        ProjectDirs::from("com", "workly", "workly").ok_or(ConfigError::NoConfigDir)
    }
}

/// Listing site and crawl behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// Site root used to absolutize relative posting links
    pub base_url: String,
    /// Listing URL used when no query is given
    pub listing_url: String,
    /// Listing URL with a `{query}` placeholder
    pub search_url_template: String,
    /// Default search query
    pub query: Option<String>,
    /// Keywords a posting must mention to be kept (empty keeps everything)
    pub language_filter: Vec<String>,
    /// Maximum scroll attempts while loading the listing
    pub max_scroll_attempts: u32,
    /// Pause after each scroll in milliseconds
    pub scroll_pause_ms: u64,
    /// Wait for listing cards to appear, in seconds
    pub listing_wait_secs: u64,
    /// Wait for in-place description expansion, in seconds
    pub expand_wait_secs: u64,
    /// Wait for the detail page description, in seconds
    pub detail_wait_secs: u64,
    /// Wait for the detail page budget, in seconds
    pub budget_wait_secs: u64,
    /// Descriptions shorter than this escalate to the detail page
    pub min_description_chars: usize,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.workana.com".to_string(),
            listing_url:
                "https://www.workana.com/jobs?category=it-programming&language=pt&publication=1d"
                    .to_string(),
            search_url_template: "https://www.workana.com/jobs?category=it-programming&language=pt&publication=1d&query={query}".to_string(),
            query: None,
            language_filter: Vec::new(),
            max_scroll_attempts: 15,
            scroll_pause_ms: 2500,
            listing_wait_secs: 4,
            expand_wait_secs: 2,
            detail_wait_secs: 8,
            budget_wait_secs: 3,
            min_description_chars: 80,
        }
    }
}

impl ScrapingConfig {
    /// Listing URL for an optional query; whitespace in the query becomes `+`.
    #[must_use]
    pub fn listing_url_for(&self, query: Option<&str>) -> String {
        match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => {
                let joined = q.split_whitespace().collect::<Vec<_>>().join("+");
                self.search_url_template.replace("{query}", &joined)
            }
            None => self.listing_url.clone(),
        }
    }
}

/// Exchange rate sources and cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatesConfig {
    /// Rate used when every source fails
    pub fallback_rate: rust_decimal::Decimal,
    /// Cache validity in seconds
    pub ttl_secs: u64,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Cache file location (defaults under the XDG cache dir)
    pub cache_path: Option<PathBuf>,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            fallback_rate: rust_decimal::Decimal::new(560, 2),
            ttl_secs: 3600,
            timeout_secs: 6,
            cache_path: None,
        }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Navigation timeout in seconds
    pub navigation_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            navigation_timeout_secs: 30,
        }
    }
}

/// Database and fallback export locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file (defaults under the XDG data dir)
    pub database_path: Option<PathBuf>,
    /// CSV written when persistence fails (defaults under the XDG data dir)
    pub fallback_export_path: Option<PathBuf>,
}
