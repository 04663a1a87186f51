//! Command line arguments.

use clap::Parser;
use std::path::PathBuf;
use workly_core::AppConfig;

/// Collect IT postings from Workana into the local job feed.
#[derive(Parser, Debug)]
#[command(name = "workly", author, version, about, long_about = None)]
pub struct Args {
    /// Search query; the full IT listing is crawled when omitted
    #[arg(short, long)]
    pub query: Option<String>,

    /// Keep only postings mentioning this keyword (repeatable)
    #[arg(short, long = "filter", value_name = "KEYWORD")]
    pub filters: Vec<String>,

    /// Maximum scroll attempts while loading the listing
    #[arg(long)]
    pub max_scroll: Option<u32>,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Read configuration from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// TOML file overriding the listing's CSS selectors
    #[arg(long, value_name = "PATH")]
    pub selectors: Option<PathBuf>,
}

impl Args {
    /// Fold command line overrides into `config`.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(query) = self.query.as_ref().filter(|q| !q.trim().is_empty()) {
            config.scraping.query = Some(query.clone());
        }
        for keyword in &self.filters {
            if !config
                .scraping
                .language_filter
                .iter()
                .any(|k| k.eq_ignore_ascii_case(keyword))
            {
                config.scraping.language_filter.push(keyword.clone());
            }
        }
        if let Some(max_scroll) = self.max_scroll {
            config.scraping.max_scroll_attempts = max_scroll;
        }
        if self.headful {
            config.browser.headless = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "workly", "-q", "python django", "-f", "python", "--filter", "django", "--max-scroll",
            "3", "--headful",
        ])
        .unwrap();

        assert_eq!(args.query.as_deref(), Some("python django"));
        assert_eq!(args.filters, vec!["python", "django"]);
        assert_eq!(args.max_scroll, Some(3));
        assert!(args.headful);
        assert!(args.config.is_none());
        assert!(args.selectors.is_none());
    }

    #[test]
    fn test_parse_paths() {
        let args =
            Args::try_parse_from(["workly", "--config", "w.toml", "--selectors", "sel.toml"])
                .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("w.toml")));
        assert_eq!(args.selectors, Some(PathBuf::from("sel.toml")));
    }

    #[test]
    fn test_defaults_leave_config_untouched() {
        let args = Args::try_parse_from(["workly"]).unwrap();
        let mut config = AppConfig::default();
        args.apply(&mut config);

        assert_eq!(config.scraping.query, None);
        assert!(config.scraping.language_filter.is_empty());
        assert_eq!(config.scraping.max_scroll_attempts, 15);
        assert!(config.browser.headless);
    }

    #[test]
    fn test_apply_extends_filter_without_duplicates() {
        let args = Args::try_parse_from(["workly", "-f", "Python", "-f", "rust"]).unwrap();
        let mut config = AppConfig::default();
        config.scraping.language_filter = vec!["python".to_string()];
        args.apply(&mut config);

        assert_eq!(config.scraping.language_filter, vec!["python", "rust"]);
    }

    #[test]
    fn test_blank_query_keeps_configured_one() {
        let args = Args::try_parse_from(["workly", "--query", "  "]).unwrap();
        let mut config = AppConfig::default();
        config.scraping.query = Some("scraping".to_string());
        args.apply(&mut config);

        assert_eq!(config.scraping.query.as_deref(), Some("scraping"));
    }
}
