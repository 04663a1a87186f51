//! Workly command line shell
//!
//! Wires configuration, the browser session, the exchange rate provider and
//! the database into one crawl. Core logic lives in the `crates/` directory.

mod cli;
mod store;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{debug, info, warn};
use workly_browser::BrowserEngine;
use workly_core::{AppConfig, PersistenceGateway};
use workly_db::Database;
use workly_rates::{ExchangeRateProvider, FileRateCache, ReqwestJsonClient};
use workly_scraper::{CrawlReport, Crawler, ListingSelectors};

/// Initialize tracing subscriber for logging
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,workly=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

fn load_config(args: &cli::Args) -> Result<AppConfig> {
    let config = match &args.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("failed to load config")?,
    };
    let mut config = config.with_env_overrides();
    args.apply(&mut config);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Open the database, or a store that always fails so the crawl still ends
/// in the CSV export.
async fn open_store(config: &AppConfig) -> Result<Arc<dyn PersistenceGateway>> {
    let path = config.database_path()?;
    let opened = async {
        let db = Database::new(&path).await?;
        db.run_migrations().await?;
        Ok::<_, workly_db::DatabaseError>(db)
    }
    .await;

    match opened {
        Ok(db) => {
            info!("Database ready at {}", path.display());
            Ok(Arc::new(db))
        }
        Err(e) => {
            warn!("Database unavailable ({}), postings will be exported to CSV", e);
            Ok(Arc::new(store::UnavailableStore::new(e.to_string())))
        }
    }
}

fn log_report(report: &CrawlReport) {
    info!(
        "Crawl finished: {} collected, {} kept after filter and dedup",
        report.collected, report.kept
    );
    match (report.persisted, &report.exported_to) {
        (Some(rows), _) => info!("{} postings saved to the database", rows),
        (None, Some(path)) => warn!("Database write failed, postings exported to {}", path.display()),
        (None, None) => warn!("Database write failed and no export was written"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    init_tracing();

    info!("Starting Workly v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args)?;
    let gateway = open_store(&config).await?;

    let client = ReqwestJsonClient::new().context("failed to build HTTP client")?;
    let cache = FileRateCache::new(config.rate_cache_path()?);
    let rates = Arc::new(ExchangeRateProvider::new(client, cache, &config.rates));

    let selectors = match &args.selectors {
        Some(path) => ListingSelectors::load_from(path)
            .with_context(|| format!("failed to load selectors from {}", path.display()))?,
        None => ListingSelectors::default(),
    };

    let engine = Arc::new(
        BrowserEngine::launch(&config.browser)
            .await
            .context("failed to launch browser")?,
    );
    debug!("Browser user agent: {}", engine.user_agent());

    let crawler = Crawler::new(
        Arc::clone(&engine),
        rates,
        gateway,
        config.scraping.clone(),
        config.fallback_export_path()?,
    )
    .with_selectors(selectors);
    let outcome = crawler.run(config.scraping.query.as_deref()).await;
    drop(crawler);

    match Arc::try_unwrap(engine) {
        Ok(engine) => engine.shutdown().await,
        Err(_) => warn!("Browser still in use, skipping shutdown"),
    }

    let report = outcome.context("crawl failed")?;
    log_report(&report);
    Ok(())
}
