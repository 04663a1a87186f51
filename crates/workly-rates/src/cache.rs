//! Rate cache storage.
//!
//! The on-disk format is a single line `timestamp,rate` where `timestamp` is
//! unix seconds (fractional part allowed). A missing, unreadable or malformed
//! file is a cache miss, never an error.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;

/// A rate together with the moment it was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedRate {
    /// BRL per USD
    pub rate: Decimal,
    /// When the rate was obtained
    pub fetched_at: DateTime<Utc>,
}

impl CachedRate {
    /// Rate obtained now.
    #[must_use]
    pub fn now(rate: Decimal) -> Self {
        Self {
            rate,
            fetched_at: Utc::now(),
        }
    }

    /// Whether the entry is younger than `ttl` at `now`.
    #[must_use]
    pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        let Ok(ttl) = chrono::Duration::from_std(ttl) else {
            return true;
        };
        now.signed_duration_since(self.fetched_at) < ttl
    }

    /// Encode as the single cache line.
    #[must_use]
    pub fn to_line(&self) -> String {
        format!(
            "{}.{:03},{}",
            self.fetched_at.timestamp(),
            self.fetched_at.timestamp_subsec_millis(),
            self.rate
        )
    }

    /// Decode a cache line, `None` when malformed.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        let (ts, rate) = line.trim().split_once(',')?;
        let seconds: f64 = ts.trim().parse().ok()?;
        if !seconds.is_finite() || seconds < 0.0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        let fetched_at = DateTime::from_timestamp_millis((seconds * 1000.0).round() as i64)?;
        let rate = Decimal::from_str(rate.trim()).ok()?;
        Some(Self { rate, fetched_at })
    }
}

/// Where the provider keeps its last obtained rate.
pub trait RateCache: Send + Sync {
    /// Last stored rate, `None` on miss.
    fn load(&self) -> Option<CachedRate>;

    /// Replace the stored rate. Failures are logged, not returned.
    fn store(&self, entry: &CachedRate);
}

/// Single-line cache file.
///
/// Single-writer by assumption: concurrent processes sharing the file race
/// harmlessly because each write replaces the whole value.
#[derive(Debug, Clone)]
pub struct FileRateCache {
    path: PathBuf,
}

impl FileRateCache {
    /// Cache backed by `path`; the file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the cache file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RateCache for FileRateCache {
    fn load(&self) -> Option<CachedRate> {
        let contents = fs::read_to_string(&self.path).ok()?;
        let entry = CachedRate::parse_line(&contents);
        if entry.is_none() {
            tracing::debug!("Ignoring malformed rate cache at {}", self.path.display());
        }
        entry
    }

    fn store(&self, entry: &CachedRate) {
        if let Some(dir) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(dir) {
                tracing::debug!("Cannot create rate cache dir {}: {}", dir.display(), e);
                return;
            }
        }
        if let Err(e) = fs::write(&self.path, entry.to_line()) {
            tracing::debug!("Cannot write rate cache {}: {}", self.path.display(), e);
        }
    }
}

/// In-process cache, used in tests and for one-off runs without a cache file.
#[derive(Debug, Default)]
pub struct MemoryRateCache {
    entry: Mutex<Option<CachedRate>>,
}

impl MemoryRateCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-seeded with an entry.
    #[must_use]
    pub fn with_entry(entry: CachedRate) -> Self {
        Self {
            entry: Mutex::new(Some(entry)),
        }
    }
}

impl RateCache for MemoryRateCache {
    fn load(&self) -> Option<CachedRate> {
        self.entry.lock().ok().and_then(|guard| *guard)
    }

    fn store(&self, entry: &CachedRate) {
        if let Ok(mut guard) = self.entry.lock() {
            *guard = Some(*entry);
        }
    }
}
