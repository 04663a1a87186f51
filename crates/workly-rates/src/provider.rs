//! USD→BRL rate provider with cache and ordered source failover.

use crate::cache::{CachedRate, RateCache};
use crate::client::HttpJsonClient;
use crate::error::{RateError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;
use workly_core::RatesConfig;

/// AwesomeAPI last-quote endpoint.
pub const AWESOME_API_URL: &str = "https://economia.awesomeapi.com.br/json/last/USD-BRL";

/// Frankfurter (ECB) latest-rate endpoint.
pub const FRANKFURTER_URL: &str = "https://api.frankfurter.app/latest?from=USD&to=BRL";

/// Anything that can answer "how many BRL is one USD".
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Current rate. Implementations never fail.
    async fn get_rate(&self) -> Decimal;
}

/// One JSON currency API.
#[derive(Debug, Clone)]
pub struct RateSource {
    /// Short name used in logs
    pub name: &'static str,
    /// Endpoint to GET
    pub url: String,
    /// Pulls the rate out of the decoded body
    pub extract: fn(&Value) -> Option<Decimal>,
}

/// Built-in sources in failover order: AwesomeAPI, then Frankfurter.
#[must_use]
pub fn default_sources() -> Vec<RateSource> {
    vec![
        RateSource {
            name: "awesomeapi",
            url: AWESOME_API_URL.to_string(),
            extract: |body| body.get("USDBRL")?.get("bid").and_then(decimal_from_json),
        },
        RateSource {
            name: "frankfurter",
            url: FRANKFURTER_URL.to_string(),
            extract: |body| body.get("rates")?.get("BRL").and_then(decimal_from_json),
        },
    ]
}

/// Accepts both `"5.43"` and `5.43`.
fn decimal_from_json(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        _ => None,
    }
}

/// Exchange rate provider.
///
/// Answers from the cache while it is younger than the TTL, otherwise walks the
/// sources in order and finally settles on the configured fallback rate. Whatever
/// value is obtained is written back to the cache.
pub struct ExchangeRateProvider<C, K> {
    client: C,
    cache: K,
    sources: Vec<RateSource>,
    ttl: Duration,
    timeout: Duration,
    fallback_rate: Decimal,
}

impl<C: HttpJsonClient, K: RateCache> ExchangeRateProvider<C, K> {
    /// Provider over the default sources.
    pub fn new(client: C, cache: K, config: &RatesConfig) -> Self {
        Self {
            client,
            cache,
            sources: default_sources(),
            ttl: Duration::from_secs(config.ttl_secs),
            timeout: Duration::from_secs(config.timeout_secs),
            fallback_rate: config.fallback_rate,
        }
    }

    /// Replace the source list.
    #[must_use]
    pub fn with_sources(mut self, sources: Vec<RateSource>) -> Self {
        self.sources = sources;
        self
    }

    /// Current USD→BRL rate.
    pub async fn get_rate(&self) -> Decimal {
        if let Some(entry) = self.cache.load() {
            if entry.is_fresh(self.ttl, Utc::now()) {
                tracing::debug!("Using cached USD/BRL rate {}", entry.rate);
                return entry.rate;
            }
            tracing::debug!("Cached USD/BRL rate from {} is stale", entry.fetched_at);
        }

        let rate = self.fetch_first_available().await.unwrap_or_else(|| {
            tracing::warn!(
                "All exchange rate sources failed, using fallback rate {}",
                self.fallback_rate
            );
            self.fallback_rate
        });

        self.cache.store(&CachedRate::now(rate));
        rate
    }

    async fn fetch_first_available(&self) -> Option<Decimal> {
        for source in &self.sources {
            match self.fetch_from(source).await {
                Ok(rate) => {
                    tracing::info!("USD/BRL rate {} from {}", rate, source.name);
                    return Some(rate);
                }
                Err(e) => tracing::debug!("Rate source {} failed: {}", source.name, e),
            }
        }
        None
    }

    async fn fetch_from(&self, source: &RateSource) -> Result<Decimal> {
        let body = self.client.get_json(&source.url, self.timeout).await?;
        let rate = (source.extract)(&body).ok_or_else(|| RateError::InvalidResponse {
            source_name: source.name.to_string(),
            message: "rate field missing or not numeric".to_string(),
        })?;

        if rate <= Decimal::ZERO {
            return Err(RateError::InvalidResponse {
                source_name: source.name.to_string(),
                message: format!("non-positive rate {rate}"),
            });
        }
        Ok(rate)
    }
}

#[async_trait]
impl<C: HttpJsonClient, K: RateCache> RateProvider for ExchangeRateProvider<C, K> {
    async fn get_rate(&self) -> Decimal {
        ExchangeRateProvider::get_rate(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryRateCache;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Serves canned bodies per URL; unknown URLs fail like a network error.
    #[derive(Clone, Default)]
    struct StubClient {
        bodies: HashMap<String, Value>,
        calls: Arc<AtomicUsize>,
    }

    impl StubClient {
        fn with(mut self, url: &str, body: Value) -> Self {
            self.bodies.insert(url.to_string(), body);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HttpJsonClient for StubClient {
        async fn get_json(&self, url: &str, _timeout: Duration) -> Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bodies.get(url).cloned().ok_or_else(|| RateError::Request {
                url: url.to_string(),
                message: "connection refused".to_string(),
            })
        }
    }

    fn provider(
        client: StubClient,
        cache: MemoryRateCache,
    ) -> ExchangeRateProvider<StubClient, MemoryRateCache> {
        ExchangeRateProvider::new(client, cache, &RatesConfig::default())
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn test_awesomeapi_string_bid() {
        let client = StubClient::default().with(AWESOME_API_URL, json!({"USDBRL": {"bid": "5.4321"}}));
        let provider = provider(client.clone(), MemoryRateCache::new());

        assert_eq!(provider.get_rate().await, dec("5.4321"));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_second_call_within_ttl_uses_cache() {
        let client = StubClient::default().with(AWESOME_API_URL, json!({"USDBRL": {"bid": 5.1}}));
        let provider = provider(client.clone(), MemoryRateCache::new());

        let first = provider.get_rate().await;
        let second = provider.get_rate().await;

        assert_eq!(first, dec("5.1"));
        assert_eq!(second, first);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_stale_cache_triggers_refetch() {
        let stale = CachedRate {
            rate: dec("4.00"),
            fetched_at: Utc::now() - chrono::Duration::seconds(7200),
        };
        let client = StubClient::default().with(AWESOME_API_URL, json!({"USDBRL": {"bid": "5.25"}}));
        let provider = provider(client.clone(), MemoryRateCache::with_entry(stale));

        assert_eq!(provider.get_rate().await, dec("5.25"));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_fresh_cache_makes_no_calls() {
        let client = StubClient::default();
        let provider = provider(
            client.clone(),
            MemoryRateCache::with_entry(CachedRate::now(dec("5.77"))),
        );

        assert_eq!(provider.get_rate().await, dec("5.77"));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_awesomeapi_failure_falls_over_to_frankfurter() {
        let client = StubClient::default().with(FRANKFURTER_URL, json!({"rates": {"BRL": 5.02}}));
        let provider = provider(client.clone(), MemoryRateCache::new());

        assert_eq!(provider.get_rate().await, dec("5.02"));
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_malformed_and_non_positive_values_are_skipped() {
        let client = StubClient::default()
            .with(AWESOME_API_URL, json!({"USDBRL": {"bid": "0"}}))
            .with(FRANKFURTER_URL, json!({"rates": {"EUR": 0.9}}));
        let provider = provider(client, MemoryRateCache::new());

        assert_eq!(provider.get_rate().await, dec("5.60"));
    }

    #[tokio::test]
    async fn test_total_failure_uses_fallback_and_caches_it() {
        let client = StubClient::default();
        let cache = MemoryRateCache::new();
        let provider = provider(client.clone(), cache);

        assert_eq!(provider.get_rate().await, dec("5.60"));
        assert_eq!(client.calls(), 2);

        // The fallback is cached, so no further source calls within the TTL
        assert_eq!(provider.get_rate().await, dec("5.60"));
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_custom_source_list() {
        let client = StubClient::default().with("http://rates.local/usd", json!({"value": "6.1"}));
        let provider = provider(client, MemoryRateCache::new()).with_sources(vec![RateSource {
            name: "local",
            url: "http://rates.local/usd".to_string(),
            extract: |body| body.get("value").and_then(decimal_from_json),
        }]);

        assert_eq!(provider.get_rate().await, dec("6.1"));
    }

    #[test]
    fn test_decimal_from_json() {
        assert_eq!(decimal_from_json(&json!("5.5")), Some(dec("5.5")));
        assert_eq!(decimal_from_json(&json!(5.5)), Some(dec("5.5")));
        assert_eq!(decimal_from_json(&json!(5)), Some(dec("5")));
        assert_eq!(decimal_from_json(&json!("abc")), None);
        assert_eq!(decimal_from_json(&json!(null)), None);
    }
}
