use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use crate::config::CacheConfig;
use crate::data::cache::TtlCache;
use crate::data::catalog::{normalize_symbol, CommodityInfo};
use crate::data::error::FeedError;
use crate::data::feed::{CommodityFeed, NO_DATA};
use crate::data::types::Interval;

pub type ResponseCache = TtlCache<Value, FeedError>;

/// JSON operations exposed to the paid-request layer.
///
/// Inputs arrive validated (interval enum, limit 1..=60); commodity names are
/// normalized here. Every payload that came through the cache carries
/// `cacheAgeSeconds`.
pub struct Entrypoints {
    feed: Arc<CommodityFeed>,
    cache: Arc<ResponseCache>,
    ttls: CacheConfig,
}

impl Entrypoints {
    pub fn new(feed: Arc<CommodityFeed>, cache: Arc<ResponseCache>, ttls: CacheConfig) -> Self {
        Self { feed, cache, ttls }
    }

    pub fn commodities(&self) -> Value {
        json!({ "commodities": self.feed.catalog() })
    }

    pub async fn latest(&self, commodity: &str, interval: Interval) -> Result<Value, FeedError> {
        let Some(info) = self.resolve(commodity) else {
            return Ok(self.unknown_commodity());
        };

        let feed = self.feed.clone();
        let key = format!("latest:{}:{}", info.key, interval);
        self.cached(&key, self.ttls.latest_ttl(), async move {
            let payload = match feed.latest(info.key, interval).await? {
                Some(price) => with_commodity(info, json!(price)),
                None => no_data(),
            };
            Ok::<_, FeedError>(payload)
        })
        .await
    }

    pub async fn all(&self, interval: Interval) -> Result<Value, FeedError> {
        let feed = self.feed.clone();
        let key = format!("all:{}", interval);
        self.cached(&key, self.ttls.all_ttl(), async move {
            let snapshot = feed.all(interval).await;
            Ok::<_, FeedError>(json!({ "interval": interval, "commodities": snapshot }))
        })
        .await
    }

    pub async fn history(&self, commodity: &str, interval: Interval, limit: usize) -> Result<Value, FeedError> {
        let Some(info) = self.resolve(commodity) else {
            return Ok(self.unknown_commodity());
        };

        let feed = self.feed.clone();
        let key = format!("history:{}:{}:{}", info.key, interval, limit);
        self.cached(&key, self.ttls.history_ttl(), async move {
            let payload = match feed.history(info.key, interval, limit).await? {
                Some(points) => json!({
                    "commodity": info.key,
                    "interval": interval,
                    "count": points.len(),
                    "data": points,
                }),
                None => no_data(),
            };
            Ok::<_, FeedError>(payload)
        })
        .await
    }

    pub async fn index(&self) -> Result<Value, FeedError> {
        let feed = self.feed.clone();
        self.cached("index:monthly", self.ttls.index_ttl(), async move {
            Ok::<_, FeedError>(match feed.index().await? {
                Some(price) => json!(price),
                None => no_data(),
            })
        })
        .await
    }

    pub async fn analysis(&self, commodity: &str) -> Result<Value, FeedError> {
        let Some(info) = self.resolve(commodity) else {
            return Ok(self.unknown_commodity());
        };

        let feed = self.feed.clone();
        let key = format!("analysis:{}", info.key);
        self.cached(&key, self.ttls.analysis_ttl(), async move {
            Ok::<_, FeedError>(match feed.analysis(info.key).await? {
                Some(analysis) => json!(analysis),
                None => no_data(),
            })
        })
        .await
    }

    fn resolve(&self, commodity: &str) -> Option<&'static CommodityInfo> {
        self.feed.lookup(&normalize_symbol(commodity))
    }

    fn unknown_commodity(&self) -> Value {
        let available: Vec<&str> = self.feed.catalog().iter().map(|c| c.key).collect();
        json!({ "error": "Unknown commodity", "available": available })
    }

    async fn cached<Fut>(&self, key: &str, ttl: Duration, compute: Fut) -> Result<Value, FeedError>
    where
        Fut: std::future::Future<Output = Result<Value, FeedError>> + Send + 'static,
    {
        let mut payload = self.cache.get_or_compute(key, ttl, move || compute).await?;
        debug!("Served {} ({} entries cached)", key, self.cache.len());

        if let (Some(fields), Some(age)) = (payload.as_object_mut(), self.cache.age_seconds(key)) {
            fields.insert("cacheAgeSeconds".to_string(), json!(age));
        }
        Ok(payload)
    }
}

fn with_commodity(info: &CommodityInfo, mut payload: Value) -> Value {
    if let Some(fields) = payload.as_object_mut() {
        fields.insert("commodity".to_string(), json!(info.key));
        fields.insert("category".to_string(), json!(info.category));
    }
    payload
}

fn no_data() -> Value {
    json!({ "error": NO_DATA })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::feed::testing::FakeProvider;

    fn entrypoints(provider: FakeProvider) -> (Entrypoints, Arc<FakeProvider>) {
        let provider = Arc::new(provider);
        let feed = Arc::new(CommodityFeed::new(provider.clone()));
        let api = Entrypoints::new(feed, Arc::new(ResponseCache::new()), CacheConfig::default());
        (api, provider)
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_normalizes_and_caches() {
        let (api, provider) = entrypoints(FakeProvider::default().with_prices("NATURAL_GAS", &[2.61, 2.5]));

        let first = api.latest("Natural Gas", Interval::Daily).await.unwrap();
        assert_eq!(first["commodity"], "natural_gas");
        assert_eq!(first["category"], "energy");
        assert_eq!(first["price"], 2.61);
        assert_eq!(first["cacheAgeSeconds"], 0);

        tokio::time::advance(Duration::from_secs(30)).await;

        let second = api.latest("natural-gas", Interval::Daily).await.unwrap();
        assert_eq!(second["price"], 2.61);
        assert_eq!(second["cacheAgeSeconds"], 30);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_commodity_lists_available() {
        let (api, provider) = entrypoints(FakeProvider::default());

        let payload = api.analysis("unobtainium").await.unwrap();
        assert_eq!(payload["error"], "Unknown commodity");
        assert_eq!(payload["available"].as_array().unwrap().len(), 10);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_series_reports_no_data() {
        let (api, _) = entrypoints(FakeProvider::default());

        let payload = api.history("wheat", Interval::Monthly, 12).await.unwrap();
        assert_eq!(payload["error"], "No data available");
    }

    #[tokio::test]
    async fn test_provider_failure_rejects_and_is_not_cached() {
        let (api, provider) = entrypoints(FakeProvider::default().with_error("COFFEE", FeedError::Status(500)));

        assert_eq!(api.latest("coffee", Interval::Daily).await, Err(FeedError::Status(500)));
        assert_eq!(api.latest("coffee", Interval::Daily).await, Err(FeedError::Status(500)));
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_history_payload() {
        let (api, _) = entrypoints(FakeProvider::default().with_prices("SUGAR", &[20.1, 19.8, 19.5]));

        let payload = api.history("sugar", Interval::Monthly, 2).await.unwrap();
        assert_eq!(payload["count"], 2);
        assert_eq!(payload["interval"], "monthly");
        assert_eq!(payload["data"][1]["price"], 19.8);
    }

    #[tokio::test]
    async fn test_history_limit_is_part_of_cache_key() {
        let (api, provider) = entrypoints(FakeProvider::default().with_prices("SUGAR", &[20.1, 19.8, 19.5]));

        api.history("sugar", Interval::Monthly, 2).await.unwrap();
        let payload = api.history("sugar", Interval::Monthly, 3).await.unwrap();
        assert_eq!(payload["count"], 3);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_index_and_analysis_payloads() {
        let prices: Vec<f64> = (0..10).map(|i| 100.0 - i as f64).collect();
        let (api, _) = entrypoints(
            FakeProvider::default()
                .with_prices("ALL_COMMODITIES", &[180.2])
                .with_prices("CORN", &prices),
        );

        let index = api.index().await.unwrap();
        assert_eq!(index["price"], 180.2);
        assert_eq!(index["interval"], "monthly");

        let analysis = api.analysis("corn").await.unwrap();
        assert_eq!(analysis["commodity"], "corn");
        assert_eq!(analysis["changes"]["day30"], Value::Null);
        assert_eq!(analysis["signal"]["trend"], "unknown");
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_snapshot_payload() {
        let (api, _) = entrypoints(FakeProvider::default().with_prices("WTI", &[78.5]));

        let payload = api.all(Interval::Monthly).await.unwrap();
        assert_eq!(payload["interval"], "monthly");
        assert_eq!(payload["commodities"]["wti"]["price"], 78.5);
        assert_eq!(payload["commodities"]["brent"]["error"], "No data available");
    }

    #[test]
    fn test_commodities_listing() {
        let (api, _) = entrypoints(FakeProvider::default());
        let listing = api.commodities();

        let first = &listing["commodities"][0];
        assert_eq!(first["key"], "wti");
        assert_eq!(first["category"], "energy");
        assert!(first.get("function").is_none());
    }
}
