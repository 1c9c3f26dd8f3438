use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use crate::analytics::indicators;
use crate::analytics::types::CommodityAnalysis;
use crate::data::alpha_vantage::SeriesProvider;
use crate::data::catalog::{self, CommodityInfo, INDEX_FUNCTION};
use crate::data::error::FeedError;
use crate::data::types::{CommodityPrice, HistoricalPoint, Interval, RawSeries, SnapshotEntry};

/// Pause between provider calls in the bulk snapshot; the free tier caps
/// requests per minute.
pub const BATCH_CALL_DELAY: Duration = Duration::from_millis(200);

pub const MAX_HISTORY_LIMIT: usize = 60;

pub const NO_DATA: &str = "No data available";

/// Fetches raw series and turns them into price views
pub struct CommodityFeed {
    provider: Arc<dyn SeriesProvider>,
    catalog: &'static [CommodityInfo],
}

impl CommodityFeed {
    pub fn new(provider: Arc<dyn SeriesProvider>) -> Self {
        Self::with_catalog(provider, catalog::COMMODITIES)
    }

    pub fn with_catalog(provider: Arc<dyn SeriesProvider>, catalog: &'static [CommodityInfo]) -> Self {
        Self { provider, catalog }
    }

    pub fn catalog(&self) -> &'static [CommodityInfo] {
        self.catalog
    }

    pub fn lookup(&self, key: &str) -> Option<&'static CommodityInfo> {
        self.catalog.iter().find(|c| c.key == key)
    }

    /// Newest price for a commodity. `None` for unknown keys and empty series.
    pub async fn latest(&self, key: &str, interval: Interval) -> Result<Option<CommodityPrice>, FeedError> {
        let Some(info) = self.lookup(key) else {
            return Ok(None);
        };
        let series = self.provider.fetch_series(info.function, interval).await?;
        Ok(latest_price(&series, interval))
    }

    /// Newest price for every catalog entry, one provider call at a time.
    ///
    /// A failing symbol is recorded as an error entry and the batch continues.
    pub async fn all(&self, interval: Interval) -> BTreeMap<String, SnapshotEntry> {
        let mut snapshot = BTreeMap::new();

        for (i, info) in self.catalog.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(BATCH_CALL_DELAY).await;
            }

            let entry = match self.latest(info.key, interval).await {
                Ok(Some(price)) => SnapshotEntry::Price(price),
                Ok(None) => SnapshotEntry::Failed { error: NO_DATA.to_string() },
                Err(e) => {
                    warn!("Snapshot failed for {}: {}", info.key, e);
                    SnapshotEntry::Failed { error: e.to_string() }
                }
            };
            snapshot.insert(info.key.to_string(), entry);
        }

        let failed = snapshot.values().filter(|e| e.is_failed()).count();
        info!("Snapshot complete: {} commodities, {} failed", snapshot.len(), failed);

        snapshot
    }

    /// Newest-first price history, truncated to `limit` (clamped to 1..=60)
    pub async fn history(
        &self,
        key: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Option<Vec<HistoricalPoint>>, FeedError> {
        let Some(info) = self.lookup(key) else {
            return Ok(None);
        };
        let series = self.provider.fetch_series(info.function, interval).await?;

        let limit = limit.clamp(1, MAX_HISTORY_LIMIT);
        let points: Vec<HistoricalPoint> = series
            .prices()
            .take(limit)
            .map(|(date, price)| HistoricalPoint {
                date: date.to_string(),
                price,
            })
            .collect();

        Ok((!points.is_empty()).then_some(points))
    }

    /// Global commodity index, always monthly
    pub async fn index(&self) -> Result<Option<CommodityPrice>, FeedError> {
        let series = self.provider.fetch_series(INDEX_FUNCTION, Interval::Monthly).await?;
        Ok(latest_price(&series, Interval::Monthly))
    }

    /// Trend analytics over the daily series
    pub async fn analysis(&self, key: &str) -> Result<Option<CommodityAnalysis>, FeedError> {
        let Some(info) = self.lookup(key) else {
            return Ok(None);
        };
        let series = self.provider.fetch_series(info.function, Interval::Daily).await?;
        Ok(indicators::analyze(info, &series))
    }
}

fn latest_price(series: &RawSeries, interval: Interval) -> Option<CommodityPrice> {
    let (date, price) = series.prices().next()?;
    Some(CommodityPrice {
        name: series.name.clone(),
        price,
        unit: series.unit.clone(),
        date: date.to_string(),
        interval,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use crate::data::types::RawSeriesPoint;

    /// In-memory provider keyed by function identifier
    #[derive(Default)]
    pub struct FakeProvider {
        series: HashMap<String, Result<RawSeries, FeedError>>,
        pub calls: Mutex<Vec<(String, Interval)>>,
    }

    impl FakeProvider {
        pub fn with_prices(mut self, function: &str, prices: &[f64]) -> Self {
            let data = prices
                .iter()
                .enumerate()
                .map(|(i, p)| RawSeriesPoint {
                    date: format!("2024-01-{:02}", 31 - i.min(30)),
                    value: p.to_string(),
                })
                .collect();
            self.series.insert(
                function.to_string(),
                Ok(RawSeries {
                    name: format!("{} price", function),
                    interval: "daily".to_string(),
                    unit: "USD".to_string(),
                    data,
                }),
            );
            self
        }

        pub fn with_error(mut self, function: &str, error: FeedError) -> Self {
            self.series.insert(function.to_string(), Err(error));
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SeriesProvider for FakeProvider {
        async fn fetch_series(&self, function: &str, interval: Interval) -> Result<RawSeries, FeedError> {
            self.calls.lock().unwrap().push((function.to_string(), interval));
            self.series
                .get(function)
                .cloned()
                .unwrap_or_else(|| Ok(RawSeries::default()))
        }
    }
}
