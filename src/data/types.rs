use serde::{Deserialize, Serialize};
use std::fmt;

/// Sampling granularity of a provider series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Daily,
    Weekly,
    Monthly,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "daily",
            Interval::Weekly => "weekly",
            Interval::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSeriesPoint {
    pub date: String,
    pub value: String,
}

/// Provider response envelope. Rate-limit notices come back as 200 with no
/// `data`, which decodes as an empty series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSeries {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub interval: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub data: Vec<RawSeriesPoint>,
}

impl RawSeries {
    /// Points whose value parses as a finite float, newest-first.
    /// The provider uses "." for days without a quote.
    pub fn prices(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.data.iter().filter_map(|point| {
            point
                .value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| (point.date.as_str(), v))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommodityPrice {
    pub name: String,
    pub price: f64,
    pub unit: String,
    pub date: String,
    pub interval: Interval,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub date: String,
    pub price: f64,
}

/// One element of the bulk snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SnapshotEntry {
    Price(CommodityPrice),
    Failed { error: String },
}

impl SnapshotEntry {
    pub fn is_failed(&self) -> bool {
        matches!(self, SnapshotEntry::Failed { .. })
    }
}
