use serde::Serialize;
use crate::data::catalog::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityLevel {
    Low,
    Medium,
    High,
    Unknown,
}

/// Current price relative to a moving average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MaSignal {
    Above,
    Below,
    At,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommodityAnalysis {
    pub commodity: String,
    pub name: String,
    pub category: Category,
    pub current: CurrentPrice,
    pub changes: PriceChanges,
    pub moving_averages: MovingAverages,
    pub volatility: Volatility,
    pub signal: SignalSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentPrice {
    pub price: f64,
    pub unit: String,
    pub date: String,
}

/// Percentage changes against 7, 30 and 89 points back
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceChanges {
    pub day7: Option<f64>,
    pub day30: Option<f64>,
    pub day90: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MovingAverages {
    pub ma7: Option<f64>,
    pub ma30: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Volatility {
    pub daily: Option<f64>,
    pub level: VolatilityLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalSummary {
    pub vs7dma: MaSignal,
    pub vs30dma: MaSignal,
    pub trend: Trend,
}
