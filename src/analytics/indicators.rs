use crate::analytics::types::{
    CommodityAnalysis, CurrentPrice, MaSignal, MovingAverages, PriceChanges, SignalSummary,
    Trend, Volatility, VolatilityLevel,
};
use crate::data::catalog::CommodityInfo;
use crate::data::types::RawSeries;

/// Points considered by the analysis, newest first
pub const ANALYSIS_WINDOW: usize = 90;

/// Price points needed before volatility is reported
const MIN_VOLATILITY_POINTS: usize = 7;

/// Returns are taken over the newest 30 prices (29 returns)
const VOLATILITY_WINDOW: usize = 30;

const SIGNAL_BAND_PCT: f64 = 1.0;
const TREND_CHANGE7_PCT: f64 = 2.0;

/// Round to cents; ties go away from zero (-0.125 -> -0.13)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounded value, or `None` when a zero price made it NaN or infinite
fn finite2(value: f64) -> Option<f64> {
    Some(round2(value)).filter(|v| v.is_finite())
}

/// Percentage change from `k` points back to the newest price.
/// `prices` is newest-first; defined only when more than `k` points exist.
pub fn percent_change(prices: &[f64], k: usize) -> Option<f64> {
    if prices.len() <= k {
        return None;
    }
    let base = prices[k];
    finite2((prices[0] - base) / base * 100.0)
}

/// Mean of the newest `period` prices
pub fn moving_average(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }
    let sum: f64 = prices[..period].iter().sum();
    finite2(sum / period as f64)
}

/// Population standard deviation of day-over-day returns, in percent
pub fn volatility(prices: &[f64]) -> Option<f64> {
    if prices.len() < MIN_VOLATILITY_POINTS {
        return None;
    }

    let window = prices.len().min(VOLATILITY_WINDOW);
    let returns: Vec<f64> = (1..window)
        .map(|i| (prices[i - 1] - prices[i]) / prices[i])
        .collect();

    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns
        .iter()
        .map(|r| (r - mean).powi(2))
        .sum::<f64>()
        / returns.len() as f64;

    finite2(variance.sqrt() * 100.0)
}

pub fn volatility_level(volatility: Option<f64>) -> VolatilityLevel {
    match volatility {
        None => VolatilityLevel::Unknown,
        Some(v) if v < 1.0 => VolatilityLevel::Low,
        Some(v) if v < 3.0 => VolatilityLevel::Medium,
        Some(_) => VolatilityLevel::High,
    }
}

pub fn ma_signal(current: f64, moving_average: Option<f64>) -> MaSignal {
    let Some(ma) = moving_average.filter(|ma| *ma != 0.0) else {
        return MaSignal::Unknown;
    };

    let diff_pct = (current - ma) / ma * 100.0;
    if !diff_pct.is_finite() {
        MaSignal::Unknown
    } else if diff_pct > SIGNAL_BAND_PCT {
        MaSignal::Above
    } else if diff_pct < -SIGNAL_BAND_PCT {
        MaSignal::Below
    } else {
        MaSignal::At
    }
}

pub fn trend(change7: Option<f64>, change30: Option<f64>) -> Trend {
    match (change7, change30) {
        (Some(c7), Some(c30)) if c7 > TREND_CHANGE7_PCT && c30 > 0.0 => Trend::Bullish,
        (Some(c7), Some(c30)) if c7 < -TREND_CHANGE7_PCT && c30 < 0.0 => Trend::Bearish,
        (Some(_), Some(_)) => Trend::Neutral,
        _ => Trend::Unknown,
    }
}

/// Derive the analysis bundle from a daily series.
///
/// Only the newest 90 parseable points are used; shorter series degrade the
/// longer-horizon fields to `None`/`Unknown`. Returns `None` for an empty series.
pub fn analyze(info: &CommodityInfo, series: &RawSeries) -> Option<CommodityAnalysis> {
    let points: Vec<(&str, f64)> = series.prices().take(ANALYSIS_WINDOW).collect();
    let (latest_date, current) = *points.first()?;
    let prices: Vec<f64> = points.iter().map(|(_, price)| *price).collect();

    let changes = PriceChanges {
        day7: percent_change(&prices, 7),
        day30: percent_change(&prices, 30),
        day90: percent_change(&prices, ANALYSIS_WINDOW - 1),
    };
    let moving_averages = MovingAverages {
        ma7: moving_average(&prices, 7),
        ma30: moving_average(&prices, 30),
    };
    let daily = volatility(&prices);

    let name = if series.name.is_empty() {
        info.description.to_string()
    } else {
        series.name.clone()
    };

    Some(CommodityAnalysis {
        commodity: info.key.to_string(),
        name,
        category: info.category,
        current: CurrentPrice {
            price: current,
            unit: series.unit.clone(),
            date: latest_date.to_string(),
        },
        changes,
        moving_averages,
        volatility: Volatility {
            daily,
            level: volatility_level(daily),
        },
        signal: SignalSummary {
            vs7dma: ma_signal(current, moving_averages.ma7),
            vs30dma: ma_signal(current, moving_averages.ma30),
            trend: trend(changes.day7, changes.day30),
        },
    })
}
