// Metric view derivation - the one implementation behind every chart toggle
use serde::{Deserialize, Serialize};

use crate::domain::series::{Period, PeriodSeries};

/// The views a user can toggle a chart between. Closed enumeration;
/// individual surfaces may expose a subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    #[default]
    Raw,
    Growth,
    DailyAverage,
    ProfitRate,
    CombinedRawProfitRate,
    CombinedDailyProfitRate,
}

impl ViewMode {
    /// Combined modes carry a secondary (profit-rate) axis.
    pub fn is_combined(self) -> bool {
        matches!(
            self,
            ViewMode::CombinedRawProfitRate | ViewMode::CombinedDailyProfitRate
        )
    }
}

/// Engine output for one period. `secondary` is populated only for
/// combined modes and holds the profit-rate companion value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedPoint {
    pub key: String,
    pub primary: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<f64>,
    pub day_count: u32,
}

/// Percentage ratio with the safe-division rule: a zero denominator
/// yields 0, never NaN or infinity.
fn pct_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator * 100.0
    }
}

fn profit_rate(p: &Period) -> f64 {
    pct_ratio(p.profit, p.sales)
}

fn daily_average(p: &Period) -> f64 {
    p.sales / f64::from(p.day_count.max(1))
}

fn point(p: &Period, primary: f64, secondary: Option<f64>) -> DerivedPoint {
    DerivedPoint {
        key: p.key.clone(),
        primary,
        secondary,
        day_count: p.day_count,
    }
}

/// Derive the values to plot for one view mode. Pure and deterministic;
/// preserves the chronological order of the input. Growth drops the
/// first period (it has no baseline), every other mode is one point per
/// input period.
pub fn derive(series: &PeriodSeries, mode: ViewMode) -> Vec<DerivedPoint> {
    let periods = series.periods();
    match mode {
        ViewMode::Raw => periods.iter().map(|p| point(p, p.sales, None)).collect(),
        ViewMode::Growth => periods
            .windows(2)
            .map(|w| {
                let (prev, cur) = (&w[0], &w[1]);
                point(cur, pct_ratio(cur.sales - prev.sales, prev.sales), None)
            })
            .collect(),
        ViewMode::DailyAverage => periods
            .iter()
            .map(|p| point(p, daily_average(p), None))
            .collect(),
        ViewMode::ProfitRate => periods
            .iter()
            .map(|p| point(p, profit_rate(p), None))
            .collect(),
        ViewMode::CombinedRawProfitRate => periods
            .iter()
            .map(|p| point(p, p.sales, Some(profit_rate(p))))
            .collect(),
        ViewMode::CombinedDailyProfitRate => periods
            .iter()
            .map(|p| point(p, daily_average(p), Some(profit_rate(p))))
            .collect(),
    }
}

/// The full view pipeline: slice the series to the inclusive window,
/// then derive. Filtering happens first, so in growth mode the baseline
/// is the first period inside the window, not the one just before it.
pub fn derive_window(
    series: &PeriodSeries,
    start: Option<&str>,
    end: Option<&str>,
    mode: ViewMode,
) -> Vec<DerivedPoint> {
    derive(&series.slice(start, end), mode)
}
