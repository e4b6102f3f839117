// Period series domain model
use chrono::NaiveDate;
use serde::Deserialize;

/// Time-axis resolution of a series. Monthly keys look like "2501"
/// (January 2025), daily keys are ISO dates ("2025-01-31"). Both sort
/// lexicographically in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Granularity {
    #[default]
    #[serde(rename = "month")]
    Monthly,
    #[serde(rename = "day")]
    Daily,
}

impl Granularity {
    /// Day count to assume when the data service omits `days_list`.
    /// Monthly periods fall back to the calendar length of the month
    /// (30 when the key does not parse), daily periods to 1.
    pub fn default_day_count(self, key: &str) -> u32 {
        match self {
            Granularity::Monthly => days_in_month(key).unwrap_or(30),
            Granularity::Daily => 1,
        }
    }
}

/// Calendar length of a "YYMM" month key.
fn days_in_month(key: &str) -> Option<u32> {
    if key.len() != 4 || !key.is_ascii() {
        return None;
    }
    let year: i32 = 2000 + key[..2].parse::<i32>().ok()?;
    let month: u32 = key[2..].parse().ok()?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(next.signed_duration_since(first).num_days() as u32)
}

/// One bucket of the time axis: aggregated sales, profit and the number
/// of days with recorded data inside the bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    pub key: String,
    pub sales: f64,
    pub profit: f64,
    pub day_count: u32,
}

impl Period {
    pub fn new(key: impl Into<String>, sales: f64, profit: f64, day_count: u32) -> Self {
        Self {
            key: key.into(),
            sales,
            profit,
            // A zero day count would poison daily averaging downstream.
            day_count: day_count.max(1),
        }
    }
}

/// Ordered sequence of periods, ascending by key, no duplicate keys.
/// Produced fresh on every fetch; transforms return new sequences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodSeries {
    periods: Vec<Period>,
}

impl PeriodSeries {
    pub fn new(mut periods: Vec<Period>) -> Self {
        periods.sort_by(|a, b| a.key.cmp(&b.key));
        periods.dedup_by(|cur, prev| cur.key == prev.key);
        for p in &mut periods {
            p.day_count = p.day_count.max(1);
        }
        Self { periods }
    }

    /// Build a series from the data service's parallel arrays. The key
    /// column is the spine: a missing sales or profit entry reads as 0,
    /// a missing or zero day-count entry falls back to the granularity
    /// default.
    pub fn from_columns(
        keys: Vec<String>,
        sales: &[f64],
        profit: &[f64],
        day_counts: &[u32],
        granularity: Granularity,
    ) -> Self {
        let periods = keys
            .into_iter()
            .enumerate()
            .map(|(i, key)| {
                let day_count = day_counts
                    .get(i)
                    .copied()
                    .filter(|&d| d > 0)
                    .unwrap_or_else(|| granularity.default_day_count(&key));
                Period {
                    sales: sales.get(i).copied().unwrap_or(0.0),
                    profit: profit.get(i).copied().unwrap_or(0.0),
                    day_count,
                    key,
                }
            })
            .collect();
        Self::new(periods)
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn first_key(&self) -> Option<&str> {
        self.periods.first().map(|p| p.key.as_str())
    }

    pub fn last_key(&self) -> Option<&str> {
        self.periods.last().map(|p| p.key.as_str())
    }

    /// Inclusive date-range slice. A `None` bound is unbounded on that
    /// side, so `slice(None, None)` passes the series through unchanged
    /// (the first-load bootstrap case). Never reorders and never
    /// produces a key not present in the input.
    pub fn slice(&self, start: Option<&str>, end: Option<&str>) -> PeriodSeries {
        let periods = self
            .periods
            .iter()
            .filter(|p| {
                start.is_none_or(|s| p.key.as_str() >= s)
                    && end.is_none_or(|e| p.key.as_str() <= e)
            })
            .cloned()
            .collect();
        // Filtering an ordered series keeps it ordered.
        PeriodSeries { periods }
    }
}
