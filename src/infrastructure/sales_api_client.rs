// HTTP client for the remote sales data service
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::application::sales_repository::{
    MatchedProduct, RepositoryError, SalesDataRepository, SeriesFetch, SeriesRequest,
};
use crate::domain::hierarchy::{Dimension, DimensionTree};
use crate::domain::series::{Granularity, PeriodSeries};
use crate::infrastructure::config::DataServiceSettings;

#[derive(Debug, Clone)]
pub struct HttpSalesRepository {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

/// Monthly series payload. A payload without a `sales` array carries
/// no data at all and maps to an empty series; the other columns may
/// be absent individually and degrade to defaults.
#[derive(Debug, Deserialize)]
struct MonthlySeriesPayload {
    #[serde(default)]
    months: Vec<serde_json::Value>,
    sales: Option<Vec<f64>>,
    #[serde(default)]
    profit: Vec<f64>,
    #[serde(default)]
    days_list: Vec<u32>,
    #[serde(default)]
    label: String,
    #[serde(default)]
    matched_products: Vec<MatchedProduct>,
}

#[derive(Debug, Deserialize)]
struct DailySeriesPayload {
    #[serde(default)]
    dates: Vec<String>,
    sales: Option<Vec<f64>>,
    #[serde(default)]
    profit: Vec<f64>,
    #[serde(default)]
    label: String,
    #[serde(default)]
    matched_products: Vec<MatchedProduct>,
}

/// The service emits month keys as strings but has historically sent
/// bare numbers too; normalize both to the string key.
fn key_string(value: &serde_json::Value) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}

fn decode_error(err: serde_json::Error) -> RepositoryError {
    RepositoryError::Decode(err.to_string())
}

fn parse_monthly(value: serde_json::Value) -> Result<SeriesFetch, RepositoryError> {
    let payload: MonthlySeriesPayload = serde_json::from_value(value).map_err(decode_error)?;
    // No sales array means no data for the selection, even when the
    // service still lists the month keys.
    let series = match &payload.sales {
        Some(sales) => {
            let keys = payload.months.iter().map(key_string).collect();
            PeriodSeries::from_columns(
                keys,
                sales,
                &payload.profit,
                &payload.days_list,
                Granularity::Monthly,
            )
        }
        None => PeriodSeries::default(),
    };
    Ok(SeriesFetch {
        series,
        label: payload.label,
        matched_products: payload.matched_products,
    })
}

fn parse_daily(value: serde_json::Value) -> Result<SeriesFetch, RepositoryError> {
    let payload: DailySeriesPayload = serde_json::from_value(value).map_err(decode_error)?;
    let series = match &payload.sales {
        Some(sales) => PeriodSeries::from_columns(
            payload.dates,
            sales,
            &payload.profit,
            &[],
            Granularity::Daily,
        ),
        None => PeriodSeries::default(),
    };
    Ok(SeriesFetch {
        series,
        label: payload.label,
        matched_products: payload.matched_products,
    })
}

/// Which dashboard endpoint serves a series request. Monthly series
/// have one endpoint per dimension; daily and keyword-search series
/// share theirs across dimensions.
fn series_path(
    dimension: Dimension,
    granularity: Granularity,
    keyword_search: bool,
) -> &'static str {
    match (granularity, keyword_search) {
        (Granularity::Monthly, false) => match dimension {
            Dimension::Channel => "/api/dashboard/channel-sales",
            Dimension::Product => "/api/dashboard/hierarchical-sales",
        },
        (Granularity::Daily, false) => "/api/dashboard/daily-hierarchical-sales",
        (Granularity::Monthly, true) => "/api/dashboard/product-search-sales",
        (Granularity::Daily, true) => "/api/dashboard/daily-product-search-sales",
    }
}

fn options_path(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Product => "/api/dashboard/options",
        Dimension::Channel => "/api/dashboard/channel-options",
    }
}

impl HttpSalesRepository {
    pub fn new(settings: &DataServiceSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    async fn get_json(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value, RepositoryError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, ?params, "querying data service");

        let mut request = self
            .client
            .get(&url)
            .query(params)
            .header("Accept", "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| RepositoryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RepositoryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| RepositoryError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SalesDataRepository for HttpSalesRepository {
    async fn fetch_series(&self, request: &SeriesRequest) -> Result<SeriesFetch, RepositoryError> {
        let path = series_path(
            request.dimension,
            request.granularity,
            request.keyword.is_some(),
        );

        let names = request.dimension.wire_params();
        let mut params = vec![
            ("filename", request.dataset.as_str()),
            (names[0], request.selection.level1().wire()),
            (names[1], request.selection.level2().wire()),
            (names[2], request.selection.level3().wire()),
        ];
        if let Some(keyword) = &request.keyword {
            params.push(("keyword", keyword));
        }

        let value = self.get_json(path, &params).await?;
        match request.granularity {
            Granularity::Monthly => parse_monthly(value),
            Granularity::Daily => parse_daily(value),
        }
    }

    async fn fetch_dimension_tree(
        &self,
        dataset: &str,
        dimension: Dimension,
    ) -> Result<DimensionTree, RepositoryError> {
        let value = self
            .get_json(options_path(dimension), &[("filename", dataset)])
            .await?;
        Ok(DimensionTree::from_json(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn monthly_payload_with_all_columns() {
        let fetch = parse_monthly(json!({
            "months": ["2401", "2402"],
            "sales": [1000.0, 1200.0],
            "profit": [100.0, 0.0],
            "days_list": [31, 29],
            "label": "온라인 > 네이버",
        }))
        .unwrap();

        assert_eq!(fetch.label, "온라인 > 네이버");
        assert_eq!(fetch.series.len(), 2);
        assert_eq!(fetch.series.periods()[0].profit, 100.0);
        assert_eq!(fetch.series.periods()[1].day_count, 29);
    }

    #[test]
    fn missing_profit_and_days_degrade_to_defaults() {
        let fetch = parse_monthly(json!({
            "months": ["2501"],
            "sales": [500.0],
            "label": "전체",
        }))
        .unwrap();

        let p = &fetch.series.periods()[0];
        assert_eq!(p.profit, 0.0);
        assert_eq!(p.day_count, 31);
    }

    #[test]
    fn missing_sales_yields_empty_series() {
        let fetch = parse_monthly(json!({ "label": "전체" })).unwrap();
        assert!(fetch.series.is_empty());
    }

    #[test]
    fn missing_sales_with_month_keys_still_yields_empty_series() {
        // Month keys without a sales array are not data; no zero-valued
        // periods may be fabricated from them.
        let fetch = parse_monthly(json!({
            "months": ["2401", "2402"],
            "days_list": [31, 29],
            "label": "전체",
        }))
        .unwrap();
        assert!(fetch.series.is_empty());

        let fetch = parse_daily(json!({
            "dates": ["2024-01-01", "2024-01-02"],
            "label": "전체",
        }))
        .unwrap();
        assert!(fetch.series.is_empty());
    }

    #[test]
    fn explicit_empty_sales_array_is_an_empty_series_too() {
        let fetch = parse_monthly(json!({
            "months": [],
            "sales": [],
            "label": "전체",
        }))
        .unwrap();
        assert!(fetch.series.is_empty());
    }

    #[test]
    fn numeric_month_keys_are_normalized_to_strings() {
        let fetch = parse_monthly(json!({
            "months": [2401, "2402"],
            "sales": [1.0, 2.0],
        }))
        .unwrap();
        assert_eq!(fetch.series.first_key(), Some("2401"));
    }

    #[test]
    fn daily_payload_defaults_to_one_day_per_period() {
        let fetch = parse_daily(json!({
            "dates": ["2024-01-01", "2024-01-02"],
            "sales": [10.0, 0.0],
            "profit": [1.0, 0.0],
            "label": "검색: 로션",
            "matched_products": [{"code": "P001", "name": "수분 로션"}],
        }))
        .unwrap();

        assert!(fetch.series.periods().iter().all(|p| p.day_count == 1));
        assert_eq!(fetch.matched_products.len(), 1);
        assert_eq!(fetch.matched_products[0].code, "P001");
    }

    #[test]
    fn endpoints_follow_dimension_granularity_and_keyword() {
        assert_eq!(
            series_path(Dimension::Channel, Granularity::Monthly, false),
            "/api/dashboard/channel-sales"
        );
        assert_eq!(
            series_path(Dimension::Product, Granularity::Monthly, false),
            "/api/dashboard/hierarchical-sales"
        );
        assert_eq!(
            series_path(Dimension::Channel, Granularity::Daily, false),
            "/api/dashboard/daily-hierarchical-sales"
        );
        assert_eq!(
            series_path(Dimension::Product, Granularity::Daily, true),
            "/api/dashboard/daily-product-search-sales"
        );
        assert_eq!(options_path(Dimension::Channel), "/api/dashboard/channel-options");
    }
}
