// HTTP request handlers
use crate::application::chart_service::ChartView;
use crate::application::sales_repository::{MatchedProduct, SeriesRequest};
use crate::domain::hierarchy::{Dimension, DimensionSelection};
use crate::domain::metrics::{DerivedPoint, ViewMode};
use crate::domain::series::Granularity;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct SeriesQuery {
    pub filename: String,
    pub dimension: Dimension,
    pub level1: Option<String>,
    pub level2: Option<String>,
    pub level3: Option<String>,
    #[serde(default)]
    pub mode: ViewMode,
    #[serde(default)]
    pub granularity: Granularity,
    pub start: Option<String>,
    pub end: Option<String>,
    pub keyword: Option<String>,
}

#[derive(Deserialize)]
pub struct OptionsQuery {
    pub filename: String,
    pub dimension: Dimension,
}

#[derive(Serialize)]
pub struct SeriesResponse {
    pub label: String,
    pub mode: ViewMode,
    pub first_key: Option<String>,
    pub last_key: Option<String>,
    pub points: Vec<DerivedPoint>,
    pub matched_products: Vec<MatchedProduct>,
}

impl From<ChartView> for SeriesResponse {
    fn from(view: ChartView) -> Self {
        Self {
            label: view.label,
            mode: view.mode,
            first_key: view.first_key,
            last_key: view.last_key,
            points: view.points,
            matched_products: view.matched_products,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Derived metric series for one dimension selection
pub async fn get_series(
    Query(query): Query<SeriesQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // Keyword searches treat a blank keyword as no search at all.
    let keyword = query.keyword.filter(|k| !k.trim().is_empty());
    let selection = DimensionSelection::from_wire(
        query.level1.as_deref(),
        query.level2.as_deref(),
        query.level3.as_deref(),
    );
    let request = SeriesRequest {
        dataset: query.filename,
        dimension: query.dimension,
        selection,
        keyword,
        granularity: query.granularity,
    };

    match state
        .chart_service
        .chart_view(
            &request,
            query.mode,
            query.start.as_deref(),
            query.end.as_deref(),
        )
        .await
    {
        Ok(view) => Json(SeriesResponse::from(view)).into_response(),
        Err(e) => {
            tracing::error!("series fetch failed: {e}");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Hierarchy option tree for one dimension of a dataset
pub async fn get_options(
    Query(query): Query<OptionsQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    match state
        .chart_service
        .dimension_options(&query.filename, query.dimension)
        .await
    {
        Ok(tree) => Json(tree.to_json()).into_response(),
        Err(e) => {
            tracing::error!("options fetch failed: {e}");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
