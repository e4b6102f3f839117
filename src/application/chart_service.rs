// Chart service - builds the derived view for one chart request
use std::sync::Arc;

use crate::application::sales_repository::{
    MatchedProduct, RepositoryError, SalesDataRepository, SeriesRequest,
};
use crate::domain::hierarchy::{Dimension, DimensionTree};
use crate::domain::metrics::{self, DerivedPoint, ViewMode};

/// What the presentation layer renders: the derived points for the
/// requested window plus the bounds of the full (unfiltered) series,
/// which the caller uses to populate its range pickers.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartView {
    pub label: String,
    pub mode: ViewMode,
    pub first_key: Option<String>,
    pub last_key: Option<String>,
    pub points: Vec<DerivedPoint>,
    pub matched_products: Vec<MatchedProduct>,
}

/// Stateless per-request counterpart to
/// [`crate::application::selection_controller::SelectionController`]:
/// both run the same [`metrics::derive_window`] pipeline, this one for
/// a single fetch, the controller across a held selection.
#[derive(Clone)]
pub struct ChartService {
    repository: Arc<dyn SalesDataRepository>,
}

impl ChartService {
    pub fn new(repository: Arc<dyn SalesDataRepository>) -> Self {
        Self { repository }
    }

    /// Fetch the raw series for the selection, slice it to the
    /// requested window and derive the view.
    pub async fn chart_view(
        &self,
        request: &SeriesRequest,
        mode: ViewMode,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<ChartView, RepositoryError> {
        let fetch = self.repository.fetch_series(request).await?;
        tracing::debug!(
            label = %fetch.label,
            periods = fetch.series.len(),
            "fetched series for selection"
        );

        let first_key = fetch.series.first_key().map(str::to_owned);
        let last_key = fetch.series.last_key().map(str::to_owned);
        let points = metrics::derive_window(&fetch.series, start, end, mode);

        Ok(ChartView {
            label: fetch.label,
            mode,
            first_key,
            last_key,
            points,
            matched_products: fetch.matched_products,
        })
    }

    pub async fn dimension_options(
        &self,
        dataset: &str,
        dimension: Dimension,
    ) -> Result<DimensionTree, RepositoryError> {
        self.repository.fetch_dimension_tree(dataset, dimension).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::sales_repository::SeriesFetch;
    use crate::domain::hierarchy::DimensionSelection;
    use crate::domain::series::{Granularity, Period, PeriodSeries};
    use async_trait::async_trait;

    struct FixedRepository {
        fetch: SeriesFetch,
    }

    #[async_trait]
    impl SalesDataRepository for FixedRepository {
        async fn fetch_series(
            &self,
            _request: &SeriesRequest,
        ) -> Result<SeriesFetch, RepositoryError> {
            Ok(self.fetch.clone())
        }

        async fn fetch_dimension_tree(
            &self,
            _dataset: &str,
            _dimension: Dimension,
        ) -> Result<DimensionTree, RepositoryError> {
            Ok(DimensionTree::default())
        }
    }

    fn request() -> SeriesRequest {
        SeriesRequest {
            dataset: "sales.xlsx".into(),
            dimension: Dimension::Channel,
            selection: DimensionSelection::default(),
            keyword: None,
            granularity: Granularity::Monthly,
        }
    }

    fn service() -> ChartService {
        let series = PeriodSeries::new(vec![
            Period::new("2401", 1000.0, 100.0, 31),
            Period::new("2402", 1200.0, 0.0, 29),
            Period::new("2403", 600.0, 60.0, 31),
        ]);
        ChartService::new(Arc::new(FixedRepository {
            fetch: SeriesFetch {
                series,
                label: "전체".into(),
                matched_products: Vec::new(),
            },
        }))
    }

    #[tokio::test]
    async fn bounds_come_from_the_unfiltered_series() {
        let view = service()
            .chart_view(&request(), ViewMode::Raw, Some("2402"), Some("2402"))
            .await
            .unwrap();
        assert_eq!(view.first_key.as_deref(), Some("2401"));
        assert_eq!(view.last_key.as_deref(), Some("2403"));
        assert_eq!(view.points.len(), 1);
        assert_eq!(view.points[0].primary, 1200.0);
    }

    #[tokio::test]
    async fn window_is_applied_before_derivation() {
        // Growth over the sliced window compares 2403 to 2402, not 2401.
        let view = service()
            .chart_view(&request(), ViewMode::Growth, Some("2402"), None)
            .await
            .unwrap();
        assert_eq!(view.points.len(), 1);
        assert_eq!(view.points[0].key, "2403");
        assert_eq!(view.points[0].primary, -50.0);
    }

    #[tokio::test]
    async fn label_passes_through_untouched() {
        let view = service()
            .chart_view(&request(), ViewMode::Raw, None, None)
            .await
            .unwrap();
        assert_eq!(view.label, "전체");
    }
}
