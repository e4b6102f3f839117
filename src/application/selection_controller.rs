// Selection controller - per-chart selection/range state with
// last-write-wins fetch reconciliation
use crate::application::sales_repository::{
    MatchedProduct, RepositoryError, SalesDataRepository, SeriesFetch, SeriesRequest,
};
use crate::domain::hierarchy::{
    Dimension, DimensionSelection, DimensionTree, LevelValue, SelectionError,
};
use crate::domain::metrics::{self, DerivedPoint, ViewMode};
use crate::domain::series::{Granularity, PeriodSeries};

/// Snapshot of the fetch parameters at the moment a fetch was issued,
/// tagged with the generation it belongs to. A response completed
/// against a ticket whose generation has moved on is discarded.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    generation: u64,
    pub request: SeriesRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// The selection changed while the fetch was in flight; the
    /// response was dropped without touching state.
    Stale,
}

/// Owns one chart's dimension selection, date-range bounds and the
/// most recently fetched series. Every accepted change to the
/// selection, keyword or range invalidates the held series and
/// requires a new fetch before views can be derived again.
///
/// Stateful counterpart to
/// [`crate::application::chart_service::ChartService`]; views on the
/// held series go through the same [`metrics::derive_window`] pipeline.
pub struct SelectionController {
    dataset: String,
    dimension: Dimension,
    granularity: Granularity,
    tree: DimensionTree,
    selection: DimensionSelection,
    keyword: Option<String>,
    start: Option<String>,
    end: Option<String>,
    series: Option<PeriodSeries>,
    label: String,
    matched_products: Vec<MatchedProduct>,
    generation: u64,
}

impl SelectionController {
    pub fn new(
        dataset: impl Into<String>,
        dimension: Dimension,
        granularity: Granularity,
        tree: DimensionTree,
    ) -> Self {
        Self {
            dataset: dataset.into(),
            dimension,
            granularity,
            tree,
            selection: DimensionSelection::default(),
            keyword: None,
            start: None,
            end: None,
            series: None,
            label: String::new(),
            matched_products: Vec::new(),
            generation: 0,
        }
    }

    pub fn selection(&self) -> &DimensionSelection {
        &self.selection
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn matched_products(&self) -> &[MatchedProduct] {
        &self.matched_products
    }

    /// Resolved range bounds, once the first load has bootstrapped them.
    pub fn bounds(&self) -> (Option<&str>, Option<&str>) {
        (self.start.as_deref(), self.end.as_deref())
    }

    pub fn level1_options(&self) -> Vec<&str> {
        self.tree.level1_options()
    }

    /// Level2 options under the current level1 selection; empty while
    /// level1 is a wildcard.
    pub fn level2_options(&self) -> Vec<&str> {
        match self.selection.level1().as_value() {
            Some(l1) => self.tree.level2_options(l1),
            None => Vec::new(),
        }
    }

    pub fn level3_options(&self) -> &[String] {
        match (
            self.selection.level1().as_value(),
            self.selection.level2().as_value(),
        ) {
            (Some(l1), Some(l2)) => self.tree.level3_options(l1, l2),
            _ => &[],
        }
    }

    pub fn set_level1(&mut self, value: LevelValue) {
        self.selection.set_level1(value);
        self.invalidate();
    }

    pub fn set_level2(&mut self, value: LevelValue) -> Result<(), SelectionError> {
        self.selection.set_level2(&self.tree, value)?;
        self.invalidate();
        Ok(())
    }

    pub fn set_level3(&mut self, value: LevelValue) -> Result<(), SelectionError> {
        self.selection.set_level3(&self.tree, value)?;
        self.invalidate();
        Ok(())
    }

    pub fn set_keyword(&mut self, keyword: Option<String>) {
        if self.keyword != keyword {
            self.keyword = keyword;
            self.invalidate();
        }
    }

    pub fn set_range(&mut self, start: Option<String>, end: Option<String>) {
        if self.start != start || self.end != end {
            self.start = start;
            self.end = end;
            self.invalidate();
        }
    }

    /// Drop the held series and retire any outstanding fetch tickets.
    fn invalidate(&mut self) {
        self.generation += 1;
        self.series = None;
    }

    /// Issue a fetch for the current state. The caller performs the
    /// actual (async) repository call and hands the result back to
    /// [`complete_fetch`], which applies it only if no newer change
    /// happened in between.
    pub fn begin_fetch(&self) -> FetchTicket {
        FetchTicket {
            generation: self.generation,
            request: SeriesRequest {
                dataset: self.dataset.clone(),
                dimension: self.dimension,
                selection: self.selection.clone(),
                keyword: self.keyword.clone(),
                granularity: self.granularity,
            },
        }
    }

    /// Reconcile a completed fetch. Stale responses are discarded;
    /// fetch errors are surfaced without touching the previously held
    /// series, so the last good view stays renderable.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<SeriesFetch, RepositoryError>,
    ) -> Result<FetchOutcome, RepositoryError> {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale fetch response"
            );
            return Ok(FetchOutcome::Stale);
        }
        let fetch = result?;

        // One-time bootstrap: default the window to the full series on
        // the first successful load.
        if self.start.is_none() && self.end.is_none() {
            self.start = fetch.series.first_key().map(str::to_owned);
            self.end = fetch.series.last_key().map(str::to_owned);
        }
        self.series = Some(fetch.series);
        self.label = fetch.label;
        self.matched_products = fetch.matched_products;
        Ok(FetchOutcome::Applied)
    }

    /// Convenience wrapper running the whole fetch cycle inline.
    pub async fn refresh(
        &mut self,
        repository: &dyn SalesDataRepository,
    ) -> Result<FetchOutcome, RepositoryError> {
        let ticket = self.begin_fetch();
        let result = repository.fetch_series(&ticket.request).await;
        self.complete_fetch(ticket, result)
    }

    /// Derive the current view: range-filter the held series, then run
    /// the engine. Empty while no series is held (never fetched, or
    /// invalidated by a pending change).
    pub fn view(&self, mode: ViewMode) -> Vec<DerivedPoint> {
        match &self.series {
            Some(series) => {
                metrics::derive_window(series, self.start.as_deref(), self.end.as_deref(), mode)
            }
            None => Vec::new(),
        }
    }
}
