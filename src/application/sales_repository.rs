// Repository trait for the remote sales data service
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::hierarchy::{Dimension, DimensionSelection, DimensionTree};
use crate::domain::series::{Granularity, PeriodSeries};

/// A product matched by a free-text keyword search. Matching happens
/// entirely in the data service; this core only carries the list
/// through to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedProduct {
    pub code: String,
    pub name: String,
}

/// Everything one fetch returns: the aggregated series for the
/// selection, the display label the service built for it, and (for
/// keyword searches) the matched products.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesFetch {
    pub series: PeriodSeries,
    pub label: String,
    pub matched_products: Vec<MatchedProduct>,
}

/// Parameters identifying one raw-series fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRequest {
    pub dataset: String,
    pub dimension: Dimension,
    pub selection: DimensionSelection,
    pub keyword: Option<String>,
    pub granularity: Granularity,
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("data service request failed: {0}")]
    Transport(String),
    #[error("data service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode data service response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait SalesDataRepository: Send + Sync {
    /// Fetch the aggregated periodic series for one dimension
    /// selection, optionally narrowed by a search keyword.
    async fn fetch_series(&self, request: &SeriesRequest) -> Result<SeriesFetch, RepositoryError>;

    /// Fetch the option tree for one dimension of a dataset.
    async fn fetch_dimension_tree(
        &self,
        dataset: &str,
        dimension: Dimension,
    ) -> Result<DimensionTree, RepositoryError>;
}
