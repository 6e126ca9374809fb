/// Movie catalog abstraction
///
/// The controller only sees this trait; the concrete catalog (TMDB) and its
/// authentication live behind it so tests can substitute scripted catalogs.
use crate::{
    error::AppResult,
    models::{FilterSet, Genre, MovieDetails, MovieId, MoviePage},
};

pub mod tmdb;

pub use tmdb::TmdbCatalog;

/// Trait for paginated movie catalogs
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// Unfiltered listing ordered by popularity, narrowed by the facet filters
    async fn discover(&self, page: u32, filters: &FilterSet) -> AppResult<MoviePage>;

    /// Free-text search narrowed by the facet filters
    async fn search(&self, query: &str, page: u32, filters: &FilterSet) -> AppResult<MoviePage>;

    /// Full genre list
    async fn genres(&self) -> AppResult<Vec<Genre>>;

    /// Details card for one movie; `NotFound` when the catalog has no such id
    async fn movie_details(&self, id: MovieId) -> AppResult<MovieDetails>;

    /// Catalog name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Which listing a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Discover,
    Search,
}

/// A fully specified catalog request built from a controller state snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogRequest {
    Discover { page: u32, filters: FilterSet },
    Search {
        query: String,
        page: u32,
        filters: FilterSet,
    },
}

impl CatalogRequest {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            CatalogRequest::Discover { .. } => Endpoint::Discover,
            CatalogRequest::Search { .. } => Endpoint::Search,
        }
    }

    pub fn page(&self) -> u32 {
        match self {
            CatalogRequest::Discover { page, .. } | CatalogRequest::Search { page, .. } => *page,
        }
    }

    pub fn filters(&self) -> &FilterSet {
        match self {
            CatalogRequest::Discover { filters, .. } | CatalogRequest::Search { filters, .. } => {
                filters
            }
        }
    }

    /// Search text, if this is a search request
    pub fn query(&self) -> Option<&str> {
        match self {
            CatalogRequest::Search { query, .. } => Some(query),
            CatalogRequest::Discover { .. } => None,
        }
    }

    /// Issues this request against `catalog`
    pub async fn send(&self, catalog: &dyn CatalogClient) -> AppResult<MoviePage> {
        match self {
            CatalogRequest::Discover { page, filters } => catalog.discover(*page, filters).await,
            CatalogRequest::Search {
                query,
                page,
                filters,
            } => catalog.search(query, *page, filters).await,
        }
    }
}
