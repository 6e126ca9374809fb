/// TMDB catalog
///
/// API Flow:
/// 1. Browse: /discover/movie sorted by popularity
/// 2. Search: /search/movie with the free-text query
/// 3. Genres: /genre/movie/list, read once per session
/// 4. Details: /movie/{id}, for a single movie's details card
///
/// Authentication uses the v4 read access token as a bearer token.
use crate::{
    error::{AppError, AppResult},
    models::{FilterSet, Genre, Movie, MovieDetails, MovieId, MoviePage},
    services::catalog::CatalogClient,
};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};

/// TMDB refuses page numbers above this
const MAX_PAGES: u32 = 500;
const DISCOVER_SORT: &str = "popularity.desc";

#[derive(Debug, Deserialize)]
struct TmdbPage {
    #[serde(default)]
    results: Option<Vec<Movie>>,
    #[serde(default)]
    total_pages: u32,
}

impl From<TmdbPage> for MoviePage {
    fn from(page: TmdbPage) -> Self {
        MoviePage {
            results: page.results.unwrap_or_default(),
            total_pages: page.total_pages.min(MAX_PAGES),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TmdbGenreList {
    genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieDetails {
    id: MovieId,
    title: String,
    overview: Option<String>,
    tagline: Option<String>,
    release_date: Option<String>,
    status: Option<String>,
    runtime: Option<u32>,
    #[serde(default)]
    budget: u64,
    #[serde(default)]
    revenue: u64,
    homepage: Option<String>,
    original_language: Option<String>,
    #[serde(default)]
    genres: Vec<Genre>,
    poster_path: Option<String>,
    vote_average: Option<f64>,
}

/// TMDB sends "" rather than null for several unset text fields
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl From<TmdbMovieDetails> for MovieDetails {
    fn from(details: TmdbMovieDetails) -> Self {
        MovieDetails {
            id: details.id,
            title: details.title,
            overview: non_empty(details.overview),
            tagline: non_empty(details.tagline),
            release_date: non_empty(details.release_date),
            status: non_empty(details.status),
            runtime: details.runtime.filter(|minutes| *minutes > 0),
            budget: details.budget,
            revenue: details.revenue,
            homepage: non_empty(details.homepage),
            original_language: non_empty(details.original_language),
            genres: details.genres,
            poster_path: non_empty(details.poster_path),
            vote_average: details.vote_average,
        }
    }
}

#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbCatalog {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    fn discover_params(page: u32, filters: &FilterSet) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("sort_by", DISCOVER_SORT.to_string()),
            ("page", page.to_string()),
        ];
        params.extend(filters.query_params());
        params
    }

    fn search_params(query: &str, page: u32, filters: &FilterSet) -> Vec<(&'static str, String)> {
        let mut params = vec![("query", query.to_string()), ("page", page.to_string())];
        params.extend(filters.query_params());
        params
    }

    async fn send(&self, path: &str, params: &[(&'static str, String)]) -> AppResult<Response> {
        let url = format!("{}{}", self.api_url, path);

        self.http_client
            .get(&url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::FetchFailed(e.to_string()))
    }

    /// Issues a GET and decodes the payload
    ///
    /// Non-success statuses become `FetchFailed`; bodies that do not decode
    /// become `InvalidResponse`.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> AppResult<T> {
        let response = self.send(path, params).await?;
        Self::read(response).await
    }

    async fn read<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::FetchFailed(format!(
                "catalog returned status {}: {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::FetchFailed(e.to_string()))?;

        decode(&body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> AppResult<T> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(error = %e, "Failed to deserialize TMDB response");
        AppError::InvalidResponse(format!("Failed to parse TMDB response: {}", e))
    })
}

#[async_trait::async_trait]
impl CatalogClient for TmdbCatalog {
    async fn discover(&self, page: u32, filters: &FilterSet) -> AppResult<MoviePage> {
        let params = Self::discover_params(page, filters);
        let page: TmdbPage = self.get("/discover/movie", &params).await?;
        let page = MoviePage::from(page);

        tracing::info!(
            results = page.results.len(),
            total_pages = page.total_pages,
            catalog = "tmdb",
            "Discover completed"
        );

        Ok(page)
    }

    async fn search(&self, query: &str, page: u32, filters: &FilterSet) -> AppResult<MoviePage> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let params = Self::search_params(query, page, filters);
        let page: TmdbPage = self.get("/search/movie", &params).await?;
        let page = MoviePage::from(page);

        tracing::info!(
            query = %query,
            results = page.results.len(),
            total_pages = page.total_pages,
            catalog = "tmdb",
            "Search completed"
        );

        Ok(page)
    }

    async fn genres(&self) -> AppResult<Vec<Genre>> {
        let list: TmdbGenreList = self.get("/genre/movie/list", &[]).await?;
        tracing::info!(genres = list.genres.len(), catalog = "tmdb", "Genres fetched");
        Ok(list.genres)
    }

    async fn movie_details(&self, id: MovieId) -> AppResult<MovieDetails> {
        let response = self.send(&format!("/movie/{}", id), &[]).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("Movie {} not found", id)));
        }

        let details: TmdbMovieDetails = Self::read(response).await?;
        tracing::info!(movie_id = id, catalog = "tmdb", "Movie details fetched");
        Ok(details.into())
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
