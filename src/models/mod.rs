use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod filters;

pub use filters::{FilterSet, FilterUpdate};

/// Catalog identifier of a movie
pub type MovieId = u64;

/// Catalog identifier of a genre
pub type GenreId = u32;

/// A movie as projected from a catalog listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<GenreId>,
}

impl Movie {
    /// Full poster URL under the given image base, if the movie has a poster
    pub fn poster_url(&self, image_base: &str) -> Option<String> {
        self.poster_path
            .as_deref()
            .filter(|path| !path.is_empty())
            .map(|path| format!("{}{}", image_base.trim_end_matches('/'), path))
    }
}

/// One page of catalog results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MoviePage {
    pub results: Vec<Movie>,
    pub total_pages: u32,
}

/// Full record for a single movie, as shown on its details card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub id: MovieId,
    pub title: String,
    pub overview: Option<String>,
    pub tagline: Option<String>,
    pub release_date: Option<String>,
    /// Production status, e.g. "Released"
    pub status: Option<String>,
    /// Minutes
    pub runtime: Option<u32>,
    /// US dollars; 0 when unknown
    pub budget: u64,
    /// US dollars; 0 when unknown
    pub revenue: u64,
    pub homepage: Option<String>,
    pub original_language: Option<String>,
    pub genres: Vec<Genre>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
}

/// Catalog genre
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

/// Aggregated selection record for a movie that topped a search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendingEntry {
    pub movie_id: MovieId,
    pub title: String,
    pub poster_url: Option<String>,
    pub selection_count: u64,
    /// Search term that most recently surfaced the movie
    pub last_query: String,
    pub last_selected_at: DateTime<Utc>,
}
