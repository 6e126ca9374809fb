use serde::{Deserialize, Serialize};

use super::GenreId;
use crate::error::{AppError, AppResult};

const MIN_RELEASE_YEAR: i32 = 1874;
const MAX_RELEASE_YEAR: i32 = 2100;
const MAX_RATING: f32 = 10.0;

/// Facet filters applied to every catalog request
///
/// Unset facets are omitted from requests rather than sent as empty values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSet {
    pub genre_id: Option<GenreId>,
    pub release_year: Option<i32>,
    pub min_rating: Option<f32>,
    pub include_adult: bool,
}

/// A single-facet change requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum FilterUpdate {
    Genre(Option<GenreId>),
    ReleaseYear(Option<i32>),
    MinRating(Option<f32>),
    IncludeAdult(bool),
}

impl FilterUpdate {
    /// Rejects values outside the ranges the catalog accepts
    pub fn validate(&self) -> AppResult<()> {
        match *self {
            FilterUpdate::ReleaseYear(Some(year))
                if !(MIN_RELEASE_YEAR..=MAX_RELEASE_YEAR).contains(&year) =>
            {
                Err(AppError::InvalidInput(format!(
                    "Release year must be between {} and {}",
                    MIN_RELEASE_YEAR, MAX_RELEASE_YEAR
                )))
            }
            FilterUpdate::MinRating(Some(rating))
                if !rating.is_finite() || !(0.0..=MAX_RATING).contains(&rating) =>
            {
                Err(AppError::InvalidInput(format!(
                    "Minimum rating must be between 0 and {}",
                    MAX_RATING
                )))
            }
            _ => Ok(()),
        }
    }
}

impl FilterSet {
    /// Returns a copy with `update` applied
    pub fn with(&self, update: FilterUpdate) -> FilterSet {
        let mut next = self.clone();
        match update {
            FilterUpdate::Genre(genre_id) => next.genre_id = genre_id,
            FilterUpdate::ReleaseYear(year) => next.release_year = year,
            FilterUpdate::MinRating(rating) => next.min_rating = rating,
            FilterUpdate::IncludeAdult(include) => next.include_adult = include,
        }
        next
    }

    /// Request parameters for the set facets, in a stable order
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(4);
        if let Some(genre_id) = self.genre_id {
            params.push(("with_genres", genre_id.to_string()));
        }
        if let Some(year) = self.release_year {
            params.push(("primary_release_year", year.to_string()));
        }
        if let Some(rating) = self.min_rating {
            params.push(("vote_average.gte", rating.to_string()));
        }
        params.push(("include_adult", self.include_adult.to_string()));
        params
    }
}
