use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{FilterUpdate, MovieDetails, MovieId, TrendingEntry},
    services::controller::Snapshot,
};

use super::AppState;

const MAX_TRENDING_LIMIT: usize = 100;

// Request/Response types

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionCreatedResponse {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SetQueryRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct TrendingParams {
    pub limit: Option<usize>,
}

// Handlers

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "catalog": state.catalog.name(),
        "trending_store": state.trending.name(),
    }))
}

pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionCreatedResponse>) {
    let (id, _) = state.open_session().await;
    (StatusCode::CREATED, Json(SessionCreatedResponse { id }))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Snapshot>> {
    let session = state.session(id).await?;
    Ok(Json(session.snapshot()))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.close_session(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_query(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetQueryRequest>,
) -> AppResult<StatusCode> {
    state.session(id).await?.set_query(payload.text)?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn set_filter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<FilterUpdate>,
) -> AppResult<StatusCode> {
    state.session(id).await?.set_filter(update)?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn next_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.session(id).await?.next_page()?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn prev_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.session(id).await?.prev_page()?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn go_to_page(
    State(state): State<AppState>,
    Path((id, page)): Path<(Uuid, u32)>,
) -> AppResult<StatusCode> {
    state.session(id).await?.go_to_page(page)?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn get_movie_details(
    State(state): State<AppState>,
    Path(id): Path<MovieId>,
) -> AppResult<Json<MovieDetails>> {
    let details = state.catalog.movie_details(id).await?;
    Ok(Json(details))
}

pub async fn get_trending(
    State(state): State<AppState>,
    Query(params): Query<TrendingParams>,
) -> AppResult<Json<Vec<TrendingEntry>>> {
    let limit = params
        .limit
        .unwrap_or(state.settings.trending_limit)
        .min(MAX_TRENDING_LIMIT);
    let entries = state.trending.top_trending(limit).await?;
    Ok(Json(entries))
}
