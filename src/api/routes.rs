use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Browsing sessions
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/:id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/sessions/:id/query", put(handlers::set_query))
        .route("/sessions/:id/filters", put(handlers::set_filter))
        // Pagination
        .route("/sessions/:id/pages/next", post(handlers::next_page))
        .route("/sessions/:id/pages/prev", post(handlers::prev_page))
        .route("/sessions/:id/pages/:page", post(handlers::go_to_page))
        // Catalog
        .route("/movies/:id", get(handlers::get_movie_details))
        // Trending
        .route("/trending", get(handlers::get_trending))
        .with_state(state)
}
