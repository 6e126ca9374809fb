use std::sync::Arc;

use axum::middleware::from_fn;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use movie_finder::{
    api::{create_router, AppState},
    config::Config,
    db::create_redis_client,
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{
        catalog::{CatalogClient, TmdbCatalog},
        trending::{InMemoryTrendingStore, RedisTrendingStore, TrendingStore},
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("movie_finder=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let catalog: Arc<dyn CatalogClient> = Arc::new(TmdbCatalog::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    ));

    let trending: Arc<dyn TrendingStore> = match &config.redis_url {
        Some(redis_url) => {
            let client = create_redis_client(redis_url)?;
            Arc::new(RedisTrendingStore::new(client, config.tmdb_image_url.clone()).await?)
        }
        None => {
            tracing::warn!("REDIS_URL not set, trending counts are kept in memory");
            Arc::new(InMemoryTrendingStore::new(config.tmdb_image_url.clone()))
        }
    };

    let state = AppState::new(catalog, trending, config.session_settings());
    let _sweeper = state.spawn_idle_sweeper();

    // Layers run bottom-up: the request id must exist before the trace span is made
    let app = create_router(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(from_fn(request_id_middleware))
        .layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
