use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    models::{Movie, MovieId, TrendingEntry},
    services::trending::{rank, TrendingStore},
};

struct Tally {
    title: String,
    poster_url: Option<String>,
    count: u64,
    last_query: String,
    last_sequence: u64,
    last_selected_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    tallies: HashMap<MovieId, Tally>,
    sequence: u64,
}

/// Process-local trending store, used when no Redis URL is configured
#[derive(Clone)]
pub struct InMemoryTrendingStore {
    image_base: String,
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryTrendingStore {
    pub fn new(image_base: impl Into<String>) -> Self {
        Self {
            image_base: image_base.into(),
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }
}

#[async_trait::async_trait]
impl TrendingStore for InMemoryTrendingStore {
    async fn record_selection(&self, query: &str, movie: &Movie) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.sequence += 1;
        let sequence = inner.sequence;
        let now = Utc::now();

        let tally = inner.tallies.entry(movie.id).or_insert_with(|| Tally {
            title: movie.title.clone(),
            poster_url: None,
            count: 0,
            last_query: String::new(),
            last_sequence: 0,
            last_selected_at: now,
        });
        tally.title = movie.title.clone();
        tally.poster_url = movie.poster_url(&self.image_base);
        tally.count += 1;
        tally.last_query = query.to_string();
        tally.last_sequence = sequence;
        tally.last_selected_at = now;

        tracing::debug!(
            movie_id = movie.id,
            count = tally.count,
            query = %query,
            "Recorded trending selection"
        );

        Ok(())
    }

    async fn top_trending(&self, limit: usize) -> AppResult<Vec<TrendingEntry>> {
        let inner = self.inner.read().await;

        let mut ranked: Vec<(&MovieId, &Tally)> = inner.tallies.iter().collect();
        rank(&mut ranked, |(_, t)| t.count, |(_, t)| t.last_sequence);

        Ok(ranked
            .into_iter()
            .take(limit)
            .map(|(id, tally)| TrendingEntry {
                movie_id: *id,
                title: tally.title.clone(),
                poster_url: tally.poster_url.clone(),
                selection_count: tally.count,
                last_query: tally.last_query.clone(),
                last_selected_at: tally.last_selected_at,
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
