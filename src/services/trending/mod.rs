/// Trending selection storage
///
/// Records which movie topped each completed search and serves a ranked list of
/// the most selected movies. Recording is advisory: callers never fail on it.
use crate::{
    error::AppResult,
    models::{Movie, TrendingEntry},
};

pub mod memory;
pub mod redis;

pub use self::memory::InMemoryTrendingStore;
pub use self::redis::RedisTrendingStore;

/// Trait for trending-count backends
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TrendingStore: Send + Sync {
    /// Counts one selection of `movie`, surfaced by `query`
    async fn record_selection(&self, query: &str, movie: &Movie) -> AppResult<()>;

    /// Up to `limit` entries, most selected first, ties broken by most recent selection
    async fn top_trending(&self, limit: usize) -> AppResult<Vec<TrendingEntry>>;

    /// Backend name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Orders entries by selection count, then by recency of the last selection
///
/// `sequence` yields the store's monotonic selection number for an entry.
pub(crate) fn rank<T>(
    entries: &mut [T],
    count: impl Fn(&T) -> u64,
    sequence: impl Fn(&T) -> u64,
) {
    entries.sort_by(|a, b| {
        count(b)
            .cmp(&count(a))
            .then_with(|| sequence(b).cmp(&sequence(a)))
    });
}
