/// Redis-backed trending store
///
/// Layout:
/// - `trending:movie:{id}`: hash with title, poster_url, last_query, last_sequence,
///   last_selected_at and count
/// - `trending:rank`: sorted set of movie ids scored by `count * SEQUENCE_SPAN + last_sequence`,
///   so score order is selection count first, then recency of the last selection
/// - `trending:seq`: global selection counter
///
/// A selection is recorded by one Lua script so the hash and its rank score never
/// disagree; reading the top `n` is a single ZREVRANGE plus one pipelined batch of
/// hash reads, independent of how many movies the store holds.
use std::collections::HashMap;
use std::fmt::Display;

use chrono::{DateTime, Utc};
use redis::{aio::ConnectionManager, AsyncCommands, Client, Script};

use crate::{
    error::AppResult,
    models::{Movie, MovieId, TrendingEntry},
    services::trending::TrendingStore,
};

/// Multiplier separating the count from the sequence in a rank score. Scores stay
/// exact in an f64 while counts are below 2^21 and sequences below 2^32.
const SEQUENCE_SPAN: u64 = 1 << 32;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrendingKey {
    Movie(MovieId),
    Rank,
    Sequence,
}

impl Display for TrendingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendingKey::Movie(id) => write!(f, "trending:movie:{}", id),
            TrendingKey::Rank => write!(f, "trending:rank"),
            TrendingKey::Sequence => write!(f, "trending:seq"),
        }
    }
}

/// Atomic selection record: bump the sequence, update the movie hash and
/// rewrite its rank score. Returns `{count, sequence}`.
fn record_selection_script() -> Script {
    Script::new(
        r#"
        local seq_key = KEYS[1]
        local movie_key = KEYS[2]
        local rank_key = KEYS[3]

        local seq = redis.call('INCR', seq_key)
        redis.call('HSET', movie_key,
            'title', ARGV[2],
            'poster_url', ARGV[3],
            'last_query', ARGV[4],
            'last_selected_at', ARGV[5],
            'last_sequence', seq)
        local count = redis.call('HINCRBY', movie_key, 'count', 1)

        local score = count * tonumber(ARGV[6]) + seq
        redis.call('ZADD', rank_key, string.format('%.0f', score), ARGV[1])
        return {count, seq}
        "#,
    )
}

/// Splits a rank score into (selection count, last selection sequence)
fn decode_score(score: f64) -> (u64, u64) {
    let score = score.max(0.0) as u64;
    (score / SEQUENCE_SPAN, score % SEQUENCE_SPAN)
}

/// Movie ids and selection counts of the ranked members, best first
///
/// Malformed members are skipped.
fn ranked_candidates(members: Vec<(String, f64)>) -> Vec<(MovieId, u64)> {
    members
        .into_iter()
        .filter_map(|(member, score)| match member.parse::<MovieId>() {
            Ok(movie_id) => Some((movie_id, decode_score(score).0)),
            Err(_) => {
                tracing::warn!(member = %member, "Skipping malformed trending member");
                None
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct RedisTrendingStore {
    conn: ConnectionManager,
    image_base: String,
    record_script: Script,
}

impl RedisTrendingStore {
    /// Connects to Redis through a reconnecting connection manager
    pub async fn new(client: Client, image_base: impl Into<String>) -> AppResult<Self> {
        let conn = ConnectionManager::new(client).await?;
        tracing::info!("Connected trending store to Redis");

        Ok(Self {
            conn,
            image_base: image_base.into(),
            record_script: record_selection_script(),
        })
    }
}

/// Builds an entry from a movie hash; hashes without a title are treated as absent
fn entry_from_hash(
    movie_id: MovieId,
    selection_count: u64,
    fields: &HashMap<String, String>,
) -> Option<TrendingEntry> {
    let title = fields.get("title")?.clone();
    let last_selected_at = fields
        .get("last_selected_at")
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default();

    Some(TrendingEntry {
        movie_id,
        title,
        poster_url: fields.get("poster_url").filter(|s| !s.is_empty()).cloned(),
        selection_count,
        last_query: fields.get("last_query").cloned().unwrap_or_default(),
        last_selected_at,
    })
}

#[async_trait::async_trait]
impl TrendingStore for RedisTrendingStore {
    async fn record_selection(&self, query: &str, movie: &Movie) -> AppResult<()> {
        let mut conn = self.conn.clone();

        let (count, sequence): (u64, u64) = self
            .record_script
            .key(TrendingKey::Sequence.to_string())
            .key(TrendingKey::Movie(movie.id).to_string())
            .key(TrendingKey::Rank.to_string())
            .arg(movie.id)
            .arg(&movie.title)
            .arg(movie.poster_url(&self.image_base).unwrap_or_default())
            .arg(query)
            .arg(Utc::now().to_rfc3339())
            .arg(SEQUENCE_SPAN)
            .invoke_async(&mut conn)
            .await?;

        tracing::debug!(
            movie_id = movie.id,
            count = count,
            sequence = sequence,
            query = %query,
            "Recorded trending selection"
        );

        Ok(())
    }

    async fn top_trending(&self, limit: usize) -> AppResult<Vec<TrendingEntry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut conn = self.conn.clone();
        let members: Vec<(String, f64)> = conn
            .zrevrange_withscores(TrendingKey::Rank.to_string(), 0, limit as isize - 1)
            .await?;
        let candidates = ranked_candidates(members);
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for (movie_id, _) in &candidates {
            pipe.hgetall(TrendingKey::Movie(*movie_id).to_string());
        }
        let hashes: Vec<HashMap<String, String>> = pipe.query_async(&mut conn).await?;

        Ok(candidates
            .into_iter()
            .zip(hashes)
            .filter_map(|((movie_id, count), fields)| entry_from_hash(movie_id, count, &fields))
            .collect())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
