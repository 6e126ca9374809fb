use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB read access token, sent as a bearer token
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Prefix joined with a movie's poster path to build poster URLs
    #[serde(default = "default_tmdb_image_url")]
    pub tmdb_image_url: String,

    /// Redis connection URL for trending counts. In-memory counts are used when unset.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Quiet period before a typed query is issued
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Number of page buttons in the pagination window
    #[serde(default = "default_page_window_size")]
    pub page_window_size: u32,

    /// Number of trending entries read when a session starts
    #[serde(default = "default_trending_limit")]
    pub trending_limit: usize,

    /// Initial value of the include-adult filter
    #[serde(default)]
    pub include_adult: bool,

    /// Seconds a session may go untouched before it is closed
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_page_window_size() -> u32 {
    5
}

fn default_trending_limit() -> usize {
    5
}

fn default_session_idle_secs() -> u64 {
    30 * 60
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.page_window_size == 0 {
            anyhow::bail!("PAGE_WINDOW_SIZE must be at least 1");
        }
        if self.trending_limit == 0 {
            anyhow::bail!("TRENDING_LIMIT must be at least 1");
        }
        if self.session_idle_secs == 0 {
            anyhow::bail!("SESSION_IDLE_SECS must be at least 1");
        }
        Ok(())
    }

    /// Per-session controller settings derived from this configuration
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            debounce: Duration::from_millis(self.debounce_ms),
            page_window_size: self.page_window_size,
            trending_limit: self.trending_limit,
            include_adult: self.include_adult,
            idle_ttl: Duration::from_secs(self.session_idle_secs),
        }
    }
}

/// Settings each browsing session is created with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub debounce: Duration,
    pub page_window_size: u32,
    pub trending_limit: usize,
    pub include_adult: bool,
    /// Sessions untouched for this long are closed by the registry sweeper
    pub idle_ttl: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(default_debounce_ms()),
            page_window_size: default_page_window_size(),
            trending_limit: default_trending_limit(),
            include_adult: false,
            idle_ttl: Duration::from_secs(default_session_idle_secs()),
        }
    }
}
