use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::{
    sync::RwLock,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use uuid::Uuid;

use crate::{
    config::SessionSettings,
    error::{AppError, AppResult},
    services::{
        catalog::CatalogClient,
        session::{Session, SessionHandle},
        trending::TrendingStore,
    },
};

/// Shortest interval between idle-session sweeps
const MIN_SWEEP_PERIOD: Duration = Duration::from_secs(1);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<RwLock<AppStateInner>>,
    pub catalog: Arc<dyn CatalogClient>,
    pub trending: Arc<dyn TrendingStore>,
    pub settings: SessionSettings,
}

/// Live browsing sessions
pub struct AppStateInner {
    pub sessions: HashMap<Uuid, SessionEntry>,
}

/// A registered session and when a request last addressed it
pub struct SessionEntry {
    pub handle: SessionHandle,
    pub last_access: Instant,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        trending: Arc<dyn TrendingStore>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            inner: Arc::new(RwLock::new(AppStateInner {
                sessions: HashMap::new(),
            })),
            catalog,
            trending,
            settings,
        }
    }

    /// Starts a new browsing session and registers it
    pub async fn open_session(&self) -> (Uuid, SessionHandle) {
        let id = Uuid::new_v4();
        let handle = Session::spawn(
            self.settings,
            Arc::clone(&self.catalog),
            Arc::clone(&self.trending),
        );

        let entry = SessionEntry {
            handle: handle.clone(),
            last_access: Instant::now(),
        };
        self.inner.write().await.sessions.insert(id, entry);
        tracing::info!(session = %id, "Session opened");

        (id, handle)
    }

    /// Looks up a session and marks it as recently used
    pub async fn session(&self, id: Uuid) -> AppResult<SessionHandle> {
        let mut inner = self.inner.write().await;
        let entry = inner
            .sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))?;

        entry.last_access = Instant::now();
        Ok(entry.handle.clone())
    }

    /// Ends a session; its loop stops once outstanding handles are dropped
    pub async fn close_session(&self, id: Uuid) -> AppResult<()> {
        let removed = self.inner.write().await.sessions.remove(&id);
        if removed.is_none() {
            return Err(AppError::NotFound(format!("Session {} not found", id)));
        }

        tracing::info!(session = %id, "Session closed");
        Ok(())
    }

    pub async fn session_count(&self) -> usize {
        self.inner.read().await.sessions.len()
    }

    /// Closes every session idle for at least the configured TTL, returning how many
    pub async fn evict_idle(&self) -> usize {
        let ttl = self.settings.idle_ttl;
        let now = Instant::now();
        let mut inner = self.inner.write().await;

        let before = inner.sessions.len();
        inner.sessions.retain(|id, entry| {
            let idle = now.duration_since(entry.last_access);
            if idle < ttl {
                return true;
            }
            tracing::info!(session = %id, idle_secs = idle.as_secs(), "Session expired");
            false
        });

        before - inner.sessions.len()
    }

    /// Runs `evict_idle` periodically for the lifetime of the runtime
    pub fn spawn_idle_sweeper(&self) -> JoinHandle<()> {
        let state = self.clone();
        let period = (self.settings.idle_ttl / 2).max(MIN_SWEEP_PERIOD);

        tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let evicted = state.evict_idle().await;
                if evicted > 0 {
                    tracing::debug!(evicted = evicted, "Idle session sweep");
                }
            }
        })
    }
}
