//! Browsing session event loop
//!
//! Drives one [`QueryController`]: user commands, debounced query settlements and
//! catalog completions arrive as discrete events on a single task, so controller
//! state is only ever touched between network suspension points. Fetches run as
//! spawned tasks tagged with their generation; trending reads and writes are
//! advisory and never surface as session errors.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::{
    config::SessionSettings,
    error::{AppError, AppResult},
    models::{FilterSet, FilterUpdate, Genre, MoviePage, TrendingEntry},
    services::{
        catalog::CatalogClient,
        controller::{Effect, FetchRequest, QueryController, Snapshot},
        debounce::Debouncer,
        trending::TrendingStore,
    },
};

/// User actions accepted by a session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    SetQuery(String),
    SetFilter(FilterUpdate),
    GoToPage(u32),
    NextPage,
    PrevPage,
}

/// Results of spawned I/O, delivered back to the session loop
enum Completion {
    Catalog {
        generation: u64,
        outcome: AppResult<MoviePage>,
    },
    Genres(AppResult<Vec<Genre>>),
    Trending(AppResult<Vec<TrendingEntry>>),
}

/// Handle for driving a running session
///
/// Cloneable; the session ends once every handle has been dropped.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    snapshots: watch::Receiver<Snapshot>,
}

impl SessionHandle {
    fn send(&self, command: SessionCommand) -> AppResult<()> {
        self.commands
            .send(command)
            .map_err(|_| AppError::Internal("Session has ended".to_string()))
    }

    pub fn set_query(&self, text: impl Into<String>) -> AppResult<()> {
        self.send(SessionCommand::SetQuery(text.into()))
    }

    pub fn set_filter(&self, update: FilterUpdate) -> AppResult<()> {
        update.validate()?;
        self.send(SessionCommand::SetFilter(update))
    }

    pub fn go_to_page(&self, page: u32) -> AppResult<()> {
        self.send(SessionCommand::GoToPage(page))
    }

    pub fn next_page(&self) -> AppResult<()> {
        self.send(SessionCommand::NextPage)
    }

    pub fn prev_page(&self) -> AppResult<()> {
        self.send(SessionCommand::PrevPage)
    }

    /// Latest published state
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified after every state change
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }
}

/// One browsing session: the controller plus the I/O it drives
///
/// The session loop is the only owner of controller state. Catalog and trending
/// calls run in spawned tasks and report back through a channel, so every state
/// mutation happens synchronously inside the loop.
pub struct Session {
    controller: QueryController,
    catalog: Arc<dyn CatalogClient>,
    trending: Arc<dyn TrendingStore>,
    trending_limit: usize,
    completions: mpsc::UnboundedSender<Completion>,
    snapshots: watch::Sender<Snapshot>,
}

impl Session {
    /// Starts a session on the current runtime and returns its handle
    pub fn spawn(
        settings: SessionSettings,
        catalog: Arc<dyn CatalogClient>,
        trending: Arc<dyn TrendingStore>,
    ) -> SessionHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        let filters = FilterSet {
            include_adult: settings.include_adult,
            ..Default::default()
        };
        let controller = QueryController::new(filters, settings.page_window_size);
        let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());

        let session = Session {
            controller,
            catalog,
            trending,
            trending_limit: settings.trending_limit,
            completions: completion_tx,
            snapshots: snapshot_tx,
        };
        let debouncer = Debouncer::new(settings.debounce);

        tokio::spawn(session.run(command_rx, completion_rx, debouncer));

        SessionHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
        mut debouncer: Debouncer<String>,
    ) {
        tracing::info!(catalog = self.catalog.name(), "Session started");
        self.mount();
        self.publish();

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command, &mut debouncer),
                    None => break,
                },
                Some(completion) = completions.recv() => self.handle_completion(completion),
                query = debouncer.settled(), if debouncer.is_pending() => {
                    if let Some(fetch) = self.controller.apply_debounced_query(&query) {
                        self.dispatch(fetch);
                    }
                }
            }
            self.publish();
        }

        tracing::info!("Session ended");
    }

    /// Initial browse page, genre list and trending snapshot
    fn mount(&mut self) {
        let fetch = self.controller.start();
        self.dispatch(fetch);

        let catalog = Arc::clone(&self.catalog);
        let tx = self.completions.clone();
        tokio::spawn(async move {
            let _ = tx.send(Completion::Genres(catalog.genres().await));
        });

        let trending = Arc::clone(&self.trending);
        let tx = self.completions.clone();
        let limit = self.trending_limit;
        tokio::spawn(async move {
            let _ = tx.send(Completion::Trending(trending.top_trending(limit).await));
        });
    }

    fn handle_command(&mut self, command: SessionCommand, debouncer: &mut Debouncer<String>) {
        tracing::debug!(command = ?command, "Session command");

        let fetch = match command {
            SessionCommand::SetQuery(text) => {
                self.controller.set_raw_query(&text);
                debouncer.push(text);
                None
            }
            SessionCommand::SetFilter(update) => self.controller.set_filter(update),
            SessionCommand::GoToPage(page) => self.controller.go_to_page(page),
            SessionCommand::NextPage => self.controller.next_page(),
            SessionCommand::PrevPage => self.controller.prev_page(),
        };

        if let Some(fetch) = fetch {
            self.dispatch(fetch);
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Catalog {
                generation,
                outcome,
            } => {
                for effect in self.controller.apply_response(generation, outcome) {
                    match effect {
                        Effect::Fetch(fetch) => self.dispatch(fetch),
                        Effect::RecordSelection { query, movie } => {
                            let trending = Arc::clone(&self.trending);
                            tokio::spawn(async move {
                                if let Err(e) = trending.record_selection(&query, &movie).await {
                                    tracing::warn!(
                                        error = %e,
                                        store = trending.name(),
                                        movie_id = movie.id,
                                        "Failed to record trending selection"
                                    );
                                }
                            });
                        }
                    }
                }
            }
            Completion::Genres(Ok(genres)) => self.controller.set_genres(genres),
            Completion::Genres(Err(e)) => {
                tracing::warn!(error = %e, "Failed to fetch genre list");
            }
            Completion::Trending(Ok(entries)) => self.controller.set_trending(entries),
            Completion::Trending(Err(e)) => {
                tracing::warn!(error = %e, "Failed to load trending movies");
            }
        }
    }

    /// Issues a catalog fetch; its completion comes back tagged with the generation
    fn dispatch(&self, fetch: FetchRequest) {
        let catalog = Arc::clone(&self.catalog);
        let tx = self.completions.clone();

        tracing::debug!(
            generation = fetch.generation,
            endpoint = ?fetch.request.endpoint(),
            page = fetch.request.page(),
            "Fetching movies"
        );

        tokio::spawn(async move {
            let outcome = fetch.request.send(catalog.as_ref()).await;
            let _ = tx.send(Completion::Catalog {
                generation: fetch.generation,
                outcome,
            });
        });
    }

    fn publish(&self) {
        let next = self.controller.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
