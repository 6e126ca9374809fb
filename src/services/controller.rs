//! Query/pagination controller
//!
//! A synchronous state machine: every user action and every catalog completion is
//! an explicit transition that mutates [`SearchState`] and returns the effects the
//! caller must perform (issue a fetch, record a trending selection). The controller
//! never awaits anything itself, which keeps all state mutation between the
//! suspension points owned by the session loop.

use serde::Serialize;

use crate::{
    error::AppResult,
    models::{FilterSet, FilterUpdate, Genre, Movie, MoviePage, TrendingEntry},
    services::{catalog::CatalogRequest, pager},
};

/// Message shown when a catalog fetch fails
pub const FETCH_ERROR_MESSAGE: &str = "Error fetching movies. Please try again later.";

/// Which listing the session is paging through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Browse,
    Search,
}

/// Lifecycle of the most recently issued fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    Idle,
    Loading,
    Success,
    Failed,
}

/// Position of one mode's pagination cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub page: u32,
    /// Page count reported by the last response for this mode
    pub total_pages: u32,
}

impl Default for PageCursor {
    fn default() -> Self {
        Self {
            page: 1,
            total_pages: 1,
        }
    }
}

/// User-visible query and pagination state
///
/// `mode`, the active page and the total page count are all derived from the
/// debounced query and the per-mode cursors, so they cannot disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub raw_query: String,
    pub debounced_query: String,
    pub filters: FilterSet,
    pub browse: PageCursor,
    pub search: PageCursor,
    pub page_window_size: u32,
}

impl SearchState {
    fn new(filters: FilterSet, page_window_size: u32) -> Self {
        Self {
            raw_query: String::new(),
            debounced_query: String::new(),
            filters,
            browse: PageCursor::default(),
            search: PageCursor::default(),
            page_window_size,
        }
    }

    pub fn mode(&self) -> Mode {
        if self.debounced_query.is_empty() {
            Mode::Browse
        } else {
            Mode::Search
        }
    }

    pub fn browse_page(&self) -> u32 {
        self.browse.page
    }

    pub fn search_page(&self) -> u32 {
        self.search.page
    }

    fn cursor(&self) -> &PageCursor {
        match self.mode() {
            Mode::Browse => &self.browse,
            Mode::Search => &self.search,
        }
    }

    fn cursor_mut(&mut self) -> &mut PageCursor {
        match self.mode() {
            Mode::Browse => &mut self.browse,
            Mode::Search => &mut self.search,
        }
    }

    pub fn active_page(&self) -> u32 {
        self.cursor().page
    }

    pub fn total_pages(&self) -> u32 {
        self.cursor().total_pages
    }

    /// Page numbers of the block containing the active page
    pub fn page_window(&self) -> Vec<u32> {
        pager::window(self.active_page(), self.total_pages(), self.page_window_size)
    }

    /// 0-indexed origin of the current page window
    pub fn page_window_start(&self) -> u32 {
        pager::block_start(self.active_page(), self.total_pages(), self.page_window_size) - 1
    }

    /// Request for the current mode, cursor and filters
    pub fn request(&self) -> CatalogRequest {
        match self.mode() {
            Mode::Browse => CatalogRequest::Discover {
                page: self.browse.page,
                filters: self.filters.clone(),
            },
            Mode::Search => CatalogRequest::Search {
                query: self.debounced_query.clone(),
                page: self.search.page,
                filters: self.filters.clone(),
            },
        }
    }
}

/// A fetch the caller must issue, tagged with its generation
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub generation: u64,
    pub request: CatalogRequest,
}

/// Side effects produced by applying a catalog response
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Fetch(FetchRequest),
    RecordSelection { query: String, movie: Movie },
}

/// Read-only view handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub mode: Mode,
    pub status: FetchStatus,
    pub loading: bool,
    pub raw_query: String,
    pub debounced_query: String,
    pub filters: FilterSet,
    pub active_page: u32,
    pub total_pages: u32,
    pub page_window: Vec<u32>,
    pub page_window_start: u32,
    pub results: Vec<Movie>,
    pub error_message: Option<String>,
    pub trending: Vec<TrendingEntry>,
    pub genres: Vec<Genre>,
    pub generation: u64,
    /// Incremented whenever `results` changes
    pub results_revision: u64,
}

/// The query/pagination state machine
#[derive(Debug)]
pub struct QueryController {
    state: SearchState,
    status: FetchStatus,
    generation: u64,
    in_flight: Option<CatalogRequest>,
    results: Vec<Movie>,
    results_revision: u64,
    error_message: Option<String>,
    last_search_query: Option<String>,
    genres: Option<Vec<Genre>>,
    trending: Vec<TrendingEntry>,
}

impl QueryController {
    pub fn new(filters: FilterSet, page_window_size: u32) -> Self {
        Self {
            state: SearchState::new(filters, page_window_size.max(1)),
            status: FetchStatus::Idle,
            generation: 0,
            in_flight: None,
            results: Vec::new(),
            results_revision: 0,
            error_message: None,
            last_search_query: None,
            genres: None,
            trending: Vec::new(),
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn results(&self) -> &[Movie] {
        &self.results
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn genres(&self) -> Option<&[Genre]> {
        self.genres.as_deref()
    }

    /// Initial browse fetch issued when the session mounts
    pub fn start(&mut self) -> FetchRequest {
        self.begin_fetch()
    }

    /// Records the undebounced input; nothing is fetched until it settles
    pub fn set_raw_query(&mut self, text: &str) {
        self.state.raw_query = text.to_string();
    }

    /// Applies a settled query, switching modes when it becomes empty or non-empty
    pub fn apply_debounced_query(&mut self, text: &str) -> Option<FetchRequest> {
        let query = text.trim();
        if query == self.state.debounced_query {
            return None;
        }

        self.state.debounced_query = query.to_string();
        if !query.is_empty() && self.last_search_query.as_deref() != Some(query) {
            // The previous query's page count says nothing about the new listing
            self.state.search = PageCursor::default();
            self.last_search_query = Some(query.to_string());
        }

        tracing::debug!(
            query = %query,
            mode = ?self.state.mode(),
            page = self.state.active_page(),
            "Query settled"
        );

        Some(self.begin_fetch())
    }

    /// Applies a facet change; both cursors restart at the first page
    pub fn set_filter(&mut self, update: FilterUpdate) -> Option<FetchRequest> {
        let filters = self.state.filters.with(update);
        if filters == self.state.filters {
            return None;
        }

        self.state.filters = filters;
        self.state.browse = PageCursor::default();
        self.state.search = PageCursor::default();

        Some(self.begin_fetch())
    }

    pub fn next_page(&mut self) -> Option<FetchRequest> {
        let current = self.state.active_page();
        if current >= self.state.total_pages() {
            return None;
        }
        self.move_to(current + 1)
    }

    pub fn prev_page(&mut self) -> Option<FetchRequest> {
        let current = self.state.active_page();
        if current <= 1 {
            return None;
        }
        self.move_to(current - 1)
    }

    /// Jumps to page `n`; out-of-range pages are ignored
    pub fn go_to_page(&mut self, page: u32) -> Option<FetchRequest> {
        if page < 1 || page > self.state.total_pages() {
            tracing::debug!(
                page = page,
                total_pages = self.state.total_pages(),
                "Ignoring out-of-range page"
            );
            return None;
        }
        if page == self.state.active_page() {
            return None;
        }
        self.move_to(page)
    }

    fn move_to(&mut self, page: u32) -> Option<FetchRequest> {
        self.state.cursor_mut().page = page;
        Some(self.begin_fetch())
    }

    /// Enters `Loading` for the current state under a fresh generation
    fn begin_fetch(&mut self) -> FetchRequest {
        self.generation += 1;
        self.status = FetchStatus::Loading;
        self.error_message = None;
        self.clear_results();

        let request = self.state.request();
        self.in_flight = Some(request.clone());

        FetchRequest {
            generation: self.generation,
            request,
        }
    }

    fn clear_results(&mut self) {
        if !self.results.is_empty() {
            self.results.clear();
            self.results_revision += 1;
        }
    }

    /// Applies a catalog completion
    ///
    /// Responses from superseded generations are dropped without touching state.
    pub fn apply_response(
        &mut self,
        generation: u64,
        outcome: AppResult<MoviePage>,
    ) -> Vec<Effect> {
        if generation != self.generation {
            tracing::debug!(
                generation = generation,
                current = self.generation,
                "Discarding stale catalog response"
            );
            return Vec::new();
        }
        let Some(request) = self.in_flight.take() else {
            return Vec::new();
        };

        match outcome {
            Ok(page) => self.apply_page(request, page),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    generation = generation,
                    endpoint = ?request.endpoint(),
                    "Error fetching movies"
                );
                self.status = FetchStatus::Failed;
                self.error_message = Some(FETCH_ERROR_MESSAGE.to_string());
                self.clear_results();
                Vec::new()
            }
        }
    }

    fn apply_page(&mut self, request: CatalogRequest, page: MoviePage) -> Vec<Effect> {
        let cursor = self.state.cursor_mut();
        cursor.total_pages = page.total_pages;

        // Fewer pages than the cursor (filters narrowed the listing): refetch the last page
        let last_page = page.total_pages.max(1);
        if cursor.page > last_page {
            cursor.page = last_page;
            tracing::debug!(page = last_page, "Clamping cursor to last page");
            return vec![Effect::Fetch(self.begin_fetch())];
        }

        self.status = FetchStatus::Success;
        self.error_message = None;
        self.results = page.results;
        self.results_revision += 1;

        let mut effects = Vec::new();
        if let (Some(query), Some(top)) = (request.query(), self.results.first()) {
            effects.push(Effect::RecordSelection {
                query: query.to_string(),
                movie: top.clone(),
            });
        }
        effects
    }

    /// Caches the genre list; later lists are ignored
    pub fn set_genres(&mut self, genres: Vec<Genre>) {
        if self.genres.is_none() {
            self.genres = Some(genres);
        }
    }

    pub fn set_trending(&mut self, trending: Vec<TrendingEntry>) {
        self.trending = trending;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            mode: self.state.mode(),
            status: self.status,
            loading: self.status == FetchStatus::Loading,
            raw_query: self.state.raw_query.clone(),
            debounced_query: self.state.debounced_query.clone(),
            filters: self.state.filters.clone(),
            active_page: self.state.active_page(),
            total_pages: self.state.total_pages(),
            page_window: self.state.page_window(),
            page_window_start: self.state.page_window_start(),
            results: self.results.clone(),
            error_message: self.error_message.clone(),
            trending: self.trending.clone(),
            genres: self.genres.clone().unwrap_or_default(),
            generation: self.generation,
            results_revision: self.results_revision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::catalog::Endpoint;

    fn movie(id: u64, title: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            poster_path: None,
            release_date: None,
            popularity: 1.0,
            vote_average: None,
            original_language: None,
            genre_ids: vec![],
        }
    }

    fn page(titles: &[&str], total_pages: u32) -> MoviePage {
        MoviePage {
            results: titles
                .iter()
                .enumerate()
                .map(|(i, t)| movie(i as u64 + 1, t))
                .collect(),
            total_pages,
        }
    }

    /// Controller that has completed its initial browse fetch
    fn mounted(total_pages: u32) -> QueryController {
        let mut controller = QueryController::new(FilterSet::default(), 5);
        let fetch = controller.start();
        controller.apply_response(fetch.generation, Ok(page(&["Popular"], total_pages)));
        controller
    }

    fn complete(controller: &mut QueryController, fetch: &FetchRequest, total: u32) {
        controller.apply_response(fetch.generation, Ok(page(&["Result"], total)));
    }

    #[test]
    fn test_initial_state() {
        let controller = QueryController::new(FilterSet::default(), 5);

        assert_eq!(controller.status(), FetchStatus::Idle);
        assert_eq!(controller.generation(), 0);
        assert_eq!(controller.state().mode(), Mode::Browse);
        assert_eq!(controller.state().active_page(), 1);
        assert!(controller.results().is_empty());
    }

    #[test]
    fn test_start_issues_browse_fetch() {
        let mut controller = QueryController::new(FilterSet::default(), 5);
        let fetch = controller.start();

        assert_eq!(fetch.generation, 1);
        assert_eq!(fetch.request.endpoint(), Endpoint::Discover);
        assert_eq!(fetch.request.page(), 1);
        assert_eq!(controller.status(), FetchStatus::Loading);
    }

    #[test]
    fn test_success_stores_results_and_total() {
        let controller = mounted(42);

        assert_eq!(controller.status(), FetchStatus::Success);
        assert_eq!(controller.results().len(), 1);
        assert_eq!(controller.state().total_pages(), 42);
        assert_eq!(controller.snapshot().page_window, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_browse_success_records_nothing() {
        let mut controller = QueryController::new(FilterSet::default(), 5);
        let fetch = controller.start();
        let effects = controller.apply_response(fetch.generation, Ok(page(&["Popular"], 3)));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_search_request_and_single_selection() {
        let mut controller = QueryController::new(FilterSet::default(), 5);
        controller.set_filter(FilterUpdate::Genre(Some(28)));

        let fetch = controller.apply_debounced_query("batman").unwrap();
        assert_eq!(
            fetch.request,
            CatalogRequest::Search {
                query: "batman".to_string(),
                page: 1,
                filters: FilterSet {
                    genre_id: Some(28),
                    ..Default::default()
                },
            }
        );

        let effects = controller.apply_response(
            fetch.generation,
            Ok(page(&["Batman Begins", "Batman Returns"], 4)),
        );
        assert_eq!(
            effects,
            vec![Effect::RecordSelection {
                query: "batman".to_string(),
                movie: movie(1, "Batman Begins"),
            }]
        );

        // A duplicate delivery of the same generation records nothing more
        let again =
            controller.apply_response(fetch.generation, Ok(page(&["Batman Begins"], 4)));
        assert!(again.is_empty());
    }

    #[test]
    fn test_empty_search_result_is_success_without_selection() {
        let mut controller = mounted(10);
        let fetch = controller.apply_debounced_query("zzzzqx").unwrap();

        let effects = controller.apply_response(
            fetch.generation,
            Ok(MoviePage {
                results: vec![],
                total_pages: 0,
            }),
        );

        assert!(effects.is_empty());
        assert_eq!(controller.status(), FetchStatus::Success);
        assert!(controller.results().is_empty());
        assert_eq!(controller.error_message(), None);
        assert!(controller.snapshot().page_window.is_empty());
        assert_eq!(controller.state().active_page(), 1);
    }

    #[test]
    fn test_mode_follows_debounced_query() {
        let mut controller = mounted(10);

        controller.set_raw_query("du");
        assert_eq!(controller.state().mode(), Mode::Browse);

        controller.apply_debounced_query("dune");
        assert_eq!(controller.state().mode(), Mode::Search);

        controller.apply_debounced_query("");
        assert_eq!(controller.state().mode(), Mode::Browse);
    }

    #[test]
    fn test_whitespace_query_is_browse() {
        let mut controller = mounted(10);
        assert!(controller.apply_debounced_query("   ").is_none());
        assert_eq!(controller.state().mode(), Mode::Browse);
    }

    #[test]
    fn test_unchanged_query_issues_no_fetch() {
        let mut controller = mounted(10);
        let fetch = controller.apply_debounced_query("dune").unwrap();
        complete(&mut controller, &fetch, 3);

        assert!(controller.apply_debounced_query("dune ").is_none());
        assert_eq!(controller.generation(), fetch.generation);
    }

    #[test]
    fn test_browse_page_restored_after_search_round_trip() {
        let mut controller = mounted(20);

        let fetch = controller.go_to_page(3).unwrap();
        complete(&mut controller, &fetch, 20);
        assert_eq!(controller.state().browse_page(), 3);

        let fetch = controller.apply_debounced_query("dune").unwrap();
        assert_eq!(fetch.request.page(), 1);
        complete(&mut controller, &fetch, 8);

        let fetch = controller.next_page().unwrap();
        complete(&mut controller, &fetch, 8);
        let fetch = controller.next_page().unwrap();
        complete(&mut controller, &fetch, 8);
        assert_eq!(controller.state().search_page(), 3);
        assert_eq!(controller.state().browse_page(), 3);

        let fetch = controller.apply_debounced_query("").unwrap();
        assert_eq!(fetch.request.endpoint(), Endpoint::Discover);
        assert_eq!(fetch.request.page(), 3);
        assert_eq!(controller.state().active_page(), 3);
        assert_eq!(controller.state().total_pages(), 20);
    }

    #[test]
    fn test_returning_to_same_query_keeps_search_page() {
        let mut controller = mounted(20);

        let fetch = controller.apply_debounced_query("dune").unwrap();
        complete(&mut controller, &fetch, 8);
        let fetch = controller.go_to_page(4).unwrap();
        complete(&mut controller, &fetch, 8);

        controller.apply_debounced_query("");
        let fetch = controller.apply_debounced_query("dune").unwrap();
        assert_eq!(fetch.request.page(), 4);
    }

    #[test]
    fn test_new_query_resets_search_page() {
        let mut controller = mounted(20);

        let fetch = controller.apply_debounced_query("dune").unwrap();
        complete(&mut controller, &fetch, 8);
        let fetch = controller.go_to_page(4).unwrap();
        complete(&mut controller, &fetch, 8);

        let fetch = controller.apply_debounced_query("alien").unwrap();
        assert_eq!(fetch.request.page(), 1);
        assert_eq!(controller.state().search_page(), 1);
    }

    #[test]
    fn test_new_query_forgets_previous_page_count() {
        let mut controller = mounted(20);

        let fetch = controller.apply_debounced_query("dune").unwrap();
        complete(&mut controller, &fetch, 8);
        let fetch = controller.go_to_page(7).unwrap();
        complete(&mut controller, &fetch, 8);

        controller.apply_debounced_query("alien").unwrap();

        // Until the new listing reports its size, only page 1 is reachable
        assert_eq!(controller.state().total_pages(), 1);
        assert_eq!(controller.state().page_window(), vec![1]);
        assert!(controller.go_to_page(5).is_none());
        assert!(controller.next_page().is_none());

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.total_pages, 1);
        assert_eq!(snapshot.page_window, vec![1]);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut controller = mounted(20);

        let r1 = controller.go_to_page(2).unwrap();
        let r2 = controller.go_to_page(3).unwrap();
        assert_eq!(r2.generation, r1.generation + 1);

        // R2 completes first, then the superseded R1
        controller.apply_response(r2.generation, Ok(page(&["Page three"], 30)));
        let effects = controller.apply_response(r1.generation, Ok(page(&["Page two"], 20)));

        assert!(effects.is_empty());
        assert_eq!(controller.results()[0].title, "Page three");
        assert_eq!(controller.state().total_pages(), 30);
        assert_eq!(controller.state().active_page(), 3);
    }

    #[test]
    fn test_stale_response_while_loading_keeps_loading() {
        let mut controller = mounted(20);
        let r1 = controller.next_page().unwrap();
        let _r2 = controller.next_page().unwrap();

        controller.apply_response(r1.generation, Err(AppError::FetchFailed("503".into())));

        assert_eq!(controller.status(), FetchStatus::Loading);
        assert_eq!(controller.error_message(), None);
    }

    #[test]
    fn test_stale_search_response_records_nothing() {
        let mut controller = mounted(20);
        let r1 = controller.apply_debounced_query("bat").unwrap();
        let r2 = controller.apply_debounced_query("batman").unwrap();

        let stale = controller.apply_response(r1.generation, Ok(page(&["Bat Thing"], 2)));
        assert!(stale.is_empty());

        let effects = controller.apply_response(r2.generation, Ok(page(&["Batman"], 2)));
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn test_go_to_page_beyond_total_is_noop() {
        let mut controller = mounted(2);
        let fetch = controller.go_to_page(2).unwrap();
        complete(&mut controller, &fetch, 2);
        let generation = controller.generation();
        let before = controller.state().clone();

        assert!(controller.go_to_page(3).is_none());
        assert!(controller.go_to_page(0).is_none());
        assert_eq!(controller.state(), &before);
        assert_eq!(controller.generation(), generation);
        assert_eq!(controller.status(), FetchStatus::Success);
    }

    #[test]
    fn test_navigation_bounds() {
        let mut controller = mounted(2);

        assert!(controller.prev_page().is_none());
        let fetch = controller.next_page().unwrap();
        complete(&mut controller, &fetch, 2);
        assert!(controller.next_page().is_none());

        let fetch = controller.prev_page().unwrap();
        assert_eq!(fetch.request.page(), 1);
    }

    #[test]
    fn test_go_to_current_page_is_noop() {
        let mut controller = mounted(5);
        assert!(controller.go_to_page(1).is_none());
    }

    #[test]
    fn test_failure_then_next_page_clears_error() {
        let mut controller = mounted(5);
        let fetch = controller.next_page().unwrap();
        controller.apply_response(
            fetch.generation,
            Err(AppError::InvalidResponse("bad payload".into())),
        );

        assert_eq!(controller.status(), FetchStatus::Failed);
        assert_eq!(controller.error_message(), Some(FETCH_ERROR_MESSAGE));
        assert!(controller.results().is_empty());

        let retry = controller.next_page().unwrap();
        assert_eq!(retry.request.page(), 3);
        assert_eq!(controller.status(), FetchStatus::Loading);
        assert_eq!(controller.error_message(), None);
    }

    #[test]
    fn test_reentry_clears_results_and_bumps_revision() {
        let mut controller = mounted(5);
        let revision = controller.snapshot().results_revision;

        controller.next_page();

        let snapshot = controller.snapshot();
        assert!(snapshot.results.is_empty());
        assert!(snapshot.loading);
        assert!(snapshot.results_revision > revision);
    }

    #[test]
    fn test_filter_change_resets_cursors() {
        let mut controller = mounted(20);
        let fetch = controller.go_to_page(4).unwrap();
        complete(&mut controller, &fetch, 20);

        let fetch = controller.set_filter(FilterUpdate::ReleaseYear(Some(1999))).unwrap();

        assert_eq!(fetch.request.page(), 1);
        assert_eq!(fetch.request.filters().release_year, Some(1999));
        assert_eq!(controller.state().browse_page(), 1);
        assert_eq!(controller.state().search_page(), 1);
        assert_eq!(controller.state().total_pages(), 1);
        assert!(controller.next_page().is_none());
    }

    #[test]
    fn test_unchanged_filter_issues_no_fetch() {
        let mut controller = mounted(20);
        assert!(controller.set_filter(FilterUpdate::IncludeAdult(false)).is_none());
        assert!(controller.set_filter(FilterUpdate::Genre(None)).is_none());
    }

    #[test]
    fn test_filters_apply_in_both_modes() {
        let mut controller = mounted(20);
        controller.set_filter(FilterUpdate::MinRating(Some(7.0)));

        let fetch = controller.apply_debounced_query("heat").unwrap();
        assert_eq!(fetch.request.filters().min_rating, Some(7.0));

        let fetch = controller.apply_debounced_query("").unwrap();
        assert_eq!(fetch.request.filters().min_rating, Some(7.0));
    }

    #[test]
    fn test_shrinking_total_clamps_cursor_and_refetches() {
        let mut controller = mounted(20);
        let fetch = controller.go_to_page(9).unwrap();
        complete(&mut controller, &fetch, 20);

        let fetch = controller.next_page().unwrap();
        let effects = controller.apply_response(fetch.generation, Ok(page(&[], 6)));

        assert_eq!(effects.len(), 1);
        let Effect::Fetch(refetch) = &effects[0] else {
            panic!("expected a refetch, got {:?}", effects[0]);
        };
        assert_eq!(refetch.request.page(), 6);
        assert_eq!(refetch.generation, fetch.generation + 1);
        assert_eq!(controller.status(), FetchStatus::Loading);
        assert_eq!(controller.state().active_page(), 6);
    }

    #[test]
    fn test_page_window_follows_blocks() {
        let mut controller = mounted(12);

        let fetch = controller.go_to_page(5).unwrap();
        complete(&mut controller, &fetch, 12);
        assert_eq!(controller.snapshot().page_window, vec![1, 2, 3, 4, 5]);
        assert_eq!(controller.snapshot().page_window_start, 0);

        let fetch = controller.next_page().unwrap();
        complete(&mut controller, &fetch, 12);
        assert_eq!(controller.snapshot().page_window, vec![6, 7, 8, 9, 10]);
        assert_eq!(controller.snapshot().page_window_start, 5);

        let fetch = controller.go_to_page(12).unwrap();
        complete(&mut controller, &fetch, 12);
        assert_eq!(controller.snapshot().page_window, vec![11, 12]);
    }

    #[test]
    fn test_genres_written_once() {
        let mut controller = QueryController::new(FilterSet::default(), 5);
        controller.set_genres(vec![Genre {
            id: 28,
            name: "Action".to_string(),
        }]);
        controller.set_genres(vec![]);

        assert_eq!(controller.genres().map(|g| g.len()), Some(1));
    }

    #[test]
    fn test_snapshot_invariants() {
        let mut controller = mounted(3);
        controller.set_raw_query("dun");
        let snapshot = controller.snapshot();

        assert_eq!(snapshot.mode, Mode::Browse);
        assert_eq!(snapshot.raw_query, "dun");
        assert_eq!(snapshot.debounced_query, "");
        assert!(snapshot.active_page >= 1);
        assert!(snapshot.active_page <= snapshot.total_pages.max(1));
        assert!(!snapshot.loading);
    }
}
