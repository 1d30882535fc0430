//! Paged search session
//!
//! A [`SearchSession`] owns the search lifecycle of one category: it issues
//! the initial request, fetches further pages on demand, accumulates the
//! hits page by page and publishes every state transition to subscribers.
//!
//! Requests run on spawned tokio tasks, so the operations return
//! immediately and must be called from within a tokio runtime. At most one
//! request is in flight per session: issuing a new one aborts the previous
//! task and bumps a generation counter, and a completion carrying a stale
//! generation is dropped without touching the session.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hse_catalog::app::{ApiClient, ClientConfig, SearchSession, SessionState};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Arc::new(ApiClient::new(&ClientConfig::default())?);
//! let session = SearchSession::new(api, "Kochen/Töpfe");
//! let mut states = session.subscribe();
//!
//! session.start_initial_search("");
//! while let Some(state) = states.recv().await {
//!     if let SessionState::Loaded { hits, .. } = &state {
//!         println!("{} hits so far", hits.len());
//!         if !session.load_more() {
//!             break;
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::app::client::CatalogApi;
use crate::app::models::{PageRequest, Paging, ProductHit, SearchResult};
use crate::app::observers::{into_stream, StateObservers};
use crate::constants::search::FIRST_PAGE;
use crate::errors::ApiResult;

pub mod state;

pub use state::{PageStore, SessionState};

/// Mutable session data, guarded by a single mutex
#[derive(Debug, Default)]
struct SessionInner {
    state: SessionState,
    pages: PageStore,
    last_paging: Option<Paging>,
    query: String,
    page_size: Option<u32>,
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
    observers: StateObservers<SessionState>,
}

impl SessionInner {
    fn transition(&mut self, state: SessionState) {
        debug!("Session state: {} -> {}", self.state, state);
        self.state = state;
        self.observers.notify(&self.state);
    }

    /// Abort the running request and invalidate its completion
    fn cancel_in_flight(&mut self) {
        self.generation += 1;
        if let Some(handle) = self.in_flight.take() {
            if !handle.is_finished() {
                debug!("Cancelling in-flight search request");
            }
            handle.abort();
        }
    }

    fn complete(&mut self, page: Option<PageRequest>, result: ApiResult<SearchResult>) {
        match result {
            Ok(result) => {
                // Page numbering begins at one
                let number = result
                    .paging
                    .map(|paging| paging.current_page)
                    .or(page.map(|page| page.number))
                    .unwrap_or(FIRST_PAGE);
                self.pages.insert(number, result.hits);
                self.last_paging = result.paging;

                let hits = self.pages.flatten();
                info!(
                    "Loaded page {} ({} hits accumulated, {} total)",
                    number,
                    hits.len(),
                    result.total_hits
                );
                self.transition(SessionState::Loaded {
                    hits,
                    paging: self.last_paging,
                });
            }
            Err(error) => {
                warn!("Search request failed ({}): {}", error.category(), error);
                self.transition(SessionState::Failed(error));
            }
        }
    }
}

/// Search state machine for a single category
pub struct SearchSession {
    api: Arc<dyn CatalogApi>,
    category_path: String,
    inner: Arc<Mutex<SessionInner>>,
}

impl std::fmt::Debug for SearchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSession")
            .field("category_path", &self.category_path)
            .field("state", &self.state())
            .finish()
    }
}

fn lock(inner: &Mutex<SessionInner>) -> MutexGuard<'_, SessionInner> {
    // Session data stays consistent even if a holder panicked
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SearchSession {
    /// Create an idle session for the category at `category_path`
    pub fn new(api: Arc<dyn CatalogApi>, category_path: impl Into<String>) -> Self {
        Self {
            api,
            category_path: category_path.into(),
            inner: Arc::new(Mutex::new(SessionInner::default())),
        }
    }

    /// Request `page_size` hits per page from the first page on
    ///
    /// Without it the initial request carries no page parameters and the
    /// server picks its default page size.
    pub fn with_page_size(self, page_size: u32) -> Self {
        lock(&self.inner).page_size = Some(page_size);
        self
    }

    /// Category path used as search filter
    pub fn category_path(&self) -> &str {
        &self.category_path
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        lock(&self.inner).state.clone()
    }

    /// Subscribe to state transitions from now on
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionState> {
        lock(&self.inner).observers.subscribe()
    }

    /// Subscribe to state transitions as a `Stream`
    pub fn state_stream(&self) -> impl futures::Stream<Item = SessionState> {
        into_stream(self.subscribe())
    }

    /// All accumulated hits, in page order
    pub fn hits(&self) -> Vec<ProductHit> {
        lock(&self.inner).pages.flatten()
    }

    /// Number of accumulated hits
    pub fn hit_count(&self) -> usize {
        lock(&self.inner).pages.total()
    }

    /// Paging block of the last successful page
    pub fn last_paging(&self) -> Option<Paging> {
        lock(&self.inner).last_paging
    }

    /// Whether the last successful page was not the final one
    pub fn has_more_to_load(&self) -> bool {
        lock(&self.inner)
            .last_paging
            .map_or(false, |paging| paging.has_more())
    }

    /// Query used by the next initial search and retries
    pub fn query(&self) -> String {
        lock(&self.inner).query.clone()
    }

    /// Replace the stored query without issuing a request
    pub fn set_query(&self, query: impl Into<String>) {
        lock(&self.inner).query = query.into();
    }

    /// Whether a request task is still running
    pub fn in_flight(&self) -> bool {
        lock(&self.inner)
            .in_flight
            .as_ref()
            .map_or(false, |handle| !handle.is_finished())
    }

    /// Category path, followed by the page position once known
    pub fn title(&self) -> String {
        match lock(&self.inner).last_paging {
            Some(paging) => format!(
                "{} {} of {}",
                self.category_path, paging.current_page, paging.page_count
            ),
            None => self.category_path.clone(),
        }
    }

    /// Issue the first request of the session
    ///
    /// Does nothing unless the session is idle, so repeated lifecycle
    /// triggers load once. Returns whether a request was issued.
    pub fn start_initial_search(&self, query: &str) -> bool {
        let mut inner = lock(&self.inner);
        if !inner.state.is_idle() {
            debug!(
                "Ignoring initial search for {}: session is {}",
                self.category_path, inner.state
            );
            return false;
        }

        inner.query = query.to_string();
        let initial = Self::initial_request(&inner);
        self.issue(&mut inner, initial);
        true
    }

    /// Request the page after the last loaded one
    ///
    /// Does nothing unless the last request succeeded and more pages exist.
    /// Returns whether a request was issued.
    pub fn load_more(&self) -> bool {
        let mut inner = lock(&self.inner);
        let next = match (&inner.state, inner.last_paging) {
            (SessionState::Loaded { .. }, Some(paging)) if paging.has_more() => {
                PageRequest::next_after(&paging)
            }
            _ => return false,
        };

        self.issue(&mut inner, Some(next));
        true
    }

    /// Re-issue the failed request
    ///
    /// Only valid after a failure. Requests the page after the last
    /// successful one, or repeats the initial request if none succeeded.
    /// Returns whether a request was issued.
    pub fn retry(&self) -> bool {
        let mut inner = lock(&self.inner);
        if !matches!(inner.state, SessionState::Failed(_)) {
            return false;
        }

        let page = match inner.last_paging {
            Some(paging) => Some(PageRequest::next_after(&paging)),
            None => Self::initial_request(&inner),
        };
        self.issue(&mut inner, page);
        true
    }

    /// Drop all results and return to idle
    ///
    /// Any in-flight request is cancelled and its response ignored.
    pub fn reset(&self) {
        let mut inner = lock(&self.inner);
        inner.cancel_in_flight();
        inner.pages.clear();
        inner.last_paging = None;
        inner.transition(SessionState::Idle);
    }

    fn initial_request(inner: &SessionInner) -> Option<PageRequest> {
        inner
            .page_size
            .map(|size| PageRequest::new(FIRST_PAGE).with_hits_per_page(size))
    }

    fn issue(&self, inner: &mut SessionInner, page: Option<PageRequest>) {
        inner.cancel_in_flight();
        let generation = inner.generation;
        inner.transition(SessionState::Loading);

        debug!(
            "Searching {} for {:?} (page {:?}, generation {})",
            self.category_path, inner.query, page, generation
        );

        let api = Arc::clone(&self.api);
        let shared = Arc::clone(&self.inner);
        let category_path = self.category_path.clone();
        let query = inner.query.clone();

        inner.in_flight = Some(tokio::spawn(async move {
            let result = api.search(&category_path, &query, page).await;

            let mut inner = lock(&shared);
            if inner.generation != generation {
                debug!(
                    "Discarding stale response for generation {} (current {})",
                    generation, inner.generation
                );
                return;
            }
            inner.in_flight = None;
            inner.complete(page, result);
        }));
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        lock(&self.inner).cancel_in_flight();
    }
}
