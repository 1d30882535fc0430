//! Top-level category browsing
//!
//! [`CategoryBrowser`] fetches the category tree once and keeps it as an
//! arena-backed [`CategoryTree`]. It follows the same idle/loading/loaded/
//! failed lifecycle as the search session, but the single request is
//! awaited directly by the caller.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::app::category::{CategoryTree, CategoryTreeBuilder};
use crate::app::client::CatalogApi;
use crate::app::observers::StateObservers;
use crate::errors::ApiError;

/// Lifecycle of the category tree download
#[derive(Debug, Clone, Default)]
pub enum BrowserState {
    #[default]
    Idle,
    Loading,
    Loaded(Arc<CategoryTree>),
    Failed(ApiError),
}

impl BrowserState {
    pub fn is_idle(&self) -> bool {
        matches!(self, BrowserState::Idle)
    }

    pub fn tree(&self) -> Option<&Arc<CategoryTree>> {
        match self {
            BrowserState::Loaded(tree) => Some(tree),
            _ => None,
        }
    }
}

/// Display data for one top-level category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub display_name: String,
    pub child_count: usize,
}

impl CategorySummary {
    pub fn has_subcategories(&self) -> bool {
        self.child_count > 0
    }
}

#[derive(Debug, Default)]
struct BrowserInner {
    state: BrowserState,
    observers: StateObservers<BrowserState>,
}

impl BrowserInner {
    fn transition(&mut self, state: BrowserState) {
        self.state = state;
        self.observers.notify(&self.state);
    }
}

/// Puts back the pre-fetch state if a fetch future is dropped mid-request
struct FetchGuard<'a> {
    browser: &'a CategoryBrowser,
    previous: Option<BrowserState>,
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            debug!("Category fetch abandoned, restoring {:?}", previous);
            self.browser.lock().transition(previous);
        }
    }
}

/// Loads and exposes the category tree
pub struct CategoryBrowser {
    api: Arc<dyn CatalogApi>,
    inner: Mutex<BrowserInner>,
}

impl CategoryBrowser {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self {
            api,
            inner: Mutex::new(BrowserInner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BrowserInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> BrowserState {
        self.lock().state.clone()
    }

    /// Subscribe to state transitions from now on
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<BrowserState> {
        self.lock().observers.subscribe()
    }

    /// The loaded tree, if any
    pub fn tree(&self) -> Option<Arc<CategoryTree>> {
        self.lock().state.tree().cloned()
    }

    /// Fetch the category tree
    ///
    /// Does nothing unless idle. Returns whether a request was issued.
    /// Dropping the future before it completes returns the browser to the
    /// state it was in before the call.
    pub async fn load(&self) -> bool {
        self.fetch_if(BrowserState::is_idle).await
    }

    /// Fetch again after a failure
    ///
    /// Returns whether a request was issued.
    pub async fn retry(&self) -> bool {
        self.fetch_if(|state| matches!(state, BrowserState::Failed(_)))
            .await
    }

    async fn fetch_if(&self, allowed: impl Fn(&BrowserState) -> bool) -> bool {
        let mut guard = {
            let mut inner = self.lock();
            if !allowed(&inner.state) {
                debug!("Category fetch skipped in current state");
                return false;
            }
            let previous = inner.state.clone();
            inner.transition(BrowserState::Loading);
            FetchGuard {
                browser: self,
                previous: Some(previous),
            }
        };

        let result = self.api.categories().await;
        guard.previous = None;

        let next = match result {
            Ok(container) => {
                let tree = CategoryTreeBuilder.build_forest(&container.categories);
                debug!(
                    "Built category tree: {} roots, {} nodes",
                    tree.roots().len(),
                    tree.len()
                );
                BrowserState::Loaded(Arc::new(tree))
            }
            Err(error) => {
                warn!("Category fetch failed: {}", error);
                BrowserState::Failed(error)
            }
        };
        self.lock().transition(next);
        true
    }

    /// One summary per top-level category, in server order
    pub fn summaries(&self) -> Vec<CategorySummary> {
        let Some(tree) = self.tree() else {
            return Vec::new();
        };

        tree.roots()
            .iter()
            .map(|&id| CategorySummary {
                display_name: tree.display_name(id).to_string(),
                child_count: tree.children(id).len(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::app::models::{CategoriesContainer, Category, PageRequest, SearchResult};
    use crate::errors::ApiResult;

    struct FlakyApi {
        calls: AtomicUsize,
        fail_first: bool,
    }

    #[async_trait]
    impl CatalogApi for FlakyApi {
        async fn categories(&self) -> ApiResult<CategoriesContainer> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_first && call == 0 {
                return Err(ApiError::network("connection reset"));
            }
            Ok(CategoriesContainer {
                categories: vec![
                    Category::with_children(
                        "Kochen",
                        vec![Category::leaf("Töpfe"), Category::leaf("Pfannen")],
                    ),
                    Category::leaf("Beauty"),
                ],
            })
        }

        async fn search(
            &self,
            _category_path: &str,
            _query: &str,
            _page: Option<PageRequest>,
        ) -> ApiResult<SearchResult> {
            Err(ApiError::Unknown)
        }
    }

    fn browser(fail_first: bool) -> (Arc<FlakyApi>, CategoryBrowser) {
        let api = Arc::new(FlakyApi {
            calls: AtomicUsize::new(0),
            fail_first,
        });
        (api.clone(), CategoryBrowser::new(api))
    }

    #[tokio::test]
    async fn test_load_builds_summaries() {
        let (_, browser) = browser(false);
        assert!(browser.summaries().is_empty());

        assert!(browser.load().await);
        let summaries = browser.summaries();
        assert_eq!(
            summaries,
            vec![
                CategorySummary {
                    display_name: "Kochen".to_string(),
                    child_count: 2
                },
                CategorySummary {
                    display_name: "Beauty".to_string(),
                    child_count: 0
                },
            ]
        );
        assert!(summaries[0].has_subcategories());
        assert!(!summaries[1].has_subcategories());
    }

    #[tokio::test]
    async fn test_load_only_once() {
        let (api, browser) = browser(false);
        assert!(browser.load().await);
        assert!(!browser.load().await);
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_after_failure() {
        let (api, browser) = browser(true);
        let mut states = browser.subscribe();

        assert!(!browser.retry().await);
        assert!(browser.load().await);
        assert!(matches!(browser.state(), BrowserState::Failed(ApiError::Network { .. })));
        assert!(!browser.load().await);

        assert!(browser.retry().await);
        assert_eq!(browser.tree().map(|tree| tree.len()), Some(4));
        assert_eq!(api.calls.load(Ordering::SeqCst), 2);

        let mut seen = Vec::new();
        while let Ok(state) = states.try_recv() {
            seen.push(match state {
                BrowserState::Idle => "idle",
                BrowserState::Loading => "loading",
                BrowserState::Loaded(_) => "loaded",
                BrowserState::Failed(_) => "failed",
            });
        }
        assert_eq!(seen, vec!["loading", "failed", "loading", "loaded"]);
    }

    /// Hangs on the first request, answers every later one
    struct StallingApi {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CatalogApi for StallingApi {
        async fn categories(&self) -> ApiResult<CategoriesContainer> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                futures::future::pending::<()>().await;
            }
            Ok(CategoriesContainer {
                categories: vec![Category::leaf("Mode")],
            })
        }

        async fn search(
            &self,
            _category_path: &str,
            _query: &str,
            _page: Option<PageRequest>,
        ) -> ApiResult<SearchResult> {
            Err(ApiError::Unknown)
        }
    }

    #[tokio::test]
    async fn test_abandoned_load_returns_to_idle() {
        let api = Arc::new(StallingApi {
            calls: AtomicUsize::new(0),
        });
        let browser = CategoryBrowser::new(api.clone());
        let mut states = browser.subscribe();

        let abandoned =
            tokio::time::timeout(std::time::Duration::from_millis(20), browser.load()).await;
        assert!(abandoned.is_err());
        assert!(browser.state().is_idle());
        assert!(matches!(states.try_recv(), Ok(BrowserState::Loading)));
        assert!(matches!(states.try_recv(), Ok(BrowserState::Idle)));

        assert!(browser.load().await);
        assert_eq!(browser.tree().map(|tree| tree.len()), Some(1));
        assert_eq!(api.calls.load(Ordering::SeqCst), 2);
    }
}
