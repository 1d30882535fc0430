//! Session state and accumulated result pages

use std::collections::BTreeMap;
use std::fmt;

use crate::app::models::{Paging, ProductHit};
use crate::errors::ApiError;

/// Lifecycle of a paged search
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// Nothing requested yet
    #[default]
    Idle,
    /// A request is in flight
    Loading,
    /// Last request succeeded
    Loaded {
        /// All accumulated hits, in page order
        hits: Vec<ProductHit>,
        /// Paging block of the last successful page
        paging: Option<Paging>,
    },
    /// Last request failed; earlier pages are kept
    Failed(ApiError),
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }

    /// Loaded or Failed
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Loaded { .. } | SessionState::Failed(_))
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            SessionState::Failed(error) => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Loading => write!(f, "loading"),
            SessionState::Loaded { hits, paging } => match paging {
                Some(paging) => write!(
                    f,
                    "loaded {} hits (page {} of {})",
                    hits.len(),
                    paging.current_page,
                    paging.page_count
                ),
                None => write!(f, "loaded {} hits", hits.len()),
            },
            SessionState::Failed(error) => write!(f, "failed: {}", error),
        }
    }
}

/// Result pages keyed by page number
///
/// Pages are stored independently so late or out-of-order arrivals slot
/// into place; reading flattens them in ascending page order.
#[derive(Debug, Clone, Default)]
pub struct PageStore {
    pages: BTreeMap<u32, Vec<ProductHit>>,
}

impl PageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a page, replacing any earlier copy of the same page
    pub fn insert(&mut self, page: u32, hits: Vec<ProductHit>) {
        self.pages.insert(page, hits);
    }

    /// All hits in ascending page order
    pub fn flatten(&self) -> Vec<ProductHit> {
        self.pages.values().flatten().cloned().collect()
    }

    /// Number of stored hits across pages
    pub fn total(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }

    /// Number of stored pages
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains_key(&page)
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }
}
