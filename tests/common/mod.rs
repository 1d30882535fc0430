//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use hse_catalog::app::{
    BaseProduct, CatalogApi, CategoriesContainer, PageRequest, Paging, ProductHit, SearchResult,
    SessionState,
};
use hse_catalog::errors::{ApiError, ApiResult};

/// Arguments of one `search` call
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCall {
    pub category_path: String,
    pub query: String,
    pub page: Option<PageRequest>,
}

/// A search call waiting for the test to answer it
pub struct PendingSearch {
    pub call: SearchCall,
    responder: oneshot::Sender<ApiResult<SearchResult>>,
}

impl PendingSearch {
    /// Complete the call; returns false if the caller was cancelled
    pub fn respond(self, result: ApiResult<SearchResult>) -> bool {
        self.responder.send(result).is_ok()
    }

    /// Wait until the caller gives up on this call
    pub async fn cancelled(&mut self) {
        tokio::time::timeout(Duration::from_secs(1), self.responder.closed())
            .await
            .expect("search call was not cancelled");
    }
}

/// Catalog API whose searches block until the test answers them
pub struct GatedApi {
    categories: Mutex<Option<ApiResult<CategoriesContainer>>>,
    pending: mpsc::UnboundedSender<PendingSearch>,
}

impl GatedApi {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PendingSearch>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let api = Self {
            categories: Mutex::new(None),
            pending: tx,
        };
        (api, rx)
    }

    pub fn with_categories(self, categories: ApiResult<CategoriesContainer>) -> Self {
        *self.categories.lock().unwrap() = Some(categories);
        self
    }
}

#[async_trait]
impl CatalogApi for GatedApi {
    async fn categories(&self) -> ApiResult<CategoriesContainer> {
        self.categories
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Err(ApiError::Unknown))
    }

    async fn search(
        &self,
        category_path: &str,
        query: &str,
        page: Option<PageRequest>,
    ) -> ApiResult<SearchResult> {
        let (responder, response) = oneshot::channel();
        let call = SearchCall {
            category_path: category_path.to_string(),
            query: query.to_string(),
            page,
        };

        if self.pending.send(PendingSearch { call, responder }).is_err() {
            return Err(ApiError::Unknown);
        }
        response.await.unwrap_or(Err(ApiError::Unknown))
    }
}

/// Next search call issued against a [`GatedApi`]
pub async fn next_call(calls: &mut mpsc::UnboundedReceiver<PendingSearch>) -> PendingSearch {
    tokio::time::timeout(Duration::from_secs(1), calls.recv())
        .await
        .expect("timed out waiting for a search call")
        .expect("api dropped")
}

/// Assert that no further search call arrives
pub async fn assert_no_call(calls: &mut mpsc::UnboundedReceiver<PendingSearch>) {
    tokio::task::yield_now().await;
    let outcome = tokio::time::timeout(Duration::from_millis(50), calls.recv()).await;
    assert!(
        !matches!(outcome, Ok(Some(_))),
        "unexpected search call issued"
    );
}

/// Next state published by a session
pub async fn next_state(states: &mut mpsc::UnboundedReceiver<SessionState>) -> SessionState {
    tokio::time::timeout(Duration::from_secs(1), states.recv())
        .await
        .expect("timed out waiting for a state")
        .expect("session dropped")
}

/// Assert that no further state is published for a short while
pub async fn assert_quiet(states: &mut mpsc::UnboundedReceiver<SessionState>) {
    let outcome = tokio::time::timeout(Duration::from_millis(50), states.recv()).await;
    assert!(
        !matches!(outcome, Ok(Some(_))),
        "unexpected state published: {:?}",
        outcome
    );
}

pub fn hit(id: &str) -> ProductHit {
    ProductHit {
        id: id.to_string(),
        base: BaseProduct {
            sku: id.to_string(),
            name: Some(format!("Produkt {}", id)),
            description: None,
            short_description: None,
            brand: None,
        },
        variants: Vec::new(),
        position: 0,
    }
}

/// `count` hits with ids `<prefix>-0 .. <prefix>-<count-1>`
pub fn hits(prefix: &str, count: usize) -> Vec<ProductHit> {
    (0..count).map(|i| hit(&format!("{}-{}", prefix, i))).collect()
}

pub fn paging(current_page: u32, page_count: u32, hits_per_page: u32) -> Paging {
    Paging {
        current_page,
        page_count,
        hits_per_page,
        default_hits_per_page: 24,
    }
}

pub fn result_page(paging: Paging, hits: Vec<ProductHit>) -> ApiResult<SearchResult> {
    Ok(SearchResult {
        total_hits: u64::from(paging.page_count) * u64::from(paging.hits_per_page),
        paging: Some(paging),
        hits,
    })
}

pub fn ids(hits: &[ProductHit]) -> Vec<String> {
    hits.iter().map(|hit| hit.id.clone()).collect()
}
