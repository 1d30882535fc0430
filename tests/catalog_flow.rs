//! End-to-end tests of the catalog client, browser and search session
//!
//! The HTTP layer is replaced by an in-memory transport serving canned JSON
//! documents, so the full path from URL building through decoding to the
//! session state machine is exercised.

mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use url::Url;

use common::{assert_quiet, next_state};
use hse_catalog::app::{
    ApiClient, BrowserState, CatalogApi, CategoryBrowser, RawResponse, SearchSession,
    SessionState, Transport,
};
use hse_catalog::errors::{ApiError, TransportError, TransportResult};

const CATEGORY_TREE: &str = r#"{
    "categories": [
        {
            "display_name": "Kochen",
            "children": [
                {"display_name": "Töpfe", "children": [{"display_name": "Bräter"}]},
                {"display_name": "Pfannen", "children": []}
            ]
        },
        {"display_name": "Beauty"}
    ]
}"#;

fn search_page(current_page: u32, page_count: u32, ids: &[&str]) -> String {
    let hits: Vec<String> = ids
        .iter()
        .enumerate()
        .map(|(position, id)| {
            format!(
                r#"{{"id":"{id}","position":{position},
                    "masterValues":{{"MasterProductNumber":"{id}","Name":"Produkt {id}"}},
                    "variantValues":[{{"ProductNumber":"{id}-1","Status":"AVAILABLE","Price":9.99}}]}}"#
            )
        })
        .collect();

    format!(
        r#"{{"paging":{{"currentPage":{current_page},"pageCount":{page_count},"hitsPerPage":2,"defaultHitsPerPage":24}},
            "totalHits":{total},"hits":[{hits}]}}"#,
        total = page_count * 2,
        hits = hits.join(",")
    )
}

/// Serves canned documents by path and `page` parameter
#[derive(Default)]
struct CannedBackend {
    categories: Option<String>,
    pages: HashMap<u32, String>,
    failing_pages: Vec<u32>,
    requests: Mutex<Vec<Url>>,
}

impl CannedBackend {
    fn requests(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for CannedBackend {
    async fn get(&self, url: &Url) -> TransportResult<RawResponse> {
        self.requests.lock().unwrap().push(url.clone());

        if url.path().ends_with("category-tree.json") {
            return Ok(match &self.categories {
                Some(body) => RawResponse::new(200, body.clone()),
                None => RawResponse::new(503, "unavailable"),
            });
        }

        let page = url
            .query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse::<u32>().ok())
            .unwrap_or(1);

        if self.failing_pages.contains(&page) {
            return Err(TransportError::Timeout { seconds: 30 });
        }

        Ok(match self.pages.get(&page) {
            Some(body) => RawResponse::new(200, body.clone()),
            None => RawResponse::new(404, "not found"),
        })
    }
}

fn client(backend: CannedBackend) -> Arc<ApiClient<CannedBackend>> {
    let base_url = Url::parse("https://shop.test/dpl/").unwrap();
    Arc::new(ApiClient::with_transport(base_url, backend))
}

#[tokio::test]
async fn test_browse_then_search_category() {
    let backend = CannedBackend {
        categories: Some(CATEGORY_TREE.to_string()),
        pages: HashMap::from([
            (1, search_page(1, 2, &["a", "b"])),
            (2, search_page(2, 2, &["c", "d"])),
        ]),
        ..CannedBackend::default()
    };
    let api = client(backend);

    let browser = CategoryBrowser::new(api.clone());
    assert!(browser.load().await);
    let tree = browser.tree().expect("tree loaded");
    tokio_test::assert_ok!(api.categories().await);

    let summaries = browser.summaries();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].display_name, "Kochen");
    assert_eq!(summaries[0].child_count, 2);
    assert!(!summaries[1].has_subcategories());

    let roaster = tree.find_by_path("Kochen/Töpfe/Bräter").expect("path exists");
    assert_eq!(tree.depth(roaster), 3);
    let pots = tree.parent(roaster).expect("has parent");
    let path = tree.path(pots);
    assert_eq!(path, "Kochen/Töpfe");

    let session = SearchSession::new(api.clone(), path);
    let mut states = session.subscribe();
    session.start_initial_search("");
    next_state(&mut states).await;
    assert!(next_state(&mut states).await.is_terminal());

    assert!(session.load_more());
    next_state(&mut states).await;
    match next_state(&mut states).await {
        SessionState::Loaded { hits, paging } => {
            let ids: Vec<&str> = hits.iter().map(|hit| hit.id.as_str()).collect();
            assert_eq!(ids, ["a", "b", "c", "d"]);
            assert_eq!(hits[2].display_name(), "Produkt c");
            assert_eq!(paging.map(|p| p.current_page), Some(2));
        }
        other => panic!("Expected loaded state, got {:?}", other),
    }

    let requests = api.transport().requests();
    assert_eq!(requests.len(), 4);
    assert_eq!(
        requests[0].as_str(),
        "https://shop.test/dpl/files/c/categories/de_DE/category-tree.json"
    );
    assert_eq!(
        requests[2].query(),
        Some("query=*&filter=CategoryPath%3AKochen%2FT%C3%B6pfe")
    );
    assert_eq!(
        requests[3].query(),
        Some("query=*&filter=CategoryPath%3AKochen%2FT%C3%B6pfe&page=2&hitsPerPage=2")
    );
    assert_eq!(requests[3].path(), "/dpl/s/search/dede");
}

#[tokio::test]
async fn test_browser_failure_then_retry() {
    let api = client(CannedBackend::default());
    let browser = CategoryBrowser::new(api.clone());
    let mut states = browser.subscribe();

    assert!(!browser.retry().await);
    assert!(browser.load().await);
    assert!(matches!(states.recv().await, Some(BrowserState::Loading)));
    match states.recv().await {
        Some(BrowserState::Failed(ApiError::Network { reason })) => {
            assert!(reason.contains("503"), "unexpected reason: {}", reason);
        }
        other => panic!("Expected network failure, got {:?}", other),
    }

    // Loading only starts from idle
    assert!(!browser.load().await);
    assert!(browser.retry().await);
    assert!(matches!(browser.state(), BrowserState::Failed(_)));
    assert!(browser.summaries().is_empty());
    assert_eq!(api.transport().requests().len(), 2);
}

#[tokio::test]
async fn test_timeout_on_next_page_keeps_loaded_hits() {
    let backend = CannedBackend {
        pages: HashMap::from([(1, search_page(1, 3, &["a", "b"]))]),
        failing_pages: vec![2],
        ..CannedBackend::default()
    };
    let api = client(backend);
    let session = SearchSession::new(api.clone(), "Beauty");
    let mut states = session.subscribe();

    session.start_initial_search("Creme");
    next_state(&mut states).await;
    next_state(&mut states).await;

    session.load_more();
    next_state(&mut states).await;
    let failed = next_state(&mut states).await;
    let error = failed.error().cloned().expect("request failed");
    assert!(error.is_retryable());
    assert_eq!(session.hit_count(), 2);

    assert!(session.retry());
    next_state(&mut states).await;
    next_state(&mut states).await;
    assert_quiet(&mut states).await;

    let requests = api.transport().requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[1], requests[2]);
    assert!(requests[2].as_str().contains("query=Creme"));
}

#[tokio::test]
async fn test_undecodable_search_response() {
    let backend = CannedBackend {
        pages: HashMap::from([(1, r#"{"totalHits":"many","hits":[]}"#.to_string())]),
        ..CannedBackend::default()
    };
    let api = client(backend);

    let error = tokio_test::assert_err!(api.search("Mode", "", None).await);
    assert!(matches!(error, ApiError::Decoding { .. }));
    assert!(!error.is_retryable());
}
