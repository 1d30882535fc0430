//! API client for the catalog backend
//!
//! This module builds request URLs for the two backend operations, drives a
//! [`Transport`] and decodes the responses into the wire models. All
//! failures come back as [`ApiError`] values; nothing is cached and nothing
//! is retried.
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `transport`: the GET seam and its reqwest implementation

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use crate::app::decoder;
use crate::app::models::{CategoriesContainer, PageRequest, SearchResult};
use crate::constants::{api, search};
use crate::errors::{ApiError, ApiResult, Result, TransportError};

pub mod config;
pub mod transport;

pub use config::ClientConfig;
pub use transport::{HttpTransport, RawResponse, Transport};

/// Backend routes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiRoute {
    Categories,
    Search,
}

impl ApiRoute {
    pub fn path(self) -> &'static str {
        match self {
            ApiRoute::Categories => api::CATEGORIES_PATH,
            ApiRoute::Search => api::SEARCH_PATH,
        }
    }
}

/// Catalog operations consumed by sessions and the CLI
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch the full category tree
    async fn categories(&self) -> ApiResult<CategoriesContainer>;

    /// Search within a category
    ///
    /// An empty `query` matches everything. Without `page` the server
    /// returns its default first page.
    async fn search(
        &self,
        category_path: &str,
        query: &str,
        page: Option<PageRequest>,
    ) -> ApiResult<SearchResult>;
}

/// Catalog API client over any [`Transport`]
#[derive(Debug)]
pub struct ApiClient<T = HttpTransport> {
    base_url: Url,
    transport: T,
}

impl ApiClient<HttpTransport> {
    /// Creates a client talking HTTP to the configured backend
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or the HTTP
    /// transport cannot be built
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ApiError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        let transport = HttpTransport::new(config)?;

        info!("Created catalog client for {}", base_url);
        Ok(Self::with_transport(base_url, transport))
    }
}

impl<T: Transport> ApiClient<T> {
    /// Creates a client over a custom transport
    pub fn with_transport(base_url: Url, transport: T) -> Self {
        Self {
            base_url,
            transport,
        }
    }

    /// Get the base URL of the backend
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get a reference to the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Appends a route's path to the base URL
    pub fn build_url(&self, route: ApiRoute) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| ApiError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "base URL cannot carry a path".to_string(),
            })?;
            segments.pop_if_empty();
            segments.extend(route.path().trim_start_matches('/').split('/'));
        }
        Ok(url)
    }

    /// Builds the search URL with its query parameters
    ///
    /// Parameter order is `query`, `filter`, then `page` and `hitsPerPage`
    /// when a page is requested.
    pub fn build_search_url(
        &self,
        category_path: &str,
        query: &str,
        page: Option<PageRequest>,
    ) -> ApiResult<Url> {
        let mut url = self.build_url(ApiRoute::Search)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair(search::PARAM_QUERY, normalize_query(query));
            pairs.append_pair(
                search::PARAM_FILTER,
                &format!("{}{}", search::CATEGORY_FILTER_PREFIX, category_path),
            );
            if let Some(page) = page {
                pairs.append_pair(search::PARAM_PAGE, &page.number.to_string());
                if let Some(hits_per_page) = page.hits_per_page {
                    pairs.append_pair(search::PARAM_HITS_PER_PAGE, &hits_per_page.to_string());
                }
            }
        }
        Ok(url)
    }

    async fn request<R: DeserializeOwned>(&self, url: Url) -> ApiResult<R> {
        debug!("Requesting {}", url);

        let response = self.transport.get(&url).await.map_err(|e| {
            warn!("Request to {} failed: {}", url, e);
            ApiError::from(e)
        })?;

        if !response.is_success() {
            warn!("Request to {} returned HTTP {}", url, response.status);
            return Err(TransportError::InvalidStatus {
                status: response.status,
            }
            .into());
        }

        decoder::decode(&response.body).map_err(|e| {
            warn!("Response from {} could not be decoded: {}", url, e);
            e
        })
    }
}

#[async_trait]
impl<T: Transport> CatalogApi for ApiClient<T> {
    async fn categories(&self) -> ApiResult<CategoriesContainer> {
        let url = self.build_url(ApiRoute::Categories)?;
        let container: CategoriesContainer = self.request(url).await?;
        info!(
            "Fetched {} top-level categories",
            container.categories.len()
        );
        Ok(container)
    }

    async fn search(
        &self,
        category_path: &str,
        query: &str,
        page: Option<PageRequest>,
    ) -> ApiResult<SearchResult> {
        let url = self.build_search_url(category_path, query, page)?;
        let result: SearchResult = self.request(url).await?;
        info!(
            "Fetched search result: page {} | hits on page {} | total hits {} | total pages {}",
            result
                .paging
                .map_or(search::FIRST_PAGE, |paging| paging.current_page),
            result.hits.len(),
            result.total_hits,
            result.paging.map_or(1, |paging| paging.page_count),
        );
        Ok(result)
    }
}

/// Empty queries match everything
pub fn normalize_query(query: &str) -> &str {
    if query.is_empty() {
        search::MATCH_ALL_QUERY
    } else {
        query
    }
}
