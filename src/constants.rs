//! Application constants for the HSE catalog client
//!
//! This module centralizes the constants used throughout the crate,
//! organized by functional domain.

use std::time::Duration;

/// Environment variable names
pub mod env {
    /// Overrides the configured API base URL
    pub const BASE_URL: &str = "HSE_CATALOG_BASE_URL";

    /// Standard filter variable honored by the log subscriber
    pub const LOG_FILTER: &str = "RUST_LOG";
}

/// Backend URLs and routes
pub mod api {
    /// Catalog API base URL
    pub const BASE_URL: &str = "https://www.hse.de/dpl";

    /// Category tree document
    pub const CATEGORIES_PATH: &str = "/files/c/categories/de_DE/category-tree.json";

    /// Product search endpoint
    pub const SEARCH_PATH: &str = "/s/search/dede";
}

/// Search request parameters
pub mod search {
    /// Query value meaning "match everything"
    pub const MATCH_ALL_QUERY: &str = "*";

    /// Prefix for the category filter value
    pub const CATEGORY_FILTER_PREFIX: &str = "CategoryPath:";

    pub const PARAM_QUERY: &str = "query";
    pub const PARAM_FILTER: &str = "filter";
    pub const PARAM_PAGE: &str = "page";
    pub const PARAM_HITS_PER_PAGE: &str = "hitsPerPage";

    /// Page numbering begins at one
    pub const FIRST_PAGE: u32 = 1;

    /// Separator between display names in a category path
    pub const PATH_SEPARATOR: &str = "/";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("HSE-Catalog/", env!("CARGO_PKG_VERSION"));

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

    /// Maximum idle connections per host in pool
    pub const POOL_MAX_PER_HOST: usize = 4;
}

/// Client-side throttling
pub mod limits {
    /// Default rate limit for catalog requests (requests per second)
    pub const DEFAULT_RATE_LIMIT_RPS: u32 = 5;
}

/// Configuration file locations
pub mod config {
    /// Directory name under the user config dir
    pub const APP_DIR: &str = "hse-catalog";

    /// File name inside the app config dir
    pub const FILE_NAME: &str = "config.toml";

    /// Project-local config file
    pub const LOCAL_FILE: &str = "./hse-catalog.toml";
}

// Convenience re-exports for commonly used constants
pub use api::BASE_URL;
pub use http::USER_AGENT;
pub use limits::DEFAULT_RATE_LIMIT_RPS;
pub use search::MATCH_ALL_QUERY;
