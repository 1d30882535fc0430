//! Prelude module for the HSE catalog library
//!
//! Re-exports the items needed for typical usage with a single
//! `use hse_catalog::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use hse_catalog::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let api = Arc::new(ApiClient::new(&ClientConfig::default())?);
//!     let session = SearchSession::new(api, "Kochen");
//!     session.start_initial_search("Topf");
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{ApiError, ApiResult, AppError, Result};

// Essential app components
pub use crate::app::{
    ApiClient, CatalogApi, CategoryBrowser, CategoryTree, CategoryTreeBuilder, ClientConfig,
    NodeId, PageRequest, Paging, ProductHit, SearchResult, SearchSession, SessionState,
};

// Configuration
pub use crate::config::AppConfig;

// Commonly used constants
pub use crate::constants::{BASE_URL, DEFAULT_RATE_LIMIT_RPS, MATCH_ALL_QUERY, USER_AGENT};

pub use std::sync::Arc;

pub use tokio;
