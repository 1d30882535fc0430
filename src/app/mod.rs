//! Core catalog logic
//!
//! This module contains the API client, the wire models and their decoder,
//! the in-memory category tree, and the stateful browser and search
//! session built on top of them.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hse_catalog::app::{ApiClient, CategoryBrowser, ClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Arc::new(ApiClient::new(&ClientConfig::default())?);
//! let browser = CategoryBrowser::new(api);
//! browser.load().await;
//!
//! if let Some(tree) = browser.tree() {
//!     for &root in tree.roots() {
//!         println!("{} ({} subcategories)", tree.path(root), tree.children(root).len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod category;
pub mod client;
pub mod decoder;
pub mod events;
pub mod models;
pub mod observers;
pub mod session;

// Re-export main public API
pub use browser::{BrowserState, CategoryBrowser, CategorySummary};
pub use category::{CategoryNode, CategoryTree, CategoryTreeBuilder, NodeId};
pub use client::{
    ApiClient, ApiRoute, CatalogApi, ClientConfig, HttpTransport, RawResponse, Transport,
};
pub use events::{selection_channel, SelectionEvent, SelectionSender};
pub use models::{
    BaseProduct, CategoriesContainer, Category, PageRequest, Paging, ProductHit, SearchResult,
    Variant,
};
pub use session::{PageStore, SearchSession, SessionState};
