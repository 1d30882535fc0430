//! HSE Catalog Library
//!
//! A Rust library for browsing the HSE shop catalog: it fetches the category
//! tree, runs paginated searches inside a category, and tracks the paging
//! state of each search as an observable state machine.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{ApiError, AppError, Result};
