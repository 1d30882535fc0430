//! Response decoding
//!
//! Converts raw response bodies into the typed wire models. Any failure,
//! including an empty body, is reported as [`ApiError::Decoding`].

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::app::models::{CategoriesContainer, SearchResult};
use crate::errors::{ApiError, ApiResult};

/// Decode a JSON body into the expected payload type
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> ApiResult<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        debug!(
            "Failed to decode {} ({} bytes): {}",
            std::any::type_name::<T>(),
            bytes.len(),
            e
        );
        ApiError::decoding(e.to_string())
    })
}

/// Decode the category tree document
pub fn decode_categories(bytes: &[u8]) -> ApiResult<CategoriesContainer> {
    decode(bytes)
}

/// Decode one page of search results
pub fn decode_search_result(bytes: &[u8]) -> ApiResult<SearchResult> {
    decode(bytes)
}
