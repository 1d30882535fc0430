//! Wire-format data models for the catalog backend
//!
//! These types mirror the JSON documents served by the category and search
//! endpoints. Field names on the wire use server-specific casing and are
//! mapped to semantic names here. Unknown fields are ignored so newer
//! server payloads keep decoding.

use serde::{Deserialize, Serialize};

/// Top-level category tree document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoriesContainer {
    pub categories: Vec<Category>,
}

/// A category as served by the backend, with optional nested children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Category>>,
}

impl Category {
    /// Create a leaf category
    pub fn leaf(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            children: None,
        }
    }

    /// Create a category with the given children
    pub fn with_children(display_name: impl Into<String>, children: Vec<Category>) -> Self {
        Self {
            display_name: display_name.into(),
            children: Some(children),
        }
    }

    /// Child categories, treating an absent list as empty
    pub fn children(&self) -> &[Category] {
        self.children.as_deref().unwrap_or(&[])
    }
}

/// Paging block of a search response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    pub current_page: u32,
    pub page_count: u32,
    /// Page size
    pub hits_per_page: u32,
    pub default_hits_per_page: u32,
}

impl Paging {
    /// Whether pages beyond the current one exist
    pub fn has_more(&self) -> bool {
        self.current_page < self.page_count
    }

    /// Page size to carry into the next request, if the server reported one
    pub fn requested_page_size(&self) -> Option<u32> {
        (self.hits_per_page > 0).then_some(self.hits_per_page)
    }
}

/// A purchasable SKU under a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    #[serde(rename = "ProductNumber")]
    pub sku: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "ReferencePrice", default)]
    pub regular_price: Option<f64>,
    #[serde(rename = "Price", default)]
    pub special_price: Option<f64>,
    #[serde(rename = "variantValues", default)]
    pub description: Option<String>,
    /// Relative image path; the rendering layer adds host and size suffix
    #[serde(rename = "ImageURL", default)]
    pub image_url: Option<String>,
}

impl Variant {
    /// True when a special price undercuts the regular price
    pub fn is_discounted(&self) -> bool {
        match (self.special_price, self.regular_price) {
            (Some(special), Some(regular)) => special < regular,
            _ => false,
        }
    }
}

/// Master data shared by all variants of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseProduct {
    #[serde(rename = "MasterProductNumber")]
    pub sku: String,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "ShortDescription", default)]
    pub short_description: Option<String>,
    #[serde(rename = "Brand", default)]
    pub brand: Option<String>,
}

/// One product in a search result page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductHit {
    pub id: String,
    #[serde(rename = "masterValues")]
    pub base: BaseProduct,
    #[serde(rename = "variantValues")]
    pub variants: Vec<Variant>,
    /// Server-assigned rank within the result page
    pub position: i64,
}

impl ProductHit {
    /// Main product image, taken from the first variant
    pub fn image_url(&self) -> Option<&str> {
        self.variants.first()?.image_url.as_deref()
    }

    /// Display name, falling back to the product id
    pub fn display_name(&self) -> &str {
        self.base.name.as_deref().unwrap_or(&self.id)
    }
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Absent only for degenerate responses
    #[serde(default)]
    pub paging: Option<Paging>,
    pub total_hits: u64,
    pub hits: Vec<ProductHit>,
}

/// Explicit page selection for a search request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u32,
    /// Server default applies when unset
    pub hits_per_page: Option<u32>,
}

impl PageRequest {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            hits_per_page: None,
        }
    }

    pub fn with_hits_per_page(mut self, hits_per_page: u32) -> Self {
        self.hits_per_page = Some(hits_per_page);
        self
    }

    /// The page following the one described by `paging`, same page size
    pub fn next_after(paging: &Paging) -> Self {
        Self {
            number: paging.current_page + 1,
            hits_per_page: paging.requested_page_size(),
        }
    }
}
