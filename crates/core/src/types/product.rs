//! Product snapshot as returned by the catalog endpoints.

use serde::{Deserialize, Serialize};

use crate::{CategoryId, Price, ProductId, ProductStatus};

/// Category reference embedded in a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
}

/// Product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: Option<String>,
    pub alt: Option<String>,
}

/// Read-only projection of a catalog product as of the last fetch.
///
/// Snapshots are never kept in sync with the catalog; a cart line carries
/// whatever the server sent when the line was last returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    /// Units available when the snapshot was taken.
    pub stock: u32,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
}
