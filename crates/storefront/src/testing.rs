//! Shared fixtures for unit tests.

#![allow(clippy::unwrap_used)]

use marketa_core::{ProductId, ProductSnapshot, ProductStatus};

/// Active product priced at 1500 with the given stock.
pub fn product(id: i64, name: &str, stock: u32) -> ProductSnapshot {
    ProductSnapshot {
        id: ProductId::new(id),
        name: name.to_string(),
        price: "1500".parse().unwrap(),
        stock,
        status: ProductStatus::Active,
        category: None,
        description: None,
        image_url: None,
        images: Vec::new(),
    }
}
