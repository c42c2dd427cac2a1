//! Integration tests for the Marketa storefront client.
//!
//! Every test stands up a `wiremock` server playing the storefront API, so
//! no external services are needed.
//!
//! ```bash
//! cargo test -p marketa-integration-tests
//! ```
//!
//! This crate only holds fixtures shared by the files under `tests/`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::time::Duration;

use marketa_storefront::config::ApiConfig;
use serde_json::{Value, json};
use wiremock::MockServer;

/// Bearer token used by authenticated fixtures.
pub const TEST_TOKEN: &str = "7|Zx8pQ2mN4vB6cR1tY9wK3hJ5";

/// API prefix the mock server serves under.
pub const API_PREFIX: &str = "/api";

/// Client configuration pointing at `server`, without credentials.
///
/// # Panics
///
/// Panics if the mock server URI is not a valid base URL.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn api_config(server: &MockServer) -> ApiConfig {
    let mut config = ApiConfig::new(&format!("{}{API_PREFIX}", server.uri())).unwrap();
    config.product_cache_ttl = Duration::from_secs(60);
    config
}

/// Client configuration pointing at `server`, signed in with [`TEST_TOKEN`].
#[must_use]
pub fn authenticated_config(server: &MockServer) -> ApiConfig {
    api_config(server).with_token(TEST_TOKEN)
}

/// Full path of an API endpoint on the mock server.
#[must_use]
pub fn api_path(endpoint: &str) -> String {
    format!("{API_PREFIX}/{endpoint}")
}

/// Product as the API serialises it.
#[must_use]
pub fn product_json(id: i64, name: &str, price: &str, stock: u32) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": null,
        "price": price,
        "stock": stock,
        "image_url": null,
        "category_id": 1,
        "status": "active",
        "category": { "id": 1, "name": "Electronics" },
        "images": []
    })
}

/// Cart line as the API serialises it.
#[must_use]
pub fn line_json(line_id: i64, product: &Value, quantity: u32) -> Value {
    json!({
        "id": line_id,
        "cart_id": 1,
        "product_id": product["id"],
        "quantity": quantity,
        "product": product
    })
}
