//! REST client for the storefront API.
//!
//! Uses `reqwest` for HTTP and caches product snapshots using `moka`.
//! Cart and checkout calls are never cached.

use std::sync::Arc;

use async_trait::async_trait;
use marketa_core::{CartLine, CheckoutStart, LineId, PaymentStatus, ProductId, ProductSnapshot};
use moka::future::Cache;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

use super::{
    AddLineRequest, CartEnvelope, CartGateway, ConfirmPaymentRequest, GatewayError,
    PaymentConfirmation, UpdateLineRequest,
};
use crate::auth::AuthStatus;
use crate::config::ApiConfig;

/// Header carrying the per-request correlation id.
const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// How much of a response body ends up in logs and error messages.
const BODY_EXCERPT_CHARS: usize = 200;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront REST API.
///
/// Cheap to clone; clones share the connection pool and product cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
    products: Cache<ProductId, ProductSnapshot>,
}

/// Error payload shape used by the API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let products = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.product_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                token: config.token.clone(),
                products,
            }),
        })
    }

    /// Whether requests carry a bearer credential.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.inner.token.is_some()
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build a request for a path relative to the base URL.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, GatewayError> {
        let url = self.inner.base_url.join(path)?;
        let request_id = Uuid::new_v4();
        debug!(%method, %url, %request_id, "API request");

        let mut builder = self
            .inner
            .client
            .request(method, url)
            .header(REQUEST_ID_HEADER, request_id.to_string());

        if let Some(token) = &self.inner.token {
            builder = builder.bearer_auth(token.expose_secret());
        }

        Ok(builder)
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, GatewayError> {
        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(GatewayError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let message = error_message(&body);
        match status {
            StatusCode::UNAUTHORIZED => Err(GatewayError::Unauthorized),
            StatusCode::NOT_FOUND => Err(GatewayError::NotFound(message)),
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(GatewayError::Conflict {
                    status: status.as_u16(),
                    message,
                })
            }
            StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => Err(GatewayError::Unavailable(message)),
            _ => {
                tracing::error!(
                    status = %status,
                    body = %excerpt(&body),
                    "Storefront API returned non-success status"
                );
                Err(GatewayError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    /// Send a request and parse the JSON response.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GatewayError> {
        let body = self.send(request).await?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %excerpt(&body),
                "Failed to parse storefront API response"
            );
            GatewayError::Parse(e)
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a product snapshot by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product(&self, product_id: ProductId) -> Result<ProductSnapshot, GatewayError> {
        if let Some(product) = self.inner.products.get(&product_id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let request = self.request(Method::GET, &format!("product/{product_id}"))?;
        let product: ProductSnapshot = self.execute(request).await?;

        self.inner
            .products
            .insert(product_id, product.clone())
            .await;

        Ok(product)
    }

    /// Invalidate a cached product.
    pub async fn invalidate_product(&self, product_id: ProductId) {
        self.inner.products.invalidate(&product_id).await;
    }

    /// Invalidate all cached products.
    pub async fn invalidate_all(&self) {
        self.inner.products.invalidate_all();
        self.inner.products.run_pending_tasks().await;
    }
}

// =============================================================================
// Cart Methods
// =============================================================================

#[async_trait]
impl CartGateway for ApiClient {
    #[instrument(skip(self))]
    async fn fetch_cart(&self) -> Result<Vec<CartLine>, GatewayError> {
        let request = self.request(Method::GET, "cart")?;
        let envelope: CartEnvelope = self.execute(request).await?;
        Ok(envelope.items)
    }

    #[instrument(skip(self))]
    async fn add_line(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartLine, GatewayError> {
        let request = self
            .request(Method::POST, "cart/add")?
            .json(&AddLineRequest {
                product_id,
                quantity,
            });
        self.execute(request).await
    }

    #[instrument(skip(self))]
    async fn set_line_quantity(
        &self,
        line_id: LineId,
        quantity: u32,
    ) -> Result<CartLine, GatewayError> {
        let request = self
            .request(Method::PUT, &format!("cart/item/{line_id}"))?
            .json(&UpdateLineRequest { quantity });
        self.execute(request).await
    }

    #[instrument(skip(self))]
    async fn remove_line(&self, line_id: LineId) -> Result<(), GatewayError> {
        let request = self.request(Method::DELETE, &format!("cart/item/{line_id}"))?;
        self.send(request).await.map(drop)
    }

    #[instrument(skip(self))]
    async fn clear_cart(&self) -> Result<(), GatewayError> {
        let request = self.request(Method::DELETE, "cart/clear")?;
        self.send(request).await.map(drop)
    }

    #[instrument(skip(self))]
    async fn start_checkout(&self) -> Result<CheckoutStart, GatewayError> {
        let request = self
            .request(Method::POST, "order/checkout")?
            .json(&serde_json::json!({}));
        self.execute(request).await
    }

    #[instrument(skip(self))]
    async fn confirm_payment(&self, session_id: &str) -> Result<PaymentStatus, GatewayError> {
        let request = self
            .request(Method::POST, "cart/confirmPayment")?
            .json(&ConfirmPaymentRequest {
                session_id: session_id.to_string(),
            });
        let confirmation: PaymentConfirmation = self.execute(request).await?;
        Ok(confirmation.status)
    }
}

impl AuthStatus for ApiClient {
    fn is_authenticated(&self) -> bool {
        self.has_credentials()
    }
}

/// Pull a human-readable message out of an error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| excerpt(body))
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}
