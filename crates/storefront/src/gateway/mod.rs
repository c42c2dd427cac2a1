//! Cart Remote Gateway.
//!
//! # Architecture
//!
//! - [`CartGateway`] is the seam between the cart store / checkout flow and the
//!   storefront REST API. Each method is exactly one round trip.
//! - No retries or timeouts live here; callers own that policy.
//! - [`ApiClient`] talks HTTP with `reqwest`, [`InMemoryGateway`] keeps the
//!   same contract against local state.
//!
//! # Endpoints
//!
//! | Operation | Method | Path |
//! |---|---|---|
//! | fetch cart | GET | `cart` |
//! | add line | POST | `cart/add` |
//! | update line | PUT | `cart/item/{id}` |
//! | remove line | DELETE | `cart/item/{id}` |
//! | clear cart | DELETE | `cart/clear` |
//! | start checkout | POST | `order/checkout` |
//! | confirm payment | POST | `cart/confirmPayment` |
//! | product lookup | GET | `product/{id}` |

mod http;
mod memory;

pub use http::ApiClient;
pub use memory::{GatewayCall, InMemoryGateway, Operation};

use async_trait::async_trait;
use marketa_core::{CartLine, CheckoutStart, LineId, PaymentStatus, ProductId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when talking to the storefront API.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The bearer credential was missing or rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// The server refused the change, typically because stock is insufficient.
    #[error("Conflict ({status}): {message}")]
    Conflict { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The API is temporarily unavailable.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Any other non-success response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl GatewayError {
    /// Whether the server rejected the requested quantity.
    #[must_use]
    pub const fn is_stock_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Remote cart and checkout operations.
#[async_trait]
pub trait CartGateway: Send + Sync {
    /// Current server-side cart contents.
    async fn fetch_cart(&self) -> Result<Vec<CartLine>, GatewayError>;

    /// Add a product to the cart.
    ///
    /// Fails with [`GatewayError::Conflict`] if `quantity` exceeds the stock.
    async fn add_line(&self, product_id: ProductId, quantity: u32)
    -> Result<CartLine, GatewayError>;

    /// Set the quantity of an existing line.
    ///
    /// Fails with [`GatewayError::Conflict`] if `quantity` exceeds the stock.
    /// The returned line carries the quantity the server actually stored.
    async fn set_line_quantity(
        &self,
        line_id: LineId,
        quantity: u32,
    ) -> Result<CartLine, GatewayError>;

    /// Remove a line.
    async fn remove_line(&self, line_id: LineId) -> Result<(), GatewayError>;

    /// Remove every line.
    async fn clear_cart(&self) -> Result<(), GatewayError>;

    /// Create a payment session for the current cart.
    async fn start_checkout(&self) -> Result<CheckoutStart, GatewayError>;

    /// Ask for the payment status of a session.
    ///
    /// A payment that is merely pending is `Ok`, never an error.
    async fn confirm_payment(&self, session_id: &str) -> Result<PaymentStatus, GatewayError>;
}

// =============================================================================
// Wire Types
// =============================================================================

/// Body of `POST cart/add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLineRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `PUT cart/item/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateLineRequest {
    pub quantity: u32,
}

/// Body of `POST cart/confirmPayment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub session_id: String,
}

/// Response of `GET cart`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CartEnvelope {
    pub items: Vec<CartLine>,
}

/// Response of `POST cart/confirmPayment`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct PaymentConfirmation {
    pub status: PaymentStatus,
}
