//! Unified error handling with Sentry integration.
//!
//! Cart and checkout operations report to the notification sink themselves;
//! `AppError` is what a front end sees when it wants to bail out, and the
//! place where server-side failures are captured to Sentry.

use thiserror::Error;

use crate::cart::CartError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::gateway::GatewayError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storefront API call failed outside the cart and checkout flows.
    #[error("Storefront API error: {0}")]
    Gateway(#[from] GatewayError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout could not be started.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),
}

/// Result alias for front ends.
pub type Result<T, E = AppError> = std::result::Result<T, E>;

impl AppError {
    /// The gateway failure underneath this error, if any.
    #[must_use]
    pub const fn gateway(&self) -> Option<&GatewayError> {
        match self {
            Self::Gateway(err)
            | Self::Cart(CartError::Gateway(err))
            | Self::Checkout(CheckoutError::Session(err)) => Some(err),
            Self::Config(_) | Self::Cart(_) | Self::Checkout(_) => None,
        }
    }

    /// Whether the failure is on our side or the API's rather than the user's.
    ///
    /// Stock conflicts, missing sign-in and invalid quantities are not.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Config(_) => true,
            _ => match self.gateway() {
                Some(err) => !matches!(
                    err,
                    GatewayError::Conflict { .. }
                        | GatewayError::NotFound(_)
                        | GatewayError::Unauthorized
                ),
                None => false,
            },
        }
    }

    /// Send server-side failures to Sentry and log them.
    pub fn capture(&self) {
        if self.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        }
    }

    /// Short text safe to show to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(err) => format!("Configuration problem: {err}"),
            Self::Cart(CartError::StockConflict { product }) => {
                crate::messages::out_of_stock_message(product)
            }
            Self::Cart(CartError::InvalidQuantity(quantity)) => {
                format!("Invalid quantity: {quantity}")
            }
            Self::Checkout(CheckoutError::AuthRequired) => {
                crate::messages::LOGIN_REQUIRED.message.to_string()
            }
            Self::Checkout(CheckoutError::InProgress) => {
                crate::messages::CHECKOUT_IN_PROGRESS.message.to_string()
            }
            Self::Gateway(GatewayError::Unauthorized)
            | Self::Cart(CartError::Gateway(GatewayError::Unauthorized)) => {
                "Your session has expired. Please sign in again".to_string()
            }
            Self::Gateway(_) | Self::Cart(CartError::Gateway(_)) => {
                "The store is not reachable right now. Please try again".to_string()
            }
            Self::Checkout(CheckoutError::Session(_)) => {
                crate::messages::CHECKOUT_FAILED.message.to_string()
            }
        }
    }
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of cart and
/// checkout actions leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
