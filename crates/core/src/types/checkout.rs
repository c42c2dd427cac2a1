//! Checkout session types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::PaymentStatus;

/// Response of the checkout start endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutStart {
    /// External payment page to open for the customer.
    pub checkout_url: String,
    /// Server-issued token correlating the payment with the cart.
    pub session_id: String,
}

/// A single checkout attempt, alive for one polling cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub session_id: String,
    pub checkout_url: String,
    pub status: PaymentStatus,
    pub started_at: DateTime<Utc>,
}

impl CheckoutSession {
    /// Open a session from a checkout start response.
    #[must_use]
    pub fn open(start: CheckoutStart) -> Self {
        Self {
            session_id: start.session_id,
            checkout_url: start.checkout_url,
            status: PaymentStatus::Pending,
            started_at: Utc::now(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_open_session_from_start_response() {
        let start: CheckoutStart = serde_json::from_str(
            r#"{ "checkout_url": "https://pay.example/cs_1", "session_id": "cs_1" }"#,
        )
        .unwrap();

        let session = CheckoutSession::open(start);
        assert_eq!(session.session_id, "cs_1");
        assert_eq!(session.checkout_url, "https://pay.example/cs_1");
        assert_eq!(session.status, PaymentStatus::Pending);
    }
}
