//! Checkout Orchestrator.
//!
//! Drives one purchase attempt at a time:
//!
//! ```text
//! Idle -> AwaitingSession -> PollingPayment -> Confirmed
//!                |                   \
//!                v                    -> Abandoned(reason)
//!               Idle
//! ```
//!
//! `confirm_order` creates the payment session and opens the payment page.
//! A background task then asks for the payment status on a fixed interval
//! until the payment succeeds, fails, or the attempt is abandoned.

mod poll;

pub use poll::{PaymentPoll, PollCancel};

use std::sync::Arc;

use marketa_core::CheckoutSession;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

use crate::auth::AuthStatus;
use crate::cart::CartStore;
use crate::config::CheckoutConfig;
use crate::error::add_breadcrumb;
use crate::gateway::{CartGateway, GatewayError};
use crate::messages;
use crate::notify::{Notifier, Severity};
use crate::ui::{CheckoutLauncher, Stepper};

/// Errors returned by [`CheckoutOrchestrator::confirm_order`].
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The customer is not signed in.
    #[error("Authentication required")]
    AuthRequired,

    /// Another attempt is still waiting for its session or payment.
    #[error("A checkout is already in progress")]
    InProgress,

    /// The server refused to create a payment session.
    #[error("Checkout session could not be created: {0}")]
    Session(#[source] GatewayError),
}

/// Why an attempt ended without a confirmed payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AbandonReason {
    #[error("cancelled")]
    Cancelled,

    #[error("payment failed")]
    PaymentFailed,

    #[error("{consecutive} consecutive payment status checks failed")]
    PollErrors { consecutive: u32 },

    #[error("payment not confirmed after {attempts} checks")]
    TimedOut { attempts: u32 },
}

/// Where the current checkout attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutState {
    #[default]
    Idle,
    AwaitingSession,
    PollingPayment,
    Confirmed,
    Abandoned(AbandonReason),
}

impl CheckoutState {
    /// Whether the attempt has ended.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Abandoned(_))
    }

    /// Whether an attempt is under way and a new one must wait.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::AwaitingSession | Self::PollingPayment)
    }
}

/// Checkout flow for one storefront session.
///
/// Cheap to clone; clones share the current attempt.
#[derive(Clone)]
pub struct CheckoutOrchestrator {
    inner: Arc<CheckoutInner>,
}

struct CheckoutInner {
    gateway: Arc<dyn CartGateway>,
    cart: CartStore,
    notifier: Arc<dyn Notifier>,
    auth: Arc<dyn AuthStatus>,
    launcher: Arc<dyn CheckoutLauncher>,
    config: CheckoutConfig,
    state: watch::Sender<CheckoutState>,
}

/// Puts the state back to `Idle` unless the session was created.
struct SessionClaim<'a> {
    state: &'a watch::Sender<CheckoutState>,
    armed: bool,
}

impl Drop for SessionClaim<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.send_replace(CheckoutState::Idle);
        }
    }
}

impl CheckoutOrchestrator {
    #[must_use]
    pub fn new(
        gateway: Arc<dyn CartGateway>,
        cart: CartStore,
        notifier: Arc<dyn Notifier>,
        auth: Arc<dyn AuthStatus>,
        launcher: Arc<dyn CheckoutLauncher>,
        config: CheckoutConfig,
    ) -> Self {
        let (state, _) = watch::channel(CheckoutState::Idle);
        Self {
            inner: Arc::new(CheckoutInner {
                gateway,
                cart,
                notifier,
                auth,
                launcher,
                config,
                state,
            }),
        }
    }

    /// Current state of the latest attempt.
    #[must_use]
    pub fn state(&self) -> CheckoutState {
        *self.inner.state.borrow()
    }

    /// Follow state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CheckoutState> {
        self.inner.state.subscribe()
    }

    /// Start a checkout attempt.
    ///
    /// Creates the payment session, opens the payment page and starts polling
    /// for the payment status. On a confirmed payment the cart is cleared and
    /// `stepper` advances one step.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::AuthRequired`] if the customer is not signed in. No
    ///   request is made.
    /// - [`CheckoutError::InProgress`] if an attempt is already under way.
    /// - [`CheckoutError::Session`] if the server refused the session.
    ///
    /// Each case has already been reported to the notifier.
    #[instrument(skip_all)]
    pub async fn confirm_order(
        &self,
        stepper: Arc<dyn Stepper>,
    ) -> Result<PaymentPoll, CheckoutError> {
        let inner = &self.inner;

        if !inner.auth.is_authenticated() {
            warn!("Checkout attempted without signing in");
            inner
                .notifier
                .show(Severity::Warning, &messages::LOGIN_REQUIRED);
            return Err(CheckoutError::AuthRequired);
        }

        let claimed = inner.state.send_if_modified(|state| {
            if state.is_active() {
                false
            } else {
                *state = CheckoutState::AwaitingSession;
                true
            }
        });
        if !claimed {
            warn!("Checkout already in progress");
            inner
                .notifier
                .show(Severity::Warning, &messages::CHECKOUT_IN_PROGRESS);
            return Err(CheckoutError::InProgress);
        }

        let mut claim = SessionClaim {
            state: &inner.state,
            armed: true,
        };
        add_breadcrumb("checkout", "Confirm order", None);

        let start = match inner.gateway.start_checkout().await {
            Ok(start) => start,
            Err(e) => {
                error!(error = %e, "Failed to create checkout session");
                inner
                    .notifier
                    .show(Severity::Error, &messages::CHECKOUT_FAILED);
                return Err(CheckoutError::Session(e));
            }
        };

        let session = CheckoutSession::open(start);
        info!(session_id = %session.session_id, "Checkout session created");

        inner.launcher.open(&session.checkout_url);
        claim.armed = false;
        inner.state.send_replace(CheckoutState::PollingPayment);

        Ok(PaymentPoll::spawn(self.clone(), session, stepper))
    }
}
