//! Payment confirmation polling.

use std::sync::Arc;

use marketa_core::{CheckoutSession, PaymentStatus};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info, instrument, warn};

use super::{AbandonReason, CheckoutOrchestrator, CheckoutState};
use crate::messages;
use crate::notify::Severity;
use crate::ui::Stepper;

/// Cancellation signal shared by a poll task and its handle.
///
/// Only the first `cancel` takes effect.
#[derive(Debug, Clone)]
pub struct PollCancel {
    tx: Arc<watch::Sender<bool>>,
}

impl PollCancel {
    fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Cancel the poll. Returns `true` only for the call that cancelled it.
    pub fn cancel(&self) -> bool {
        self.tx.send_if_modified(|cancelled| {
            if *cancelled {
                false
            } else {
                *cancelled = true;
                true
            }
        })
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the poll has been cancelled.
    async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so this only returns once cancelled
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Handle to a running payment poll.
///
/// Dropping the handle cancels the poll.
#[derive(Debug)]
pub struct PaymentPoll {
    session: watch::Receiver<CheckoutSession>,
    cancel: PollCancel,
    task: Option<JoinHandle<CheckoutState>>,
    outcome: Option<CheckoutState>,
}

impl PaymentPoll {
    pub(super) fn spawn(
        checkout: CheckoutOrchestrator,
        session: CheckoutSession,
        stepper: Arc<dyn Stepper>,
    ) -> Self {
        let cancel = PollCancel::new();
        let session_id = session.session_id.clone();
        let (session_tx, session) = watch::channel(session);
        let task = tokio::spawn(run(
            checkout,
            session_id,
            session_tx,
            cancel.clone(),
            stepper,
        ));

        Self {
            session,
            cancel,
            task: Some(task),
            outcome: None,
        }
    }

    /// The session being polled, with the last payment status the server
    /// reported.
    #[must_use]
    pub fn session(&self) -> CheckoutSession {
        self.session.borrow().clone()
    }

    /// Stop polling. Returns `true` only for the call that stopped it; once the
    /// payment has been confirmed this always returns `false`.
    pub fn cancel(&self) -> bool {
        let cancelled = self.cancel.cancel();
        if cancelled {
            info!(session_id = %self.session.borrow().session_id, "Payment poll cancelled");
        }
        cancelled
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for the attempt to end and return its final state.
    pub async fn wait(&mut self) -> CheckoutState {
        if let Some(task) = self.task.as_mut() {
            let outcome = task.await.unwrap_or_else(|e| {
                error!(error = %e, "Payment poll task failed");
                CheckoutState::Abandoned(AbandonReason::Cancelled)
            });
            self.task = None;
            self.outcome = Some(outcome);
        }

        self.outcome
            .unwrap_or(CheckoutState::Abandoned(AbandonReason::Cancelled))
    }
}

impl Drop for PaymentPoll {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Poll until the payment reaches a terminal state or the poll is cancelled.
///
/// Ticks are sequential: the next tick is only awaited after the previous
/// request has completed.
#[instrument(skip(checkout, session, cancel, stepper))]
async fn run(
    checkout: CheckoutOrchestrator,
    session_id: String,
    session: watch::Sender<CheckoutSession>,
    cancel: PollCancel,
    stepper: Arc<dyn Stepper>,
) -> CheckoutState {
    let inner = &checkout.inner;
    let config = inner.config;
    let mut ticker = interval_at(Instant::now() + config.poll_interval, config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut attempts: u32 = 0;
    let mut consecutive_errors: u32 = 0;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return abandon(&checkout, &cancel, AbandonReason::Cancelled),
            _ = ticker.tick() => {}
        }

        attempts += 1;
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => return abandon(&checkout, &cancel, AbandonReason::Cancelled),
            result = inner.gateway.confirm_payment(&session_id) => result,
        };

        match result {
            Ok(status) => {
                consecutive_errors = 0;
                session.send_if_modified(|current| {
                    let changed = current.status != status;
                    current.status = status;
                    changed
                });

                if status.is_terminal() {
                    return if status == PaymentStatus::Success {
                        confirm(&checkout, &cancel, stepper.as_ref()).await
                    } else {
                        abandon(&checkout, &cancel, AbandonReason::PaymentFailed)
                    };
                }

                if status == PaymentStatus::Unknown {
                    warn!(attempts, "Unrecognised payment status, still polling");
                } else {
                    debug!(attempts, %status, "Payment not completed yet");
                }
            }
            Err(e) => {
                consecutive_errors += 1;
                warn!(
                    error = %e,
                    attempts,
                    consecutive_errors,
                    "Payment status check failed"
                );
                if config
                    .max_poll_errors
                    .is_some_and(|max| consecutive_errors >= max)
                {
                    return abandon(
                        &checkout,
                        &cancel,
                        AbandonReason::PollErrors {
                            consecutive: consecutive_errors,
                        },
                    );
                }
            }
        }

        if config
            .max_poll_attempts
            .is_some_and(|max| attempts >= max)
        {
            return abandon(&checkout, &cancel, AbandonReason::TimedOut { attempts });
        }
    }
}

/// Finalise a paid order.
async fn confirm(
    checkout: &CheckoutOrchestrator,
    cancel: &PollCancel,
    stepper: &dyn Stepper,
) -> CheckoutState {
    // Stop polling before anything else so the order is finalised at most once
    if !cancel.cancel() {
        warn!("Payment confirmed after the poll was cancelled, not finalising");
        return finish(checkout, CheckoutState::Abandoned(AbandonReason::Cancelled));
    }

    let inner = &checkout.inner;
    info!("Payment confirmed");
    inner
        .notifier
        .show(Severity::Success, &messages::PAYMENT_CONFIRMED);

    if let Err(e) = inner.cart.clear_cart().await {
        warn!(error = %e, "Cart could not be cleared after payment");
    }

    stepper.next();
    finish(checkout, CheckoutState::Confirmed)
}

fn abandon(
    checkout: &CheckoutOrchestrator,
    cancel: &PollCancel,
    reason: AbandonReason,
) -> CheckoutState {
    cancel.cancel();
    let notifier = &checkout.inner.notifier;

    match reason {
        AbandonReason::Cancelled => debug!("Payment poll stopped"),
        AbandonReason::PaymentFailed => {
            warn!("Payment failed");
            notifier.show(Severity::Error, &messages::PAYMENT_FAILED);
        }
        AbandonReason::PollErrors { .. } => {
            error!(%reason, "Giving up on payment status");
            notifier.show(Severity::Error, &messages::PAYMENT_STATUS_UNAVAILABLE);
        }
        AbandonReason::TimedOut { .. } => {
            warn!(%reason, "Giving up on payment status");
            notifier.show(Severity::Warning, &messages::PAYMENT_TIMEOUT);
        }
    }

    finish(checkout, CheckoutState::Abandoned(reason))
}

fn finish(checkout: &CheckoutOrchestrator, state: CheckoutState) -> CheckoutState {
    checkout.inner.state.send_replace(state);
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancel_only_once() {
        let cancel = PollCancel::new();
        let other = cancel.clone();

        assert!(!other.is_cancelled());
        assert!(cancel.cancel());
        assert!(!other.cancel());
        assert!(other.is_cancelled());

        // Resolves immediately once cancelled
        other.cancelled().await;
    }
}
