//! Checkout command.

#![allow(clippy::print_stdout)]

use std::sync::Arc;

use marketa_storefront::checkout::{AbandonReason, CheckoutState};
use marketa_storefront::error::Result;
use marketa_storefront::state::AppState;
use marketa_storefront::ui::Stepper;

use crate::console::{ConsoleStepper, PrintLauncher};

/// Start a checkout and wait for the payment. Ctrl+C stops waiting.
pub async fn run(state: &AppState) -> Result<()> {
    if !state.cart().has_items() {
        println!("Your cart is empty.");
        return Ok(());
    }

    let stepper = Arc::new(ConsoleStepper::default());
    stepper.reset();

    let checkout = state.checkout(Arc::new(PrintLauncher));
    let mut poll = checkout.confirm_order(stepper).await?;
    println!("Waiting for the payment to be confirmed (Ctrl+C to stop)...");

    let finished = tokio::select! {
        outcome = poll.wait() => Some(outcome),
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            }
            None
        }
    };
    let outcome = match finished {
        Some(outcome) => outcome,
        None => {
            poll.cancel();
            poll.wait().await
        }
    };

    let session = poll.session();
    tracing::debug!(
        session_id = %session.session_id,
        status = %session.status,
        "Last payment status"
    );

    match outcome {
        CheckoutState::Confirmed => println!("Thank you for your order."),
        CheckoutState::Abandoned(AbandonReason::Cancelled) => {
            println!("Stopped waiting. Run `marketa checkout` again once you have paid.");
        }
        CheckoutState::Abandoned(reason) => tracing::info!(%reason, "Checkout abandoned"),
        other => tracing::warn!(state = ?other, "Checkout ended in an unexpected state"),
    }
    Ok(())
}
