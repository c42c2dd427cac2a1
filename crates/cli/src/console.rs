//! Terminal implementations of the UI collaborators.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::sync::atomic::{AtomicUsize, Ordering};

use marketa_storefront::cart::CartError;
use marketa_storefront::error::AppError;
use marketa_storefront::notify::{Notification, Notifier, Severity};
use marketa_storefront::ui::{CheckoutLauncher, Stepper};

/// Checkout steps shown by [`ConsoleStepper`].
const STEPS: [&str; 3] = ["Cart", "Payment", "Order placed"];

/// Prints notifications as status lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let marker = match notification.severity {
            Severity::Success => "✓",
            Severity::Info => "i",
            Severity::Warning => "!",
            Severity::Error => "✗",
        };
        println!(
            "[{marker}] {}: {}",
            notification.title, notification.message
        );
    }
}

/// Prints the payment link instead of opening a browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintLauncher;

impl CheckoutLauncher for PrintLauncher {
    fn open(&self, checkout_url: &str) {
        println!("Complete the payment at:\n  {checkout_url}");
    }
}

/// Prints the checkout step after each advance.
#[derive(Debug, Default)]
pub struct ConsoleStepper {
    step: AtomicUsize,
}

impl ConsoleStepper {
    fn print(step: usize) {
        let label = STEPS.get(step).copied().unwrap_or("Done");
        println!("Step {}/{}: {label}", step + 1, STEPS.len());
    }
}

impl Stepper for ConsoleStepper {
    fn next(&self) {
        let step = self.step.fetch_add(1, Ordering::SeqCst) + 1;
        Self::print(step.min(STEPS.len() - 1));
    }

    fn reset(&self) {
        self.step.store(0, Ordering::SeqCst);
        Self::print(0);
    }
}

/// Report a failed command.
///
/// Stock conflicts and checkout failures have already been shown as
/// notifications.
pub fn print_error(error: &AppError) {
    match error {
        AppError::Cart(CartError::StockConflict { .. }) | AppError::Checkout(_) => {}
        AppError::Config(_) | AppError::Gateway(_) | AppError::Cart(_) => {
            eprintln!("error: {}", error.user_message());
        }
    }
}
