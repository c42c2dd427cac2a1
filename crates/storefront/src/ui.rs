//! UI collaborators driven by the checkout flow.
//!
//! The hosting front end decides what "advance a step" and "open the payment
//! page" mean. A terminal prints; a browser shell would open a window.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Step indicator of a multi-step purchase flow.
pub trait Stepper: Send + Sync {
    /// Advance to the next step.
    fn next(&self);

    /// Go back to the first step.
    fn reset(&self);
}

/// Opens the external payment page.
///
/// Fire-and-forget: the checkout flow never waits on the page.
pub trait CheckoutLauncher: Send + Sync {
    fn open(&self, checkout_url: &str);
}

/// Stepper that only tracks how far it has advanced since the last reset.
#[derive(Debug, Default)]
pub struct RecordingStepper {
    advanced: AtomicUsize,
}

impl RecordingStepper {
    #[must_use]
    pub fn advanced(&self) -> usize {
        self.advanced.load(Ordering::SeqCst)
    }
}

impl Stepper for RecordingStepper {
    fn next(&self) {
        self.advanced.fetch_add(1, Ordering::SeqCst);
    }

    fn reset(&self) {
        self.advanced.store(0, Ordering::SeqCst);
    }
}

/// Launcher that remembers every URL it was asked to open.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    opened: Mutex<Vec<String>>,
}

impl RecordingLauncher {
    #[must_use]
    pub fn opened(&self) -> Vec<String> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CheckoutLauncher for RecordingLauncher {
    fn open(&self, checkout_url: &str) {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(checkout_url.to_string());
    }
}
