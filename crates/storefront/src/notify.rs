//! Notification sink.
//!
//! Outcome events for the user (toasts, status lines). The cart store and the
//! checkout flow only ever talk to [`Notifier`]; how a notification is shown
//! is up to the front end.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::messages::{self, Message};

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// A single user-facing outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Receives outcome events.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    fn show_success(&self, title: &str, message: &str) {
        self.notify(Notification::new(Severity::Success, title, message));
    }

    fn show_error(&self, title: &str, message: &str) {
        self.notify(Notification::new(Severity::Error, title, message));
    }

    fn show_warning(&self, title: &str, message: &str) {
        self.notify(Notification::new(Severity::Warning, title, message));
    }

    fn show_info(&self, title: &str, message: &str) {
        self.notify(Notification::new(Severity::Info, title, message));
    }

    /// Show one of the fixed messages.
    fn show(&self, severity: Severity, message: &Message) {
        self.notify(Notification::new(severity, message.title, message.message));
    }

    /// Warn that the requested quantity of a product exceeds its stock.
    fn show_out_of_stock(&self, product_name: &str) {
        self.show_warning(
            messages::OUT_OF_STOCK_TITLE,
            &messages::out_of_stock_message(product_name),
        );
    }
}

/// Writes notifications to the log at a level matching their severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        let Notification {
            severity,
            title,
            message,
        } = notification;

        match severity {
            Severity::Success | Severity::Info => {
                tracing::info!(%severity, %title, %message, "Notification");
            }
            Severity::Warning => tracing::warn!(%title, %message, "Notification"),
            Severity::Error => tracing::error!(%title, %message, "Notification"),
        }
    }
}

/// Keeps notifications in memory until drained.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    log: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drain every notification recorded so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.log())
    }

    /// Copy of every notification recorded so far.
    #[must_use]
    pub fn all(&self) -> Vec<Notification> {
        self.log().clone()
    }

    /// Number of recorded notifications with the given severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.log()
            .iter()
            .filter(|n| n.severity == severity)
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log().is_empty()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.log().push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_take_drains() {
        let notifier = RecordingNotifier::new();
        notifier.show(Severity::Info, &messages::REMOVED);
        notifier.show_out_of_stock("Mouse");

        assert_eq!(notifier.count(Severity::Warning), 1);

        let drained = notifier.take();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].title, "Product removed");
        assert_eq!(drained[1].title, "Out of stock");
        assert!(drained[1].message.contains("Mouse"));
        assert!(notifier.is_empty());
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Warning.to_string(), "warning");
    }
}
