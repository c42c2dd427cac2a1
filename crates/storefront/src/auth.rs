//! Authentication collaborator.

use std::sync::atomic::{AtomicBool, Ordering};

/// Answers whether the current session is signed in.
pub trait AuthStatus: Send + Sync {
    fn is_authenticated(&self) -> bool;
}

/// Auth status held in a flag, for sessions that sign in and out at runtime.
#[derive(Debug, Default)]
pub struct StaticAuth(AtomicBool);

impl StaticAuth {
    #[must_use]
    pub const fn new(authenticated: bool) -> Self {
        Self(AtomicBool::new(authenticated))
    }

    pub fn set(&self, authenticated: bool) {
        self.0.store(authenticated, Ordering::SeqCst);
    }
}

impl AuthStatus for StaticAuth {
    fn is_authenticated(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_auth_toggles() {
        let auth = StaticAuth::new(false);
        assert!(!auth.is_authenticated());
        auth.set(true);
        assert!(auth.is_authenticated());
    }
}
