//! Application state shared by a front end.

use std::sync::Arc;

use crate::cart::CartStore;
use crate::checkout::CheckoutOrchestrator;
use crate::config::StorefrontConfig;
use crate::gateway::{ApiClient, GatewayError};
use crate::notify::Notifier;
use crate::ui::CheckoutLauncher;

/// Everything one storefront session needs, wired against the REST API.
///
/// This struct is cheaply cloneable via `Arc`. There is one cart store per
/// state; front ends pass the state (or the store) to whatever needs it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    cart: CartStore,
    notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Build the API client and load the cart.
    ///
    /// A failed cart load is logged and leaves the cart empty; call
    /// [`CartStore::load`] to retry.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub async fn connect(
        config: StorefrontConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, GatewayError> {
        let api = ApiClient::new(&config.api)?;
        let cart = CartStore::connect(Arc::new(api.clone()), Arc::clone(&notifier)).await;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                cart,
                notifier,
            }),
        })
    }

    /// Get a reference to the storefront API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Checkout flow for this session.
    ///
    /// The API client doubles as the auth collaborator: a configured token
    /// means the customer is signed in.
    #[must_use]
    pub fn checkout(&self, launcher: Arc<dyn CheckoutLauncher>) -> CheckoutOrchestrator {
        CheckoutOrchestrator::new(
            Arc::new(self.inner.api.clone()),
            self.inner.cart.clone(),
            Arc::clone(&self.inner.notifier),
            Arc::new(self.inner.api.clone()),
            launcher,
            self.inner.config.checkout,
        )
    }
}
