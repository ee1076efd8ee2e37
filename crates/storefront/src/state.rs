//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::{BackendClient, BackendError};
use crate::checkout::shipping::ShippingRateResolver;
use crate::config::StorefrontConfig;
use crate::services::events::CartEvents;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the backend client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: BackendClient,
    shipping: ShippingRateResolver,
    cart_events: CartEvents,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend)?;
        let shipping = ShippingRateResolver::new(backend.clone());
        let cart_events = CartEvents::new();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                shipping,
                cart_events,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the commerce backend client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Get a reference to the shipping rate resolver.
    #[must_use]
    pub fn shipping(&self) -> &ShippingRateResolver {
        &self.inner.shipping
    }

    /// Get a reference to the cart event channel.
    #[must_use]
    pub fn cart_events(&self) -> &CartEvents {
        &self.inner.cart_events
    }
}
