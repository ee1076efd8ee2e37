//! Shipping rate resolver.
//!
//! Fetches courier options from the backend for an address / payment-method
//! combination and auto-selects one. Failures never propagate past this
//! boundary: an unserviceable address is an outcome, not an error.
//!
//! Address or payment-method changes re-invoke the resolver. Each
//! invocation takes a generation token from [`ShippingRateResolver::begin`];
//! a response whose token is no longer the latest for its checkout is
//! discarded, so a rapid sequence of changes cannot apply a stale rate
//! list. Tokens are scoped per checkout, so concurrent sessions never
//! supersede each other.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use auric_core::{AddressId, CourierId, PaymentMethod};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::backend::BackendClient;
use crate::backend::types::{CartSummary, ShippingRate, ShippingRateRequest};
use crate::checkout::{FREE_SHIPPING_THRESHOLD, ITEM_WEIGHT_KG, pricing};

/// Courier name of the synthetic free rate.
pub const FREE_EXPRESS_NAME: &str = "Free Express Delivery";

/// Estimated delivery text of the synthetic free rate.
pub const FREE_EXPRESS_ETD: &str = "5 days";

/// Result of a resolver invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RateOutcome {
    /// Couriers are available; one is auto-selected.
    Serviceable {
        rates: Vec<ShippingRate>,
        selected: ShippingRate,
    },
    /// No couriers serve this address, or the rate request failed.
    NotServiceable,
    /// A newer invocation started while this one was in flight; the
    /// response was discarded and no state should change.
    Superseded,
}

/// The synthetic zero-cost rate substituted above the free-shipping
/// threshold.
#[must_use]
pub fn free_express_rate() -> ShippingRate {
    ShippingRate {
        courier_id: CourierId::FREE_EXPRESS,
        courier_name: FREE_EXPRESS_NAME.to_string(),
        rate: Decimal::ZERO,
        etd: FREE_EXPRESS_ETD.to_string(),
    }
}

/// First minimum-price rate, ties broken by list order.
fn select_minimum(rates: &[ShippingRate]) -> Option<ShippingRate> {
    // std min_by keeps the last of equal elements; keep the first instead
    rates
        .iter()
        .fold(None::<&ShippingRate>, |best, rate| match best {
            Some(b) if b.rate <= rate.rate => Some(b),
            _ => Some(rate),
        })
        .cloned()
}

/// Resolves shipping rates with a per-checkout stale-response guard.
///
/// The resolver is shared across sessions; each checkout brings its own
/// scope key, under which generations advance independently.
pub struct ShippingRateResolver {
    backend: BackendClient,
    generations: Mutex<HashMap<u64, u64>>,
}

impl ShippingRateResolver {
    /// Create a resolver over the given backend client.
    #[must_use]
    pub fn new(backend: BackendClient) -> Self {
        Self {
            backend,
            generations: Mutex::new(HashMap::new()),
        }
    }

    fn generations(&self) -> MutexGuard<'_, HashMap<u64, u64>> {
        self.generations.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new invocation for a checkout scope, invalidating any
    /// in-flight one under the same scope.
    ///
    /// Returns the token to pass to [`Self::resolve`].
    pub fn begin(&self, scope: u64) -> u64 {
        let mut generations = self.generations();
        let token = generations.entry(scope).or_insert(0);
        *token += 1;
        *token
    }

    fn is_current(&self, scope: u64, token: u64) -> bool {
        self.generations().get(&scope) == Some(&token)
    }

    /// Drop the guard state for a completed checkout.
    pub fn finish(&self, scope: u64) {
        self.generations().remove(&scope);
    }

    /// Fetch and auto-select a rate for the cart and address.
    ///
    /// With the subtotal at or above the free-shipping threshold the
    /// backend's rates are discarded in favor of the synthetic free-express
    /// rate; otherwise the first minimum-price rate is selected. Zero rates
    /// or a failed request resolve to [`RateOutcome::NotServiceable`].
    #[instrument(skip(self, cart), fields(address_id = %address_id, payment_method = %payment_method))]
    pub async fn resolve(
        &self,
        scope: u64,
        token: u64,
        address_id: AddressId,
        cart: &CartSummary,
        payment_method: PaymentMethod,
    ) -> RateOutcome {
        let total_amount = pricing::subtotal(cart);
        let total_weight = Decimal::from(cart.item_count()) * ITEM_WEIGHT_KG;

        let request = ShippingRateRequest {
            address_id,
            total_weight,
            total_amount,
            payment_method,
        };

        let result = self.backend.shipping_rates(&request).await;

        // Anything fetched under a token that is no longer this checkout's
        // latest is dropped on the floor.
        if !self.is_current(scope, token) {
            return RateOutcome::Superseded;
        }

        match result {
            Ok(rates) if !rates.is_empty() => {
                if total_amount >= FREE_SHIPPING_THRESHOLD {
                    let free = free_express_rate();
                    RateOutcome::Serviceable {
                        rates: vec![free.clone()],
                        selected: free,
                    }
                } else {
                    // Non-empty list, so a minimum always exists
                    select_minimum(&rates).map_or(RateOutcome::NotServiceable, |selected| {
                        RateOutcome::Serviceable { rates, selected }
                    })
                }
            }
            Ok(_) => RateOutcome::NotServiceable,
            Err(e) => {
                warn!("Shipping rate request failed: {e}");
                RateOutcome::NotServiceable
            }
        }
    }
}
