//! Checkout state held in the session.
//!
//! This is the only client-local persisted state: the checkout selections,
//! the payment flow, and the last payment result. All of it is cleared on
//! successful completion or compensation; the backend owns everything
//! durable.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::types::{Address, Discount, ShippingRate};
use auric_core::PaymentMethod;

/// Session key constants.
pub mod session_keys {
    /// Current checkout selections ([`super::CheckoutState`]).
    pub const CHECKOUT: &str = "checkout";
    /// Payment flow state machine ([`crate::checkout::gateway::PaymentFlow`]).
    pub const PAYMENT_FLOW: &str = "payment_flow";
    /// Last verification outcome
    /// ([`crate::checkout::compensation::VerificationOutcome`]).
    pub const LAST_PAYMENT: &str = "last_payment";
    /// Cached cart item count for the header badge.
    pub const CART_COUNT: &str = "cart_count";
}

/// The customer's in-progress checkout selections.
///
/// Derived pricing is never stored here; it is recomputed from these
/// selections and the live cart on every read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutState {
    /// Selected shipping address, carried as the full typed record.
    pub address: Option<Address>,
    /// Auto- or user-selected shipping rate.
    pub rate: Option<ShippingRate>,
    /// Available rates from the last resolver run.
    pub rates: Vec<ShippingRate>,
    pub payment_method: PaymentMethod,
    /// Applied discount, at most one.
    pub discount: Option<Discount>,
    pub notes: Option<String>,
    /// Scope key for the rate resolver's stale-response guard, minted on
    /// the first resolution. Zero means unassigned.
    #[serde(default)]
    pub rate_scope: u64,
    /// Idempotency key for the pending order attempt; kept across retries
    /// and cleared once an order is created.
    #[serde(default)]
    pub idempotency_key: Option<Uuid>,
}

impl CheckoutState {
    /// Clear rate state after an address or payment-method change made the
    /// previous resolution stale.
    pub fn clear_rates(&mut self) {
        self.rate = None;
        self.rates.clear();
    }
}
