//! Checkout orchestration: pricing, shipping resolution, discount
//! validation, order submission, and the payment-gateway flow.
//!
//! Everything here coordinates the commerce backend and the payment
//! gateway; none of it owns durable state. The pricing calculator is pure,
//! the shipping resolver guards against stale in-flight responses with a
//! generation token, and the gateway flow is an explicit state machine
//! persisted in the session.

pub mod compensation;
pub mod discount;
pub mod gateway;
pub mod pricing;
pub mod shipping;
pub mod submit;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

use crate::backend::BackendError;

/// Subtotal at or above which shipping is free and the synthetic
/// free-express rate replaces all courier options.
pub const FREE_SHIPPING_THRESHOLD: Decimal = dec!(599);

/// Discount applied to the subtotal when paying online.
pub const ONLINE_PAYMENT_DISCOUNT_RATE: Decimal = dec!(0.05);

/// Fixed per-item shipment weight in kilograms.
pub const ITEM_WEIGHT_KG: Decimal = dec!(0.5);

/// Errors from checkout orchestration.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No shipping address has been selected.
    #[error("No shipping address selected")]
    NoAddress,

    /// No shipping rate has been selected (address may be unserviceable).
    #[error("No shipping rate selected")]
    NoShippingRate,

    /// The cart has no items.
    #[error("Cart is empty")]
    EmptyCart,

    /// A backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl CheckoutError {
    /// True for precondition failures caught before any network call.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::NoAddress | Self::NoShippingRate | Self::EmptyCart)
    }
}
