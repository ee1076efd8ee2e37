//! Order submission orchestrator.
//!
//! Validates checkout preconditions, builds the order payload, and
//! dispatches to exactly one of the backend's two order endpoints based on
//! the payment choice. Precondition failures are caught before any network
//! call is made.

use auric_core::PaymentMethod;
use rust_decimal::Decimal;
use tracing::instrument;
use uuid::Uuid;

use crate::backend::BackendClient;
use crate::backend::types::{Address, CartSummary, CreateOrderRequest, Discount, Order, ShippingRate};
use crate::checkout::{CheckoutError, FREE_SHIPPING_THRESHOLD, pricing};

/// The customer's confirmed checkout selections.
#[derive(Debug, Clone)]
pub struct OrderSubmission {
    pub address: Option<Address>,
    pub rate: Option<ShippingRate>,
    pub payment_method: PaymentMethod,
    pub discount: Option<Discount>,
    pub notes: Option<String>,
    /// Minted once per checkout attempt and reused on resubmission, so the
    /// backend can deduplicate a retry after a timeout.
    pub idempotency_key: Uuid,
}

/// Build the order payload from validated selections.
fn build_payload(
    address: &Address,
    rate: &ShippingRate,
    submission: &OrderSubmission,
    subtotal: Decimal,
) -> CreateOrderRequest {
    let delivery_cost = if subtotal >= FREE_SHIPPING_THRESHOLD {
        Decimal::ZERO
    } else {
        rate.rate
    };
    let formatted = address.formatted();

    CreateOrderRequest {
        address_id: address.id,
        shipping_address: formatted.clone(),
        billing_address: formatted,
        payment_method: submission.payment_method,
        shipping_method: rate.courier_name.clone(),
        carrier_name: rate.courier_name.clone(),
        delivery_option: rate.courier_name.clone(),
        delivery_cost,
        discount_code: submission.discount.as_ref().map(|d| d.code.clone()),
        notes: submission
            .notes
            .as_ref()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        idempotency_key: submission.idempotency_key,
    }
}

/// Submit the order to the backend.
///
/// Dispatches to the COD endpoint for cash on delivery and the online
/// endpoint otherwise. The returned order carries the backend-assigned id;
/// nothing is committed client-side on failure.
///
/// # Errors
///
/// Returns a validation error (no address, no rate, empty cart) before any
/// network call, or a backend error from the order endpoint.
#[instrument(skip(backend, cart, submission), fields(payment_method = %submission.payment_method))]
pub async fn submit_order(
    backend: &BackendClient,
    cart: &CartSummary,
    submission: &OrderSubmission,
) -> Result<Order, CheckoutError> {
    let address = submission.address.as_ref().ok_or(CheckoutError::NoAddress)?;
    let rate = submission
        .rate
        .as_ref()
        .ok_or(CheckoutError::NoShippingRate)?;
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let subtotal = pricing::subtotal(cart);
    let payload = build_payload(address, rate, submission, subtotal);

    let order = match submission.payment_method {
        PaymentMethod::Cod => backend.create_cod_order(&payload).await?,
        PaymentMethod::Online => backend.create_online_order(&payload).await?,
    };

    tracing::info!(order_id = %order.id, "Order created");
    Ok(order)
}
