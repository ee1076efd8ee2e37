//! Checkout route handlers.
//!
//! Checkout selections live in the session; pricing is derived on every
//! read. Address and payment-method changes re-run the shipping resolver,
//! whose generation token discards stale in-flight responses.

use auric_core::{AddressId, Money, OrderId, PaymentMethod};
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use crate::backend::types::{Discount, PaymentCredentials};
use crate::checkout::compensation::{self, REASON_GATEWAY_FAILURE};
use crate::checkout::discount::{self, DiscountOutcome};
use crate::checkout::gateway::{self, PaymentFlow};
use crate::checkout::pricing::{self, OrderQuote};
use crate::checkout::shipping::RateOutcome;
use crate::checkout::submit::{self, OrderSubmission};
use crate::error::{AppError, Result};
use crate::models::{CheckoutState, session_keys};
use crate::routes::cart::record_count;
use crate::state::AppState;

/// Load the checkout state from the session, defaulting to empty.
pub(crate) async fn load_checkout(session: &Session) -> Result<CheckoutState> {
    Ok(session
        .get::<CheckoutState>(session_keys::CHECKOUT)
        .await?
        .unwrap_or_default())
}

/// Persist the checkout state to the session.
pub(crate) async fn save_checkout(session: &Session, checkout: &CheckoutState) -> Result<()> {
    session.insert(session_keys::CHECKOUT, checkout).await?;
    Ok(())
}

/// Re-run the shipping resolver for the current selections and record the
/// outcome. A superseded response leaves the state untouched.
async fn resolve_rates(
    state: &AppState,
    checkout: &mut CheckoutState,
) -> Result<RateOutcome> {
    if checkout.rate_scope == 0 {
        // Mint the per-checkout guard scope; zero marks an unassigned one
        checkout.rate_scope = Uuid::new_v4().as_u64_pair().0.max(1);
    }

    let Some(address) = checkout.address.as_ref() else {
        return Err(AppError::BadRequest("Select an address first".to_string()));
    };

    let cart = state.backend().cart().await?;
    let token = state.shipping().begin(checkout.rate_scope);
    let outcome = state
        .shipping()
        .resolve(checkout.rate_scope, token, address.id, &cart, checkout.payment_method)
        .await;

    match &outcome {
        RateOutcome::Serviceable { rates, selected } => {
            checkout.rates = rates.clone();
            checkout.rate = Some(selected.clone());
        }
        RateOutcome::NotServiceable => checkout.clear_rates(),
        RateOutcome::Superseded => {}
    }
    Ok(outcome)
}

/// Select-address request body.
#[derive(Debug, Deserialize)]
pub struct SelectAddressRequest {
    pub address_id: AddressId,
}

/// Select the shipping address and resolve rates for it.
#[instrument(skip(state, session))]
pub async fn select_address(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SelectAddressRequest>,
) -> Result<Json<RateOutcome>> {
    let addresses = state.backend().addresses().await?;
    let address = addresses
        .into_iter()
        .find(|a| a.id == request.address_id)
        .ok_or_else(|| AppError::NotFound(format!("address {}", request.address_id)))?;

    let mut checkout = load_checkout(&session).await?;
    checkout.address = Some(address);
    checkout.clear_rates();

    let outcome = resolve_rates(&state, &mut checkout).await?;
    save_checkout(&session, &checkout).await?;
    Ok(Json(outcome))
}

/// Select-payment-method request body.
#[derive(Debug, Deserialize)]
pub struct SelectPaymentMethodRequest {
    pub payment_method: PaymentMethod,
}

/// Select the payment method; couriers depend on it, so rates re-resolve.
#[instrument(skip(state, session))]
pub async fn select_payment_method(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SelectPaymentMethodRequest>,
) -> Result<Json<RateOutcome>> {
    let mut checkout = load_checkout(&session).await?;
    checkout.payment_method = request.payment_method;
    checkout.clear_rates();

    let outcome = resolve_rates(&state, &mut checkout).await?;
    save_checkout(&session, &checkout).await?;
    Ok(Json(outcome))
}

/// Re-run the rate resolver (retry after an unserviceable outcome).
#[instrument(skip(state, session))]
pub async fn refresh_rates(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<RateOutcome>> {
    let mut checkout = load_checkout(&session).await?;
    let outcome = resolve_rates(&state, &mut checkout).await?;
    save_checkout(&session, &checkout).await?;
    Ok(Json(outcome))
}

/// Apply-discount request body.
#[derive(Debug, Deserialize)]
pub struct ApplyDiscountRequest {
    pub code: String,
}

/// Discount application response.
#[derive(Debug, Serialize)]
pub struct DiscountResponse {
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Discount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Validate and apply a discount code.
///
/// A successful validation replaces any applied discount; a failure clears
/// it and surfaces the backend's message.
#[instrument(skip(state, session))]
pub async fn apply_discount(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<ApplyDiscountRequest>,
) -> Result<Json<DiscountResponse>> {
    let mut checkout = load_checkout(&session).await?;

    let response = match discount::validate(state.backend(), &request.code).await {
        DiscountOutcome::Applied(discount) => {
            checkout.discount = Some(discount.clone());
            DiscountResponse {
                applied: true,
                discount: Some(discount),
                message: None,
            }
        }
        DiscountOutcome::Rejected { message } => {
            checkout.discount = None;
            DiscountResponse {
                applied: false,
                discount: None,
                message: Some(message),
            }
        }
    };

    save_checkout(&session, &checkout).await?;
    Ok(Json(response))
}

/// Remove the applied discount.
#[instrument(skip(session))]
pub async fn remove_discount(session: Session) -> Result<Json<DiscountResponse>> {
    let mut checkout = load_checkout(&session).await?;
    checkout.discount = None;
    save_checkout(&session, &checkout).await?;
    Ok(Json(DiscountResponse {
        applied: false,
        discount: None,
        message: None,
    }))
}

/// Current order quote for the live cart and selections.
#[instrument(skip(state, session))]
pub async fn quote(State(state): State<AppState>, session: Session) -> Result<Json<OrderQuote>> {
    let checkout = load_checkout(&session).await?;
    let cart = state.backend().cart().await?;
    let quote = pricing::quote(
        &cart,
        checkout.rate.as_ref(),
        checkout.payment_method,
        checkout.discount.as_ref(),
    );
    Ok(Json(quote))
}

/// Place-order request body.
#[derive(Debug, Deserialize, Default)]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

/// Order placement status.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementStatus {
    /// COD order: done, cart cleared.
    Complete,
    /// Online order: the page must open the gateway widget.
    AwaitingPayment,
}

/// Gateway checkout material handed to the page to open the widget.
#[derive(Debug, Serialize)]
pub struct GatewayCheckout {
    pub key_id: String,
    /// Amount in minor units, as issued by the backend.
    pub amount: i64,
    pub currency: &'static str,
    pub gateway_order_id: String,
    pub prefill_name: String,
    pub prefill_contact: String,
}

/// Order placement response.
#[derive(Debug, Serialize)]
pub struct PlaceOrderResponse {
    pub order_id: OrderId,
    pub payment_method: PaymentMethod,
    pub status: PlacementStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<GatewayCheckout>,
}

fn gateway_checkout(
    state: &AppState,
    credentials: &PaymentCredentials,
    checkout: &CheckoutState,
) -> GatewayCheckout {
    let (name, contact) = checkout
        .address
        .as_ref()
        .map_or_else(Default::default, |a| (a.name.clone(), a.phone.clone()));
    GatewayCheckout {
        key_id: credentials.key_id.clone(),
        amount: credentials.amount,
        currency: state.config().currency.code(),
        gateway_order_id: credentials.razorpay_order_id.clone(),
        prefill_name: name,
        prefill_contact: contact,
    }
}

/// Place the order.
///
/// COD orders complete immediately and clear the cart. Online orders
/// create the order, request gateway credentials, and hand them to the
/// page; the cart is cleared only after the payment callback. If the
/// credentials request fails the order is compensated right away.
#[instrument(skip(state, session, request))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<Json<PlaceOrderResponse>> {
    let mut checkout = load_checkout(&session).await?;
    if request.notes.is_some() {
        checkout.notes = request.notes;
    }

    // The key outlives a failed attempt, so a resubmission after a timeout
    // reaches the backend with the same one and can be deduplicated.
    let idempotency_key = match checkout.idempotency_key {
        Some(key) => key,
        None => {
            let key = Uuid::new_v4();
            checkout.idempotency_key = Some(key);
            save_checkout(&session, &checkout).await?;
            key
        }
    };

    let cart = state.backend().cart().await?;
    let submission = OrderSubmission {
        address: checkout.address.clone(),
        rate: checkout.rate.clone(),
        payment_method: checkout.payment_method,
        discount: checkout.discount.clone(),
        notes: checkout.notes.clone(),
        idempotency_key,
    };

    let order = submit::submit_order(state.backend(), &cart, &submission).await?;
    checkout.idempotency_key = None;

    match checkout.payment_method {
        PaymentMethod::Cod => {
            // COD completes here: clear the cart and the selections
            record_count(&state, &session, 0).await?;
            state.shipping().finish(checkout.rate_scope);
            session.remove::<CheckoutState>(session_keys::CHECKOUT).await?;
            Ok(Json(PlaceOrderResponse {
                order_id: order.id,
                payment_method: PaymentMethod::Cod,
                status: PlacementStatus::Complete,
                gateway: None,
            }))
        }
        PaymentMethod::Online => {
            let flow = session
                .get::<PaymentFlow>(session_keys::PAYMENT_FLOW)
                .await?
                .unwrap_or_default();
            let flow = flow.order_created(order.id)?;
            session.insert(session_keys::PAYMENT_FLOW, &flow).await?;

            match state.backend().create_payment(order.id).await {
                Ok(credentials) => {
                    // The gateway charges what the credentials say; flag any
                    // drift from the quote or the configured key before the
                    // widget opens.
                    let expected = Money::new(order.total, state.config().currency).minor_units();
                    let drift = gateway::credential_drift(
                        &credentials,
                        expected,
                        &state.config().gateway.key_id,
                    );
                    if !drift.is_empty() {
                        tracing::warn!(
                            ?drift,
                            credential_amount = credentials.amount,
                            expected,
                            "Gateway credentials differ from local expectations"
                        );
                    }
                    let gateway = gateway_checkout(&state, &credentials, &checkout);
                    let flow = flow.gateway_opened(credentials)?;
                    session.insert(session_keys::PAYMENT_FLOW, &flow).await?;
                    save_checkout(&session, &checkout).await?;
                    Ok(Json(PlaceOrderResponse {
                        order_id: order.id,
                        payment_method: PaymentMethod::Online,
                        status: PlacementStatus::AwaitingPayment,
                        gateway: Some(gateway),
                    }))
                }
                Err(e) => {
                    // Missing credentials strand a created order; revert it
                    // before reporting the failure.
                    tracing::error!("Gateway credential request failed: {e}");
                    let outcome =
                        compensation::compensate(state.backend(), order.id, REASON_GATEWAY_FAILURE)
                            .await;
                    tracing::warn!(?outcome, "Compensated order after credential failure");
                    // The order was created (then reverted), so the spent
                    // key must not be reused by the next attempt
                    save_checkout(&session, &checkout).await?;
                    session
                        .insert(
                            session_keys::PAYMENT_FLOW,
                            &PaymentFlow::GatewayFailed { order_id: order.id },
                        )
                        .await?;
                    Err(AppError::Backend(e))
                }
            }
        }
    }
}
