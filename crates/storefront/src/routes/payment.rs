//! Payment gateway callback handlers.
//!
//! The hosted widget calls back into these three endpoints. Every callback
//! is checked against the session's [`PaymentFlow`] before it acts, so a
//! replayed or mismatched callback cannot verify or revert the wrong order.

use axum::{Json, extract::State};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::types::VerifyPaymentRequest;
use crate::checkout::compensation::{
    self, CompensationOutcome, REASON_GATEWAY_FAILURE, REASON_USER_CANCELLED, VerificationOutcome,
};
use crate::checkout::gateway::{FlowError, PaymentFlow};
use crate::error::{AppError, Result};
use crate::models::{CheckoutState, session_keys};
use crate::routes::cart::record_count;
use crate::state::AppState;

async fn load_flow(session: &Session) -> Result<PaymentFlow> {
    Ok(session
        .get::<PaymentFlow>(session_keys::PAYMENT_FLOW)
        .await?
        .unwrap_or_default())
}

/// Clear checkout selections and the cart count after a completed payment.
async fn finish_checkout(state: &AppState, session: &Session) -> Result<()> {
    record_count(state, session, 0).await?;
    if let Some(checkout) = session
        .remove::<CheckoutState>(session_keys::CHECKOUT)
        .await?
    {
        state.shipping().finish(checkout.rate_scope);
    }
    Ok(())
}

/// Refresh the session cart count from the backend after a compensating
/// revert restored stock. Best effort.
async fn refresh_cart_count(state: &AppState, session: &Session) -> Result<()> {
    match state.backend().cart().await {
        Ok(cart) => record_count(state, session, cart.item_count()).await,
        Err(e) => {
            tracing::warn!("Failed to refresh cart after revert: {e}");
            Ok(())
        }
    }
}

/// Response for the success callback.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    #[serde(flatten)]
    pub outcome: VerificationOutcome,
}

/// Widget success callback: verify the signature and complete checkout.
///
/// Verification failure is non-fatal; the order stands and the recorded
/// outcome carries the pending-verification message.
#[instrument(skip(state, session, callback))]
pub async fn success(
    State(state): State<AppState>,
    session: Session,
    Json(callback): Json<VerifyPaymentRequest>,
) -> Result<Json<SuccessResponse>> {
    let flow = load_flow(&session).await?;
    let order_id = flow
        .order_id()
        .ok_or(AppError::Flow(FlowError::NoPendingPayment))?;
    let flow = flow.payment_succeeded(&callback.razorpay_order_id)?;

    let outcome = compensation::verify_payment(state.backend(), order_id, &callback).await;

    session.insert(session_keys::PAYMENT_FLOW, &flow).await?;
    session
        .insert(session_keys::LAST_PAYMENT, &outcome)
        .await?;
    finish_checkout(&state, &session).await?;

    Ok(Json(SuccessResponse { outcome }))
}

/// Response for the cancel and failure callbacks.
#[derive(Debug, Serialize)]
pub struct CompensationResponse {
    pub reverted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restored_items: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<CompensationOutcome> for CompensationResponse {
    fn from(outcome: CompensationOutcome) -> Self {
        match outcome {
            CompensationOutcome::Reverted { restored_items } => Self {
                reverted: true,
                restored_items: Some(restored_items),
                message: None,
            },
            CompensationOutcome::Failed { message } => Self {
                reverted: false,
                restored_items: None,
                message: Some(message),
            },
        }
    }
}

async fn compensate_pending(
    state: &AppState,
    session: &Session,
    flow: PaymentFlow,
    reason: &str,
) -> Result<Json<CompensationResponse>> {
    let order_id = flow
        .order_id()
        .ok_or(AppError::Flow(FlowError::NoPendingPayment))?;

    let outcome = compensation::compensate(state.backend(), order_id, reason).await;

    session.insert(session_keys::PAYMENT_FLOW, &flow).await?;
    session
        .remove::<VerificationOutcome>(session_keys::LAST_PAYMENT)
        .await?;
    // Stock came back with the revert, so the cart count changes too.
    refresh_cart_count(state, session).await?;

    Ok(Json(outcome.into()))
}

/// Widget dismissed: revert the order and restore the cart.
#[instrument(skip(state, session))]
pub async fn cancel(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CompensationResponse>> {
    let flow = load_flow(&session).await?;
    let flow = flow.payment_cancelled()?;
    compensate_pending(&state, &session, flow, REASON_USER_CANCELLED).await
}

/// Gateway script failed to load: revert the order.
#[instrument(skip(state, session))]
pub async fn failure(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CompensationResponse>> {
    let flow = load_flow(&session).await?;
    let flow = flow.gateway_failed()?;
    compensate_pending(&state, &session, flow, REASON_GATEWAY_FAILURE).await
}
