//! Admin order dashboard handlers, guarded by a bearer token.

use auric_core::OrderId;
use axum::{
    Json,
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::backend::types::{Order, UpdateOrderStatusRequest};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Middleware requiring the admin bearer token on every admin route.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let token = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token {
        Some(token) if token == state.config().admin_token.expose_secret() => {
            Ok(next.run(request).await)
        }
        _ => {
            tracing::warn!("Rejected admin request with missing or invalid token");
            Err(AppError::Unauthorized(
                "missing or invalid admin token".to_string(),
            ))
        }
    }
}

/// All orders across customers.
#[instrument(skip(state))]
pub async fn orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>> {
    let orders = state.backend().admin_orders().await?;
    Ok(Json(orders))
}

/// Any order by id.
#[instrument(skip(state))]
pub async fn order(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = state.backend().admin_order(id).await?;
    Ok(Json(order))
}

/// Change an order's fulfilment status.
#[instrument(skip(state))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<Json<Order>> {
    let order = state
        .backend()
        .admin_update_order_status(id, request.status)
        .await?;
    Ok(Json(order))
}
