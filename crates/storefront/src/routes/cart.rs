//! Cart route handlers.
//!
//! The backend owns the cart; these handlers pass mutations through,
//! cache the item count in the session for the header badge, and publish
//! the new count on the cart event channel after every change.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::types::{
    AddCartLineRequest, CartSummary, RemoveCartLineRequest, UpdateCartLineRequest,
};
use crate::checkout::pricing;
use crate::error::Result;
use crate::models::session_keys;
use crate::state::AppState;

/// Cart response with derived totals.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub cart: CartSummary,
    pub item_count: u32,
    pub subtotal: Decimal,
}

impl From<CartSummary> for CartView {
    fn from(cart: CartSummary) -> Self {
        let item_count = cart.item_count();
        let subtotal = pricing::subtotal(&cart);
        Self {
            cart,
            item_count,
            subtotal,
        }
    }
}

/// Item count response for the header badge.
#[derive(Debug, Clone, Serialize)]
pub struct CartCount {
    pub count: u32,
}

/// Record a new cart count: session cache plus event channel.
pub(crate) async fn record_count(state: &AppState, session: &Session, count: u32) -> Result<()> {
    session.insert(session_keys::CART_COUNT, count).await?;
    state.cart_events().publish(count);
    Ok(())
}

/// Show the cart with derived totals.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let cart = state.backend().cart().await?;
    let view = CartView::from(cart);
    session
        .insert(session_keys::CART_COUNT, view.item_count)
        .await?;
    Ok(Json(view))
}

/// Add an item to the cart.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddCartLineRequest>,
) -> Result<Json<CartView>> {
    let cart = state.backend().add_cart_line(&request).await?;
    let view = CartView::from(cart);
    record_count(&state, &session, view.item_count).await?;
    Ok(Json(view))
}

/// Change a cart line's quantity.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<UpdateCartLineRequest>,
) -> Result<Json<CartView>> {
    let cart = state.backend().update_cart_line(&request).await?;
    let view = CartView::from(cart);
    record_count(&state, &session, view.item_count).await?;
    Ok(Json(view))
}

/// Remove a cart line.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RemoveCartLineRequest>,
) -> Result<Json<CartView>> {
    let cart = state.backend().remove_cart_line(&request).await?;
    let view = CartView::from(cart);
    record_count(&state, &session, view.item_count).await?;
    Ok(Json(view))
}

/// Item count for the header badge.
///
/// Served from the session cache when present; falls back to the backend.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<Json<CartCount>> {
    if let Some(count) = session.get::<u32>(session_keys::CART_COUNT).await? {
        return Ok(Json(CartCount { count }));
    }

    let count = match state.backend().cart().await {
        Ok(cart) => cart.item_count(),
        Err(e) => {
            tracing::warn!("Failed to fetch cart for count: {e}");
            0
        }
    };
    session.insert(session_keys::CART_COUNT, count).await?;
    Ok(Json(CartCount { count }))
}
