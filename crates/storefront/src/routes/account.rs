//! Account route handlers: order history and saved addresses.

use auric_core::OrderId;
use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::backend::types::{Address, CreateAddressRequest, Order};
use crate::error::Result;
use crate::state::AppState;

/// Order history, newest first.
#[instrument(skip(state))]
pub async fn orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>> {
    let orders = state.backend().orders().await?;
    Ok(Json(orders))
}

/// Order detail by id.
#[instrument(skip(state))]
pub async fn order(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = state.backend().order(id).await?;
    Ok(Json(order))
}

/// Saved addresses on the profile.
#[instrument(skip(state))]
pub async fn addresses(State(state): State<AppState>) -> Result<Json<Vec<Address>>> {
    let addresses = state.backend().addresses().await?;
    Ok(Json(addresses))
}

/// Save a new address.
#[instrument(skip(state, request))]
pub async fn create_address(
    State(state): State<AppState>,
    Json(request): Json<CreateAddressRequest>,
) -> Result<Json<Address>> {
    let address = state.backend().create_address(&request).await?;
    Ok(Json(address))
}
