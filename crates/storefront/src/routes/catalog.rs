//! Catalog route handlers.
//!
//! Thin pass-through over the backend catalog endpoints; responses are
//! served from the client's moka cache when warm.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::backend::types::{Collection, Product};
use crate::error::Result;
use crate::state::AppState;

/// List all products.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.backend().products().await?;
    Ok(Json((*products).clone()))
}

/// Product detail by slug.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Product>> {
    let product = state.backend().product(&slug).await?;
    Ok(Json(product))
}

/// List all collections.
#[instrument(skip(state))]
pub async fn collections(State(state): State<AppState>) -> Result<Json<Vec<Collection>>> {
    let collections = state.backend().collections().await?;
    Ok(Json((*collections).clone()))
}
