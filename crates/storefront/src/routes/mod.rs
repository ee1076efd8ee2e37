//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (backend reachable)
//!
//! # Catalog
//! GET  /api/products                - Product listing
//! GET  /api/products/{slug}         - Product detail
//! GET  /api/collections             - Collection listing
//!
//! # Cart
//! GET  /api/cart                    - Cart summary with subtotal
//! POST /api/cart/add                - Add item
//! POST /api/cart/update             - Change line quantity
//! POST /api/cart/remove             - Remove line
//! GET  /api/cart/count              - Item count badge
//!
//! # Checkout
//! POST /api/checkout/address        - Select address (resolves rates)
//! POST /api/checkout/payment-method - Select payment method (re-resolves)
//! POST /api/checkout/rates          - Re-run the rate resolver
//! POST /api/checkout/discount       - Apply a discount code
//! DELETE /api/checkout/discount     - Remove the applied discount
//! GET  /api/checkout/quote          - Current order quote
//! POST /api/checkout/order          - Place the order (COD or online)
//!
//! # Payment gateway callbacks
//! POST /api/checkout/payment/success - Widget success handler
//! POST /api/checkout/payment/cancel  - Widget dismissed
//! POST /api/checkout/payment/failure - Gateway script failed to load
//!
//! # Account
//! GET  /api/account/orders          - Order history
//! GET  /api/account/orders/{id}     - Order detail
//! GET  /api/addresses               - Saved addresses
//! POST /api/addresses               - Create address
//!
//! # Admin (bearer token)
//! GET  /api/admin/orders            - All orders
//! GET  /api/admin/orders/{id}       - Any order
//! POST /api/admin/orders/{id}/status - Change order status
//! ```

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod payment;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(catalog::index))
        .route("/products/{slug}", get(catalog::show))
        .route("/collections", get(catalog::collections))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/address", post(checkout::select_address))
        .route("/payment-method", post(checkout::select_payment_method))
        .route("/rates", post(checkout::refresh_rates))
        .route(
            "/discount",
            post(checkout::apply_discount).delete(checkout::remove_discount),
        )
        .route("/quote", get(checkout::quote))
        .route("/order", post(checkout::place_order))
        .route("/payment/success", post(payment::success))
        .route("/payment/cancel", post(payment::cancel))
        .route("/payment/failure", post(payment::failure))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order))
}

/// Create the admin routes router (token-guarded).
pub fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/orders", get(admin::orders))
        .route("/orders/{id}", get(admin::order))
        .route("/orders/{id}/status", post(admin::update_status))
        .layer(axum::middleware::from_fn_with_state(
            state,
            admin::require_admin,
        ))
}

/// Create all routes for the storefront.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/api/cart", cart_routes())
        .nest("/api/checkout", checkout_routes())
        .nest("/api/account", account_routes())
        .nest("/api/admin", admin_routes(state))
        .route(
            "/api/addresses",
            get(account::addresses).post(account::create_address),
        )
        .merge(Router::new().nest("/api", catalog_routes()))
}
