//! REST client for the commerce backend.

use std::sync::Arc;
use std::time::Duration;

use auric_core::{OrderId, OrderStatus};
use moka::future::Cache;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::backend::BackendError;
use crate::backend::types::{
    AddCartLineRequest, Address, ApiErrorBody, CartSummary, Collection, CreateAddressRequest,
    CreateOrderRequest, CreatePaymentRequest, Discount, Order, PaymentCredentials, Product,
    RemoveCartLineRequest, RevertOrderRequest, RevertOrderResponse, ShippingRate,
    ShippingRateRequest, UpdateCartLineRequest, UpdateOrderStatusRequest,
    ValidateDiscountRequest, VerifyPaymentRequest, VerifyPaymentResponse,
};
use crate::config::BackendConfig;

/// Catalog cache TTL.
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Cached catalog values.
#[derive(Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Arc<Vec<Product>>),
    Collections(Arc<Vec<Collection>>),
}

/// Client for the commerce backend REST API.
///
/// Cheaply cloneable; catalog reads are cached for 5 minutes.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, CacheValue>,
}

impl BackendClient {
    /// Create a new backend API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build (e.g., the API
    /// token is not a valid header value).
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.api_token.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| BackendError::Parse(format!("Invalid API token format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert("Authorization", auth_header);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Convert a non-2xx response into a `BackendError`.
    async fn error_from_response(response: reqwest::Response) -> BackendError {
        let status = response.status();
        let body: Option<ApiErrorBody> = response.json().await.ok();
        let message = body.and_then(|b| b.message).unwrap_or_default();
        if status == reqwest::StatusCode::NOT_FOUND {
            return BackendError::NotFound(if message.is_empty() {
                "resource not found".to_string()
            } else {
                message
            });
        }
        BackendError::Api {
            status: status.as_u16(),
            message,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let response = self.inner.client.get(self.url(path)).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BackendError> {
        let response = self
            .inner
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List all products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, BackendError> {
        let cache_key = "products:all".to_string();
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product list");
            return Ok(products);
        }

        let products: Arc<Vec<Product>> = Arc::new(self.get_json("/products").await?);
        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(Arc::clone(&products)))
            .await;
        Ok(products)
    }

    /// Get a product by its slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn product(&self, slug: &str) -> Result<Product, BackendError> {
        let cache_key = format!("product:{slug}");
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self
            .get_json(&format!("/products/{slug}"))
            .await
            .map_err(|e| match e {
                BackendError::NotFound(_) => {
                    BackendError::NotFound(format!("Product not found: {slug}"))
                }
                other => other,
            })?;
        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// List all collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn collections(&self) -> Result<Arc<Vec<Collection>>, BackendError> {
        let cache_key = "collections:all".to_string();
        if let Some(CacheValue::Collections(collections)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for collection list");
            return Ok(collections);
        }

        let collections: Arc<Vec<Collection>> = Arc::new(self.get_json("/collections").await?);
        self.inner
            .cache
            .insert(cache_key, CacheValue::Collections(Arc::clone(&collections)))
            .await;
        Ok(collections)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Get the current cart summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn cart(&self) -> Result<CartSummary, BackendError> {
        self.get_json("/cart").await
    }

    /// Add an item to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn add_cart_line(
        &self,
        request: &AddCartLineRequest,
    ) -> Result<CartSummary, BackendError> {
        self.post_json("/cart/add", request).await
    }

    /// Change a cart line's quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn update_cart_line(
        &self,
        request: &UpdateCartLineRequest,
    ) -> Result<CartSummary, BackendError> {
        self.post_json("/cart/update", request).await
    }

    /// Remove a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn remove_cart_line(
        &self,
        request: &RemoveCartLineRequest,
    ) -> Result<CartSummary, BackendError> {
        self.post_json("/cart/remove", request).await
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// List the user's saved addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn addresses(&self) -> Result<Vec<Address>, BackendError> {
        self.get_json("/addresses").await
    }

    /// Create a new address.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, request))]
    pub async fn create_address(
        &self,
        request: &CreateAddressRequest,
    ) -> Result<Address, BackendError> {
        self.post_json("/addresses", request).await
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Fetch courier options for an address / payment-method combination.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails. Callers resolving
    /// serviceability must treat this as a degraded outcome, not a fault.
    #[instrument(skip(self), fields(address_id = %request.address_id))]
    pub async fn shipping_rates(
        &self,
        request: &ShippingRateRequest,
    ) -> Result<Vec<ShippingRate>, BackendError> {
        self.post_json("/shipping-rates", request).await
    }

    /// Validate a discount code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is invalid/expired or the request fails;
    /// the backend's message is preserved in `BackendError::Api`.
    #[instrument(skip(self))]
    pub async fn validate_discount(&self, code: &str) -> Result<Discount, BackendError> {
        let request = ValidateDiscountRequest {
            code: code.to_string(),
        };
        self.post_json("/discounts/validate", &request).await
    }

    /// Create a cash-on-delivery order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, request), fields(address_id = %request.address_id))]
    pub async fn create_cod_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<Order, BackendError> {
        self.post_json("/orders/cod", request).await
    }

    /// Create an online-payment order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, request), fields(address_id = %request.address_id))]
    pub async fn create_online_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<Order, BackendError> {
        self.post_json("/orders/online", request).await
    }

    // =========================================================================
    // Payments
    // =========================================================================

    /// Request gateway credentials for a created order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn create_payment(
        &self,
        order_id: OrderId,
    ) -> Result<PaymentCredentials, BackendError> {
        let request = CreatePaymentRequest { order_id };
        self.post_json("/payments/credentials", &request).await
    }

    /// Ask the backend to verify a payment signature.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature is rejected or the request fails.
    #[instrument(skip(self, request), fields(gateway_order = %request.razorpay_order_id))]
    pub async fn verify_payment(
        &self,
        request: &VerifyPaymentRequest,
    ) -> Result<VerifyPaymentResponse, BackendError> {
        self.post_json("/payments/verify", request).await
    }

    /// Revert and soft-delete an order, restoring cart/stock.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(order_id = %request.order_id, reason = %request.reason))]
    pub async fn revert_order(
        &self,
        request: &RevertOrderRequest,
    ) -> Result<RevertOrderResponse, BackendError> {
        self.post_json("/orders/revert", request).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// List the user's orders, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>, BackendError> {
        self.get_json("/orders").await
    }

    /// Get one of the user's orders by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or the request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn order(&self, order_id: OrderId) -> Result<Order, BackendError> {
        self.get_json(&format!("/orders/{order_id}")).await
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// List all orders (admin dashboard).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_orders(&self) -> Result<Vec<Order>, BackendError> {
        self.get_json("/admin/orders").await
    }

    /// Get any order by id (admin dashboard).
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not found or the request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn admin_order(&self, order_id: OrderId) -> Result<Order, BackendError> {
        self.get_json(&format!("/admin/orders/{order_id}")).await
    }

    /// Change an order's status (admin dashboard).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(order_id = %order_id, status = %status))]
    pub async fn admin_update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, BackendError> {
        let request = UpdateOrderStatusRequest { status };
        self.post_json(&format!("/admin/orders/{order_id}/status"), &request)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use auric_core::{AddressId, PaymentMethod};
    use rust_decimal_macros::dec;
    use secrecy::SecretString;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> BackendClient {
        let config = BackendConfig {
            base_url: server.uri(),
            api_token: SecretString::from("kJ8#mN2$pQ9@wX4!zR7&vB3*tY6^cF1%"),
        };
        BackendClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_shipping_rates_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/shipping-rates"))
            .and(body_partial_json(serde_json::json!({
                "address_id": 3,
                "payment_method": "COD",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"courier_id": 1, "courier_name": "Delhivery", "rate": 300, "etd": "4-6 days"},
                {"courier_id": 2, "courier_name": "BlueDart", "rate": 150, "etd": "3-5 days"},
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let rates = client
            .shipping_rates(&ShippingRateRequest {
                address_id: AddressId::new(3),
                total_weight: dec!(1.5),
                total_amount: dec!(450),
                payment_method: PaymentMethod::Cod,
            })
            .await
            .unwrap();

        assert_eq!(rates.len(), 2);
        assert_eq!(rates[1].rate, dec!(150));
    }

    #[tokio::test]
    async fn test_validate_discount_surfaces_backend_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/discounts/validate"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(serde_json::json!({"message": "Code has expired"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.validate_discount("OLD10").await.unwrap_err();
        assert_eq!(err.api_message(), Some("Code has expired"));
    }

    #[tokio::test]
    async fn test_product_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.product("missing").await.unwrap_err();
        assert!(matches!(err, BackendError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_products_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        client.products().await.unwrap();
        // Second call must be served from cache (mock expects exactly one hit)
        client.products().await.unwrap();
    }
}
