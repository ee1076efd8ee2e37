//! Wire types for the commerce backend REST API.
//!
//! Field names match the backend's JSON contract exactly; renames here are
//! breaking changes. The backend is the source of truth for all of these,
//! and the storefront never persists them locally.

use auric_core::{
    AddressId, AddressKind, CartLineId, CourierId, DiscountKind, OrderId, OrderStatus,
    PaymentMethod, ProductId, UserId,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Catalog
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// URL-safe identifier used in storefront routes.
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    /// Sale price, when the product is discounted.
    #[serde(default)]
    pub discounted_price: Option<Decimal>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub in_stock: bool,
}

/// A named grouping of products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

// =============================================================================
// Cart
// =============================================================================

/// One line in the customer's cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub product_id: ProductId,
    pub title: String,
    /// Regular unit price.
    pub unit_price: Decimal,
    /// Discounted unit price, when the item is on sale. Pricing prefers
    /// this over `unit_price` when present.
    #[serde(default)]
    pub discounted_unit_price: Option<Decimal>,
    pub quantity: u32,
}

/// The customer's cart as returned by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartSummary {
    #[serde(default)]
    pub lines: Vec<CartLine>,
}

impl CartSummary {
    /// Total number of items across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// True when the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Request body for adding an item to the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCartLineRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Request body for changing a cart line's quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCartLineRequest {
    pub line_id: CartLineId,
    pub quantity: u32,
}

/// Request body for removing a cart line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveCartLineRequest {
    pub line_id: CartLineId,
}

// =============================================================================
// Addresses
// =============================================================================

/// A saved shipping address on the user profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
    pub phone: String,
    #[serde(default)]
    pub kind: AddressKind,
    #[serde(default)]
    pub is_default: bool,
}

impl Address {
    /// Single-line address string used in order payloads.
    #[must_use]
    pub fn formatted(&self) -> String {
        format!(
            "{}, {}, {}, {} - {}, {}",
            self.name, self.street, self.city, self.state, self.pincode, self.country
        )
    }
}

/// Request body for creating an address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAddressRequest {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
    pub phone: String,
    #[serde(default)]
    pub kind: AddressKind,
    #[serde(default)]
    pub is_default: bool,
}

// =============================================================================
// Shipping rates
// =============================================================================

/// Request body for the backend shipping-rate endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingRateRequest {
    pub address_id: AddressId,
    /// Total shipment weight in kilograms.
    pub total_weight: Decimal,
    /// Order subtotal, used by couriers for COD limits.
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
}

/// One courier option returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRate {
    pub courier_id: CourierId,
    pub courier_name: String,
    pub rate: Decimal,
    /// Estimated delivery text (e.g., "3-5 days").
    pub etd: String,
}

// =============================================================================
// Discounts
// =============================================================================

/// A validated discount code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    pub code: String,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    pub value: Decimal,
}

/// Request body for discount validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateDiscountRequest {
    pub code: String,
}

// =============================================================================
// Orders
// =============================================================================

/// Order creation payload sent to the COD and online order endpoints.
///
/// The chosen courier name is used redundantly as `shipping_method`,
/// `carrier_name` and `delivery_option`; the backend contract predates the
/// storefront and all three fields are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub address_id: AddressId,
    pub shipping_address: String,
    pub billing_address: String,
    pub payment_method: PaymentMethod,
    pub shipping_method: String,
    pub carrier_name: String,
    pub delivery_option: String,
    pub delivery_cost: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Client-generated key; the backend deduplicates retried submissions.
    pub idempotency_key: uuid::Uuid,
}

/// A line item on a placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub title: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

/// A placed order as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub delivery_cost: Decimal,
    pub total: Decimal,
    pub shipping_address: String,
    pub billing_address: String,
    pub payment_method: PaymentMethod,
    pub shipping_method: String,
    pub carrier_name: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: OrderStatus,
    #[serde(default)]
    pub return_requested: bool,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
}

/// Admin request to change an order's status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

// =============================================================================
// Payments
// =============================================================================

/// Request body for creating gateway credentials for an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    pub order_id: OrderId,
}

/// Server-issued gateway credentials.
///
/// Held in the session only between order creation and the gateway
/// callback; purged on completion or compensation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCredentials {
    pub razorpay_order_id: String,
    /// Amount in the currency's minor unit (paise).
    pub amount: i64,
    pub key_id: String,
}

/// Signature material posted by the gateway's success callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

/// Backend verdict on a payment signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentResponse {
    pub status: String,
    pub order_id: OrderId,
}

/// Request body for the compensating revert-and-delete endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevertOrderRequest {
    pub order_id: OrderId,
    pub reason: String,
    pub soft_delete: bool,
}

/// Result of a compensating revert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevertOrderResponse {
    pub deleted: bool,
    #[serde(default)]
    pub restored_items: u32,
}

// =============================================================================
// Errors
// =============================================================================

/// Error body the backend returns on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_address_formatted() {
        let address = Address {
            id: AddressId::new(3),
            name: "Asha Rao".to_string(),
            street: "12 MG Road".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            pincode: "560001".to_string(),
            country: "India".to_string(),
            phone: "9876543210".to_string(),
            kind: AddressKind::Home,
            is_default: true,
        };
        assert_eq!(
            address.formatted(),
            "Asha Rao, 12 MG Road, Bengaluru, Karnataka - 560001, India"
        );
    }

    #[test]
    fn test_cart_item_count() {
        let cart = CartSummary {
            lines: vec![
                CartLine {
                    id: CartLineId::new(1),
                    product_id: ProductId::new(10),
                    title: "Gold Stud Earrings".to_string(),
                    unit_price: dec!(1200),
                    discounted_unit_price: None,
                    quantity: 2,
                },
                CartLine {
                    id: CartLineId::new(2),
                    product_id: ProductId::new(11),
                    title: "Silver Anklet".to_string(),
                    unit_price: dec!(450),
                    discounted_unit_price: Some(dec!(399)),
                    quantity: 1,
                },
            ],
        };
        assert_eq!(cart.item_count(), 3);
        assert!(!cart.is_empty());
        assert!(CartSummary::default().is_empty());
    }

    #[test]
    fn test_discount_wire_shape() {
        let json = r#"{"code":"SAVE10","type":"percentage","value":10}"#;
        let discount: Discount = serde_json::from_str(json).unwrap();
        assert_eq!(discount.code, "SAVE10");
        assert_eq!(discount.kind, DiscountKind::Percentage);
        assert_eq!(discount.value, dec!(10));
    }

    #[test]
    fn test_shipping_rate_wire_shape() {
        let json = r#"[{"courier_id":2,"courier_name":"BlueDart","rate":150,"etd":"3-5 days"}]"#;
        let rates: Vec<ShippingRate> = serde_json::from_str(json).unwrap();
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].courier_id, CourierId::new(2));
        assert_eq!(rates[0].rate, dec!(150));
    }

    #[test]
    fn test_create_order_request_skips_empty_optionals() {
        let req = CreateOrderRequest {
            address_id: AddressId::new(1),
            shipping_address: "a".to_string(),
            billing_address: "a".to_string(),
            payment_method: PaymentMethod::Cod,
            shipping_method: "BlueDart".to_string(),
            carrier_name: "BlueDart".to_string(),
            delivery_option: "BlueDart".to_string(),
            delivery_cost: dec!(0),
            discount_code: None,
            notes: None,
            idempotency_key: uuid::Uuid::nil(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("discount_code").is_none());
        assert!(json.get("notes").is_none());
        assert_eq!(json["payment_method"], "COD");
    }
}
