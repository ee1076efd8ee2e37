//! End-to-end online payment flow: gateway bridge, callbacks and
//! compensation, against a mocked backend.

use auric_integration_tests::TestContext;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

fn cart_body() -> serde_json::Value {
    json!({
        "lines": [{
            "id": 1,
            "product_id": 10,
            "title": "Sapphire Ring",
            "unit_price": 450,
            "quantity": 1,
        }]
    })
}

fn address_body() -> serde_json::Value {
    json!([{
        "id": 3,
        "name": "Asha Rao",
        "street": "12 MG Road",
        "city": "Bengaluru",
        "state": "Karnataka",
        "pincode": "560001",
        "country": "India",
        "phone": "9876543210",
    }])
}

fn order_body(id: u32) -> serde_json::Value {
    json!({
        "id": id,
        "user_id": 7,
        "subtotal": 450,
        "discount": 22.5,
        "delivery_cost": 150,
        "total": 577.5,
        "shipping_address": "Asha Rao, 12 MG Road, Bengaluru, Karnataka - 560001, India",
        "billing_address": "Asha Rao, 12 MG Road, Bengaluru, Karnataka - 560001, India",
        "payment_method": "online",
        "shipping_method": "BlueDart",
        "carrier_name": "BlueDart",
        "status": "pending",
        "created_at": "2026-08-27T10:00:00Z",
    })
}

/// Select an address and switch to online payment, reaching the point
/// where the order can be placed.
async fn prepare_online_checkout(ctx: &TestContext) {
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_body()))
        .mount(&ctx.backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/addresses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(address_body()))
        .mount(&ctx.backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/shipping-rates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"courier_id": 2, "courier_name": "BlueDart", "rate": 150, "etd": "3-5 days"},
        ])))
        .mount(&ctx.backend)
        .await;

    let resp = ctx
        .client
        .post(ctx.url("/api/checkout/address"))
        .json(&json!({"address_id": 3}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = ctx
        .client
        .post(ctx.url("/api/checkout/payment-method"))
        .json(&json!({"payment_method": "online"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

/// Place the online order with credentials mocked, returning the
/// placement response.
async fn place_online_order(ctx: &TestContext) -> serde_json::Value {
    Mock::given(method("POST"))
        .and(path("/orders/online"))
        .and(body_partial_json(json!({"payment_method": "online"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_body(42)))
        .mount(&ctx.backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/payments/credentials"))
        .and(body_partial_json(json!({"order_id": 42})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "razorpay_order_id": "order_abc123",
            "amount": 57750,
            "key_id": "rzp_test_key",
        })))
        .mount(&ctx.backend)
        .await;

    let resp = ctx
        .client
        .post(ctx.url("/api/checkout/order"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    resp.json().await.unwrap()
}

#[tokio::test]
async fn test_online_payment_happy_path() {
    let ctx = TestContext::new().await;
    prepare_online_checkout(&ctx).await;

    let placed = place_online_order(&ctx).await;
    assert_eq!(placed["status"], "awaiting_payment");
    assert_eq!(placed["gateway"]["key_id"], "rzp_test_key");
    assert_eq!(placed["gateway"]["gateway_order_id"], "order_abc123");
    assert_eq!(placed["gateway"]["amount"], 57750);
    assert_eq!(placed["gateway"]["prefill_name"], "Asha Rao");

    Mock::given(method("POST"))
        .and(path("/payments/verify"))
        .and(body_partial_json(json!({
            "razorpay_order_id": "order_abc123",
            "razorpay_payment_id": "pay_xyz789",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"status": "verified", "order_id": 42}),
        ))
        .expect(1)
        .mount(&ctx.backend)
        .await;

    let resp = ctx
        .client
        .post(ctx.url("/api/checkout/payment/success"))
        .json(&json!({
            "razorpay_order_id": "order_abc123",
            "razorpay_payment_id": "pay_xyz789",
            "razorpay_signature": "sig",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let outcome: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(outcome["verified"], true);
    assert_eq!(outcome["order_id"], 42);

    // The cart badge resets after completion
    let count: serde_json::Value = ctx
        .client
        .get(ctx.url("/api/cart/count"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count["count"], 0);
}

#[tokio::test]
async fn test_verification_failure_keeps_order() {
    let ctx = TestContext::new().await;
    prepare_online_checkout(&ctx).await;
    place_online_order(&ctx).await;

    Mock::given(method("POST"))
        .and(path("/payments/verify"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ctx.backend)
        .await;

    let resp = ctx
        .client
        .post(ctx.url("/api/checkout/payment/success"))
        .json(&json!({
            "razorpay_order_id": "order_abc123",
            "razorpay_payment_id": "pay_xyz789",
            "razorpay_signature": "sig",
        }))
        .send()
        .await
        .unwrap();
    // Non-fatal: the order stands, the outcome reports pending verification
    assert_eq!(resp.status(), 200);
    let outcome: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(outcome["verified"], false);
    assert_eq!(outcome["message"], "Payment received; verification pending");
}

#[tokio::test]
async fn test_cancel_reverts_order_and_restores_cart() {
    let ctx = TestContext::new().await;
    prepare_online_checkout(&ctx).await;
    place_online_order(&ctx).await;

    Mock::given(method("POST"))
        .and(path("/orders/revert"))
        .and(body_partial_json(json!({
            "order_id": 42,
            "reason": "user cancelled payment",
            "soft_delete": true,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"deleted": true, "restored_items": 1}),
        ))
        .expect(1)
        .mount(&ctx.backend)
        .await;

    let resp = ctx
        .client
        .post(ctx.url("/api/checkout/payment/cancel"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let outcome: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(outcome["reverted"], true);
    assert_eq!(outcome["restored_items"], 1);

    // The cart count refreshes from the backend after stock restoration
    let count: serde_json::Value = ctx
        .client
        .get(ctx.url("/api/cart/count"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count["count"], 1);
}

#[tokio::test]
async fn test_gateway_failure_reverts_order() {
    let ctx = TestContext::new().await;
    prepare_online_checkout(&ctx).await;
    place_online_order(&ctx).await;

    Mock::given(method("POST"))
        .and(path("/orders/revert"))
        .and(body_partial_json(json!({
            "order_id": 42,
            "reason": "payment gateway failure",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"deleted": true, "restored_items": 1}),
        ))
        .expect(1)
        .mount(&ctx.backend)
        .await;

    let resp = ctx
        .client
        .post(ctx.url("/api/checkout/payment/failure"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let outcome: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(outcome["reverted"], true);
}

#[tokio::test]
async fn test_credential_failure_compensates_immediately() {
    let ctx = TestContext::new().await;
    prepare_online_checkout(&ctx).await;

    Mock::given(method("POST"))
        .and(path("/orders/online"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_body(42)))
        .mount(&ctx.backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/payments/credentials"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ctx.backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/orders/revert"))
        .and(body_partial_json(json!({
            "order_id": 42,
            "reason": "payment gateway failure",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"deleted": true, "restored_items": 1}),
        ))
        .expect(1)
        .mount(&ctx.backend)
        .await;

    let resp = ctx
        .client
        .post(ctx.url("/api/checkout/order"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
}

#[tokio::test]
async fn test_callback_without_pending_payment_is_conflict() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .post(ctx.url("/api/checkout/payment/cancel"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
}

#[tokio::test]
async fn test_mismatched_success_callback_is_conflict() {
    let ctx = TestContext::new().await;
    prepare_online_checkout(&ctx).await;
    place_online_order(&ctx).await;

    let resp = ctx
        .client
        .post(ctx.url("/api/checkout/payment/success"))
        .json(&json!({
            "razorpay_order_id": "order_other",
            "razorpay_payment_id": "pay_xyz789",
            "razorpay_signature": "sig",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
}
