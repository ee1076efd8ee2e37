//! Payment verification and compensating revert.
//!
//! Verification runs after the widget's success callback. A verification
//! failure does not revert the order: the charge already happened and is
//! trusted over the verification endpoint's availability; only the
//! displayed trust state changes.
//!
//! Compensation runs when the widget is dismissed or the gateway fails to
//! load. The invariant: an order must never remain charged-but-uncommitted
//! on the backend after an abandoned payment, so these paths always attempt
//! a revert. A failed revert is surfaced once (contact support) and not
//! retried.

use auric_core::OrderId;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::backend::BackendClient;
use crate::backend::types::{RevertOrderRequest, VerifyPaymentRequest};

/// Reason string sent with a revert after widget dismissal.
pub const REASON_USER_CANCELLED: &str = "user cancelled payment";

/// Reason string sent with a revert after a gateway load failure.
pub const REASON_GATEWAY_FAILURE: &str = "payment gateway failure";

/// Message shown when a compensating revert itself fails.
const COMPENSATION_FAILED: &str =
    "We could not cancel your order automatically. Please contact support.";

/// Recorded result of a verification attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub order_id: OrderId,
    /// Whether the backend confirmed the signature.
    pub verified: bool,
    pub message: String,
}

/// Result of a compensating revert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompensationOutcome {
    /// The order was reverted and stock restored.
    Reverted { restored_items: u32 },
    /// The revert failed; the customer is directed to support.
    Failed { message: String },
}

/// Verify a successful payment with the backend.
///
/// Never returns an error: the order is placed regardless of the
/// verification outcome, which only affects the recorded trust state.
#[instrument(skip(backend, callback), fields(order_id = %order_id))]
pub async fn verify_payment(
    backend: &BackendClient,
    order_id: OrderId,
    callback: &VerifyPaymentRequest,
) -> VerificationOutcome {
    match backend.verify_payment(callback).await {
        Ok(response) => VerificationOutcome {
            order_id: response.order_id,
            verified: true,
            message: "Payment verified".to_string(),
        },
        Err(e) => {
            tracing::warn!("Payment verification failed for order {order_id}: {e}");
            VerificationOutcome {
                order_id,
                verified: false,
                message: e
                    .api_message()
                    .unwrap_or("Payment received; verification pending")
                    .to_string(),
            }
        }
    }
}

/// Revert and soft-delete an abandoned order.
#[instrument(skip(backend), fields(order_id = %order_id, reason = %reason))]
pub async fn compensate(
    backend: &BackendClient,
    order_id: OrderId,
    reason: &str,
) -> CompensationOutcome {
    let request = RevertOrderRequest {
        order_id,
        reason: reason.to_string(),
        soft_delete: true,
    };

    match backend.revert_order(&request).await {
        Ok(response) if response.deleted => {
            tracing::info!(
                restored_items = response.restored_items,
                "Order reverted after abandoned payment"
            );
            CompensationOutcome::Reverted {
                restored_items: response.restored_items,
            }
        }
        Ok(_) => {
            tracing::error!("Revert request accepted but order {order_id} was not deleted");
            CompensationOutcome::Failed {
                message: COMPENSATION_FAILED.to_string(),
            }
        }
        Err(e) => {
            tracing::error!("Failed to revert order {order_id}: {e}");
            CompensationOutcome::Failed {
                message: COMPENSATION_FAILED.to_string(),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
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

    fn callback() -> VerifyPaymentRequest {
        VerifyPaymentRequest {
            razorpay_order_id: "order_abc123".to_string(),
            razorpay_payment_id: "pay_xyz789".to_string(),
            razorpay_signature: "sig".to_string(),
        }
    }

    #[tokio::test]
    async fn test_verification_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payments/verify"))
            .and(body_partial_json(serde_json::json!({
                "razorpay_order_id": "order_abc123",
                "razorpay_payment_id": "pay_xyz789",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"status": "verified", "order_id": 42}),
            ))
            .mount(&server)
            .await;

        let outcome = verify_payment(&client_for(&server), OrderId::new(42), &callback()).await;
        assert!(outcome.verified);
        assert_eq!(outcome.order_id, OrderId::new(42));
    }

    #[tokio::test]
    async fn test_verification_failure_is_non_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payments/verify"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let outcome = verify_payment(&client_for(&server), OrderId::new(42), &callback()).await;
        assert!(!outcome.verified);
        assert_eq!(outcome.order_id, OrderId::new(42));
        assert_eq!(outcome.message, "Payment received; verification pending");
    }

    #[tokio::test]
    async fn test_compensation_reverts_with_reason() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/orders/revert"))
            .and(body_partial_json(serde_json::json!({
                "order_id": 42,
                "reason": REASON_USER_CANCELLED,
                "soft_delete": true,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"deleted": true, "restored_items": 2}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let outcome =
            compensate(&client_for(&server), OrderId::new(42), REASON_USER_CANCELLED).await;
        assert_eq!(outcome, CompensationOutcome::Reverted { restored_items: 2 });
    }

    #[tokio::test]
    async fn test_compensation_failure_directs_to_support() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/orders/revert"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let outcome =
            compensate(&client_for(&server), OrderId::new(42), REASON_GATEWAY_FAILURE).await;
        assert!(matches!(outcome, CompensationOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn test_compensation_not_deleted_counts_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/orders/revert"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"deleted": false, "restored_items": 0})),
            )
            .mount(&server)
            .await;

        let outcome =
            compensate(&client_for(&server), OrderId::new(42), REASON_USER_CANCELLED).await;
        assert!(matches!(outcome, CompensationOutcome::Failed { .. }));
    }
}
