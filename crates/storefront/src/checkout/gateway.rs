//! Payment gateway flow state machine.
//!
//! Tracks the online-payment path from order creation through the hosted
//! widget's callbacks. The flow value is persisted in the session and every
//! transition is validated server-side, so a callback can never act on an
//! order it does not belong to.
//!
//! ```text
//! Idle -> OrderCreated -> GatewayOpen -> PaymentSucceeded
//!                      \              \-> PaymentCancelled
//!                       \-> GatewayFailed (also from GatewayOpen)
//! ```
//!
//! There is no automatic retry: a failed or cancelled flow must be
//! restarted from order creation.

use auric_core::OrderId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::types::PaymentCredentials;

/// Errors from illegal flow transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    /// A callback arrived with no payment in progress.
    #[error("No payment in progress")]
    NoPendingPayment,

    /// An online payment is already in flight; it must complete or be
    /// compensated before a new one starts.
    #[error("A payment is already in progress")]
    AlreadyInProgress,

    /// The callback's gateway order id does not match the pending flow.
    #[error("Payment callback does not match the pending order")]
    OrderMismatch,
}

/// The online-payment flow, persisted in the session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PaymentFlow {
    /// No online payment in progress.
    #[default]
    Idle,
    /// The online order exists; gateway credentials are being issued.
    OrderCreated { order_id: OrderId },
    /// Credentials handed to the page; the hosted widget owns the UI.
    GatewayOpen {
        order_id: OrderId,
        credentials: PaymentCredentials,
    },
    /// The widget reported success; verification has run.
    PaymentSucceeded { order_id: OrderId },
    /// The customer dismissed the widget; the order was compensated.
    PaymentCancelled { order_id: OrderId },
    /// The gateway script failed to load; the order was compensated.
    GatewayFailed { order_id: OrderId },
}

impl PaymentFlow {
    /// True when an order is awaiting payment or a callback.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::OrderCreated { .. } | Self::GatewayOpen { .. })
    }

    /// The order id this flow refers to, if any.
    #[must_use]
    pub const fn order_id(&self) -> Option<OrderId> {
        match self {
            Self::Idle => None,
            Self::OrderCreated { order_id }
            | Self::GatewayOpen { order_id, .. }
            | Self::PaymentSucceeded { order_id }
            | Self::PaymentCancelled { order_id }
            | Self::GatewayFailed { order_id } => Some(*order_id),
        }
    }

    /// Start a new flow for a freshly created online order.
    ///
    /// Legal from `Idle` and from any terminal state (a retry restarts the
    /// whole flow); illegal while a payment is still pending.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::AlreadyInProgress`] if a payment is pending.
    pub fn order_created(&self, order_id: OrderId) -> Result<Self, FlowError> {
        if self.is_pending() {
            return Err(FlowError::AlreadyInProgress);
        }
        Ok(Self::OrderCreated { order_id })
    }

    /// Record that credentials were issued and the widget is opening.
    ///
    /// Re-opening with the same credentials while already open is a no-op
    /// success (the page may load the gateway script twice).
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::NoPendingPayment`] outside the pending states.
    pub fn gateway_opened(&self, credentials: PaymentCredentials) -> Result<Self, FlowError> {
        match self {
            Self::OrderCreated { order_id } => Ok(Self::GatewayOpen {
                order_id: *order_id,
                credentials,
            }),
            Self::GatewayOpen {
                order_id,
                credentials: existing,
            } if *existing == credentials => Ok(Self::GatewayOpen {
                order_id: *order_id,
                credentials,
            }),
            _ => Err(FlowError::NoPendingPayment),
        }
    }

    /// The widget's success handler fired for the given gateway order.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::NoPendingPayment`] when the widget is not open,
    /// or [`FlowError::OrderMismatch`] when the callback's gateway order id
    /// differs from the pending credentials.
    pub fn payment_succeeded(&self, gateway_order_id: &str) -> Result<Self, FlowError> {
        match self {
            Self::GatewayOpen {
                order_id,
                credentials,
            } => {
                if credentials.razorpay_order_id != gateway_order_id {
                    return Err(FlowError::OrderMismatch);
                }
                Ok(Self::PaymentSucceeded {
                    order_id: *order_id,
                })
            }
            _ => Err(FlowError::NoPendingPayment),
        }
    }

    /// The customer dismissed the widget without paying.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::NoPendingPayment`] when the widget is not open.
    pub fn payment_cancelled(&self) -> Result<Self, FlowError> {
        match self {
            Self::GatewayOpen { order_id, .. } => Ok(Self::PaymentCancelled {
                order_id: *order_id,
            }),
            _ => Err(FlowError::NoPendingPayment),
        }
    }

    /// The page reported that the gateway failed to load.
    ///
    /// Legal from both pending states: credentials may or may not have been
    /// issued by the time the script load fails.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::NoPendingPayment`] outside the pending states.
    pub fn gateway_failed(&self) -> Result<Self, FlowError> {
        match self {
            Self::OrderCreated { order_id } | Self::GatewayOpen { order_id, .. } => {
                Ok(Self::GatewayFailed {
                    order_id: *order_id,
                })
            }
            _ => Err(FlowError::NoPendingPayment),
        }
    }
}

/// Fields of backend-issued credentials that disagree with what the
/// storefront expects: the configured gateway key and the quoted total in
/// minor units.
///
/// The gateway charges whatever the credentials say, so a non-empty result
/// means the backend and storefront configuration have drifted and the
/// charge should be flagged before the widget opens.
#[must_use]
pub fn credential_drift(
    credentials: &PaymentCredentials,
    expected_amount: i64,
    expected_key_id: &str,
) -> Vec<&'static str> {
    let mut drift = Vec::new();
    if credentials.amount != expected_amount {
        drift.push("amount");
    }
    if credentials.key_id != expected_key_id {
        drift.push("key_id");
    }
    drift
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn credentials() -> PaymentCredentials {
        PaymentCredentials {
            razorpay_order_id: "order_abc123".to_string(),
            amount: 95000,
            key_id: "rzp_live_key".to_string(),
        }
    }

    #[test]
    fn test_happy_path_transitions() {
        let flow = PaymentFlow::Idle;
        let flow = flow.order_created(OrderId::new(42)).unwrap();
        assert!(flow.is_pending());

        let flow = flow.gateway_opened(credentials()).unwrap();
        assert!(flow.is_pending());

        let flow = flow.payment_succeeded("order_abc123").unwrap();
        assert_eq!(
            flow,
            PaymentFlow::PaymentSucceeded {
                order_id: OrderId::new(42)
            }
        );
        assert!(!flow.is_pending());
    }

    #[test]
    fn test_cancel_from_open() {
        let flow = PaymentFlow::Idle
            .order_created(OrderId::new(42))
            .unwrap()
            .gateway_opened(credentials())
            .unwrap();
        let flow = flow.payment_cancelled().unwrap();
        assert_eq!(flow.order_id(), Some(OrderId::new(42)));
        assert!(matches!(flow, PaymentFlow::PaymentCancelled { .. }));
    }

    #[test]
    fn test_gateway_failure_from_either_pending_state() {
        let created = PaymentFlow::Idle.order_created(OrderId::new(1)).unwrap();
        assert!(matches!(
            created.gateway_failed().unwrap(),
            PaymentFlow::GatewayFailed { .. }
        ));

        let open = created.gateway_opened(credentials()).unwrap();
        assert!(matches!(
            open.gateway_failed().unwrap(),
            PaymentFlow::GatewayFailed { .. }
        ));
    }

    #[test]
    fn test_reopen_with_same_credentials_is_noop() {
        let open = PaymentFlow::Idle
            .order_created(OrderId::new(1))
            .unwrap()
            .gateway_opened(credentials())
            .unwrap();
        let reopened = open.gateway_opened(credentials()).unwrap();
        assert_eq!(open, reopened);
    }

    #[test]
    fn test_callback_without_pending_flow_is_rejected() {
        assert_eq!(
            PaymentFlow::Idle.payment_succeeded("order_abc123"),
            Err(FlowError::NoPendingPayment)
        );
        assert_eq!(
            PaymentFlow::Idle.payment_cancelled(),
            Err(FlowError::NoPendingPayment)
        );
        assert_eq!(
            PaymentFlow::Idle.gateway_failed(),
            Err(FlowError::NoPendingPayment)
        );
    }

    #[test]
    fn test_mismatched_gateway_order_rejected() {
        let open = PaymentFlow::Idle
            .order_created(OrderId::new(1))
            .unwrap()
            .gateway_opened(credentials())
            .unwrap();
        assert_eq!(
            open.payment_succeeded("order_other"),
            Err(FlowError::OrderMismatch)
        );
    }

    #[test]
    fn test_new_flow_rejected_while_pending() {
        let pending = PaymentFlow::Idle.order_created(OrderId::new(1)).unwrap();
        assert_eq!(
            pending.order_created(OrderId::new(2)),
            Err(FlowError::AlreadyInProgress)
        );
    }

    #[test]
    fn test_credential_drift_clean() {
        assert!(credential_drift(&credentials(), 95000, "rzp_live_key").is_empty());
    }

    #[test]
    fn test_credential_drift_reports_each_field() {
        let drift = credential_drift(&credentials(), 95000, "rzp_other_key");
        assert_eq!(drift, vec!["key_id"]);

        let drift = credential_drift(&credentials(), 90000, "rzp_other_key");
        assert_eq!(drift, vec!["amount", "key_id"]);
    }

    #[test]
    fn test_retry_allowed_from_terminal_states() {
        let cancelled = PaymentFlow::PaymentCancelled {
            order_id: OrderId::new(1),
        };
        let restarted = cancelled.order_created(OrderId::new(2)).unwrap();
        assert_eq!(restarted.order_id(), Some(OrderId::new(2)));
    }
}
