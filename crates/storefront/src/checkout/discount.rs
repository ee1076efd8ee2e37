//! Discount code validation.
//!
//! At most one discount is applied per order; a successful validation
//! replaces any previously applied code, and any failure clears it. The
//! backend's message is surfaced when it provides one.

use tracing::instrument;

use crate::backend::BackendClient;
use crate::backend::types::Discount;

/// Fallback message when the backend gives no detail.
const GENERIC_FAILURE: &str = "This discount code cannot be applied";

/// Result of a validation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscountOutcome {
    /// The code is valid; the caller replaces any applied discount.
    Applied(Discount),
    /// Invalid, expired, or the request failed; the caller clears any
    /// applied discount and shows the message.
    Rejected { message: String },
}

/// Validate a code against the backend.
///
/// The code is upper-cased before submission; an empty code is rejected
/// without a network call.
#[instrument(skip(backend))]
pub async fn validate(backend: &BackendClient, code: &str) -> DiscountOutcome {
    let code = code.trim().to_uppercase();
    if code.is_empty() {
        return DiscountOutcome::Rejected {
            message: "Enter a discount code".to_string(),
        };
    }

    match backend.validate_discount(&code).await {
        Ok(discount) => DiscountOutcome::Applied(discount),
        Err(e) => {
            tracing::warn!("Discount validation failed for {code}: {e}");
            DiscountOutcome::Rejected {
                message: e
                    .api_message()
                    .unwrap_or(GENERIC_FAILURE)
                    .to_string(),
            }
        }
    }
}
