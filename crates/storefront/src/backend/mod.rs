//! Commerce backend REST API client.
//!
//! # Architecture
//!
//! - The backend is source of truth - NO local sync, direct API calls
//! - Plain REST with JSON bodies via `reqwest`
//! - In-memory caching via `moka` for catalog reads (5 minute TTL);
//!   cart, checkout and order state are never cached
//!
//! # Example
//!
//! ```rust,ignore
//! use auric_storefront::backend::BackendClient;
//!
//! let client = BackendClient::new(&config.backend)?;
//!
//! // Fetch the cart and resolve shipping rates
//! let cart = client.cart().await?;
//! let rates = client.shipping_rates(&request).await?;
//! ```

mod client;
pub mod types;

pub use client::BackendClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when calling the commerce backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned a non-2xx response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl BackendError {
    /// The backend-provided message, if this error carries one.
    ///
    /// Used to surface backend validation text (e.g., an invalid discount
    /// code) to the customer instead of a generic failure.
    #[must_use]
    pub fn api_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::NotFound("order 42".to_string());
        assert_eq!(err.to_string(), "Not found: order 42");

        let err = BackendError::Api {
            status: 422,
            message: "invalid discount code".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 422 - invalid discount code");
    }

    #[test]
    fn test_api_message() {
        let err = BackendError::Api {
            status: 422,
            message: "code expired".to_string(),
        };
        assert_eq!(err.api_message(), Some("code expired"));

        let err = BackendError::Api {
            status: 500,
            message: String::new(),
        };
        assert_eq!(err.api_message(), None);

        let err = BackendError::NotFound("x".to_string());
        assert_eq!(err.api_message(), None);
    }
}
