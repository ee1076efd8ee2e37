//! Integration tests for the Auric storefront.
//!
//! Each test starts the real router on an ephemeral port in front of a
//! wiremock stand-in for the commerce backend, then drives the checkout
//! flow over HTTP with a cookie-holding client. No external services are
//! required.
//!
//! # Test Categories
//!
//! - `checkout_cod` - Cash-on-delivery checkout flow
//! - `checkout_online` - Online payment flow, callbacks and compensation
//! - `admin_orders` - Admin dashboard token guard

use std::net::{IpAddr, Ipv4Addr};

use axum::Router;
use secrecy::SecretString;
use wiremock::MockServer;

use auric_core::CurrencyCode;
use auric_storefront::config::{BackendConfig, GatewayConfig, StorefrontConfig};
use auric_storefront::state::AppState;
use auric_storefront::{middleware, routes};

/// Admin bearer token used by the test configuration.
pub const ADMIN_TOKEN: &str = "tE5&uV8*wA1!xB4@yC7#zD0$aF3%bG6^";

fn test_config(backend_url: &str) -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from("kJ8#mN2$pQ9@wX4!zR7&vB3*tY6^cF1%"),
        currency: CurrencyCode::INR,
        backend: BackendConfig {
            base_url: backend_url.to_string(),
            api_token: SecretString::from("qW3$eR6&tY9@uI2!oP5#aS8%dF1^gH4*"),
        },
        gateway: GatewayConfig {
            key_id: "rzp_test_key".to_string(),
            key_secret: SecretString::from("hJ7!kL0@mN3#pQ6$rS9%tU2^vW5&xY8*"),
        },
        admin_token: SecretString::from(ADMIN_TOKEN),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A running storefront with a mocked commerce backend.
pub struct TestContext {
    /// The mocked commerce backend; mount expectations here.
    pub backend: MockServer,
    /// Base URL of the storefront under test.
    pub base_url: String,
    /// HTTP client with a cookie store, carrying the session.
    pub client: reqwest::Client,
}

impl TestContext {
    /// Start a storefront instance against a fresh mock backend.
    ///
    /// # Panics
    ///
    /// Panics if the server or client fails to start; tests cannot proceed
    /// without either.
    #[allow(clippy::expect_used)]
    pub async fn new() -> Self {
        let backend = MockServer::start().await;

        let config = test_config(&backend.uri());
        let state = AppState::new(config).expect("Failed to build app state");
        let session_layer = middleware::create_session_layer(state.config());

        let app = Router::new()
            .merge(routes::routes(state.clone()))
            .layer(session_layer)
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Missing local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server error");
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to build test client");

        Self {
            backend,
            base_url: format!("http://{addr}"),
            client,
        }
    }

    /// Absolute URL for a storefront path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}
