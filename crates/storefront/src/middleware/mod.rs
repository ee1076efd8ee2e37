//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, trace transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions, signed cookies, in-memory store)
//! 4. Admin token guard (admin routes only, see `routes::admin`)

pub mod session;

pub use session::create_session_layer;
