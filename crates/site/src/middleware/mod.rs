//! HTTP middleware stack for the site.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame options, etc.)
//!
//! The signed-in caller is not a layer: handlers that need it take the
//! [`Caller`] extractor.

pub mod identity;
pub mod request_id;
pub mod security_headers;

pub use identity::Caller;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
