//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, start transactions)
//! 2. `TraceLayer` (one `http_request` span per request)
//! 3. Request ID (fills the span's `request_id` field)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
