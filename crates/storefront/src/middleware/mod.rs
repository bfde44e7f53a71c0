//! HTTP middleware and request-scoped helpers for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with `request_id` field)
//! 3. Request ID
//! 4. CSP nonce
//! 5. Security headers (CSP built from the nonce)
//! 6. Rate limiting (per route group)
//!
//! The admin guard is not a layer: protected handlers call it explicitly
//! with a [`cookies::CookieStore`] built from the request's cookie jar.

pub mod auth;
pub mod cookies;
pub mod csp;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use auth::{ADMIN_SESSION_COOKIE, AdminAuthRejection, AdminGuard, AuthResult, SignedSessionGuard};
pub use cookies::{CookieStore, CookieStoreError, JarCookieStore};
pub use csp::{CspNonce, csp_nonce_middleware};
pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
