//! Per-request CSP nonce.
//!
//! The admin redirect shell runs one inline script. It is allowed by a
//! nonce that is freshly generated for every request and echoed both in the
//! `Content-Security-Policy` header and the `<script nonce="...">` tag.

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;

/// Nonce size in bytes before base64 encoding.
const NONCE_BYTES: usize = 16;

/// Directives shared by every response. `script-src` is appended per request.
const BASE_POLICY: &str = "default-src 'none'; \
     style-src 'self'; \
     img-src 'self' data:; \
     font-src 'self'; \
     connect-src 'self'; \
     frame-src 'none'; \
     object-src 'none'; \
     base-uri 'self'; \
     form-action 'self'; \
     frame-ancestors 'none'";

/// A CSP nonce for inline scripts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CspNonce(pub String);

impl CspNonce {
    /// Generate a new random nonce.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(STANDARD.encode(bytes))
    }

    /// Nonce value for templates.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }

    /// Full policy allowing same-origin scripts plus this nonce.
    #[must_use]
    pub fn policy(&self) -> String {
        if self.0.is_empty() {
            return policy_without_nonce();
        }
        format!("{BASE_POLICY}; script-src 'self' 'nonce-{}'", self.0)
    }
}

/// Policy used when no nonce was generated for the request.
#[must_use]
pub fn policy_without_nonce() -> String {
    format!("{BASE_POLICY}; script-src 'self'")
}

/// Generate a nonce and store it in the request extensions.
///
/// Must wrap `security_headers_middleware` so the nonce exists when the
/// policy header is built.
pub async fn csp_nonce_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(CspNonce::generate());
    next.run(request).await
}

impl<S> FromRequestParts<S> for CspNonce
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_else(|| {
            tracing::warn!("CSP nonce missing from request extensions");
            Self(String::new())
        }))
    }
}
