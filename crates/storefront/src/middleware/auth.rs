//! Admin authentication guard.
//!
//! Every protected admin handler calls [`AdminGuard::check`] before doing
//! anything else. On [`AuthResult::Unauthorized`] the handler returns the
//! carried response untouched.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn protected(State(state): State<AppState>, jar: CookieJar) -> Response {
//!     let cookies = JarCookieStore::new(jar);
//!     if let AuthResult::Unauthorized(response) = state.admin_guard().check(&cookies) {
//!         return response;
//!     }
//!     // ... admin-only work
//! }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;

use super::cookies::CookieStore;
use crate::services::auth::{SessionSigner, TokenError};

/// Admin session cookie name.
pub const ADMIN_SESSION_COOKIE: &str = "cellar_admin_session";

/// Outcome of an admin authorization check.
#[must_use]
pub enum AuthResult {
    /// Caller holds admin privilege.
    Authorized,
    /// Caller is refused; send this response as-is.
    Unauthorized(Response),
}

impl std::fmt::Debug for AuthResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authorized => f.write_str("Authorized"),
            Self::Unauthorized(response) => f
                .debug_tuple("Unauthorized")
                .field(&response.status())
                .finish(),
        }
    }
}

impl From<Result<(), AdminAuthRejection>> for AuthResult {
    fn from(result: Result<(), AdminAuthRejection>) -> Self {
        match result {
            Ok(()) => Self::Authorized,
            Err(rejection) => Self::Unauthorized(rejection.into_response()),
        }
    }
}

/// Why the guard refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAuthRejection {
    /// No admin session cookie.
    MissingSession,
    /// Cookie present but not a token we issued.
    InvalidSession,
    /// Token was ours but has expired.
    Expired,
    /// The check itself failed.
    Internal,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingSession | Self::InvalidSession => {
                (StatusCode::UNAUTHORIZED, "unauthorized")
            }
            Self::Expired => (StatusCode::UNAUTHORIZED, "session expired"),
            Self::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "server error"),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Decides whether a request may reach admin logic.
///
/// Implementations must not mutate the store and must not panic: internal
/// faults become an `Unauthorized` server-error response.
pub trait AdminGuard: Send + Sync {
    /// Inspect the request's cookies and authorize or refuse.
    fn check(&self, cookies: &dyn CookieStore) -> AuthResult;
}

/// Production guard: the admin session cookie must hold a valid, unexpired
/// token signed with the configured session secret.
#[derive(Debug, Clone)]
pub struct SignedSessionGuard {
    signer: SessionSigner,
}

impl SignedSessionGuard {
    /// Create a guard validating tokens from `signer`.
    #[must_use]
    pub const fn new(signer: SessionSigner) -> Self {
        Self { signer }
    }

    fn authorize(&self, cookies: &dyn CookieStore) -> Result<(), AdminAuthRejection> {
        let token = cookies
            .get(ADMIN_SESSION_COOKIE)
            .map_err(|e| {
                let event_id = sentry::capture_error(&e);
                tracing::error!(error = %e, sentry_event_id = %event_id, "Admin guard could not read cookies");
                AdminAuthRejection::Internal
            })?
            .ok_or_else(|| {
                tracing::debug!("No admin session cookie");
                AdminAuthRejection::MissingSession
            })?;

        match self.signer.verify(&token, Utc::now()) {
            Ok(expires_at) => {
                tracing::debug!(%expires_at, "Admin session accepted");
                Ok(())
            }
            Err(TokenError::Expired) => {
                tracing::info!("Admin session expired");
                Err(AdminAuthRejection::Expired)
            }
            Err(TokenError::InvalidKey) => {
                tracing::error!("Admin session signing key rejected");
                Err(AdminAuthRejection::Internal)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Admin session token refused");
                Err(AdminAuthRejection::InvalidSession)
            }
        }
    }
}

impl AdminGuard for SignedSessionGuard {
    fn check(&self, cookies: &dyn CookieStore) -> AuthResult {
        self.authorize(cookies).into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::middleware::cookies::CookieStoreError;
    use axum::body::to_bytes;
    use axum_extra::extract::cookie::Cookie;
    use chrono::Duration;
    use secrecy::SecretString;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Default)]
    struct MapStore {
        cookies: HashMap<String, String>,
        broken: bool,
    }

    impl CookieStore for MapStore {
        fn get(&self, name: &str) -> Result<Option<String>, CookieStoreError> {
            if self.broken {
                return Err(CookieStoreError::Read("jar unavailable".to_string()));
            }
            Ok(self.cookies.get(name).cloned())
        }

        fn set(&mut self, cookie: Cookie<'static>) -> Result<(), CookieStoreError> {
            self.cookies
                .insert(cookie.name().to_string(), cookie.value().to_string());
            Ok(())
        }

        fn remove(&mut self, name: &str) -> Result<(), CookieStoreError> {
            self.cookies.remove(name);
            Ok(())
        }
    }

    /// Collects formatted log output.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn signer(ttl: Duration) -> SessionSigner {
        SessionSigner::new(SecretString::from("k7#Qz!p2Lx9@vB4$wR8^mN1&tY6*cF3%"), ttl)
    }

    fn store_with_token(token: &str) -> MapStore {
        let mut store = MapStore::default();
        store
            .cookies
            .insert(ADMIN_SESSION_COOKIE.to_string(), token.to_string());
        store
    }

    async fn rejection(result: AuthResult) -> (StatusCode, serde_json::Value) {
        let AuthResult::Unauthorized(response) = result else {
            panic!("expected rejection");
        };
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_valid_token_is_authorized() {
        let signer = signer(Duration::hours(1));
        let token = signer.issue(Utc::now()).unwrap();
        let guard = SignedSessionGuard::new(signer);
        assert!(matches!(
            guard.check(&store_with_token(&token)),
            AuthResult::Authorized
        ));
    }

    #[tokio::test]
    async fn test_missing_cookie_is_unauthorized() {
        let guard = SignedSessionGuard::new(signer(Duration::hours(1)));
        let (status, body) = rejection(guard.check(&MapStore::default())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "unauthorized");
    }

    #[tokio::test]
    async fn test_forged_cookie_is_unauthorized() {
        let guard = SignedSessionGuard::new(signer(Duration::hours(1)));
        let (status, _) = rejection(guard.check(&store_with_token("letmein"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_expired_cookie_is_reported() {
        let signer = signer(Duration::hours(1));
        let token = signer.issue(Utc::now() - Duration::hours(2)).unwrap();
        let guard = SignedSessionGuard::new(signer);
        let (status, body) = rejection(guard.check(&store_with_token(&token))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "session expired");
    }

    #[tokio::test]
    async fn test_store_fault_becomes_server_error() {
        let guard = SignedSessionGuard::new(signer(Duration::hours(1)));
        let store = MapStore {
            broken: true,
            ..MapStore::default()
        };
        let (status, body) = rejection(guard.check(&store)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "server error");
    }

    #[test]
    fn test_auth_result_debug() {
        let result: AuthResult = Err(AdminAuthRejection::Expired).into();
        assert_eq!(format!("{result:?}"), "Unauthorized(401)");
    }

    #[test]
    fn test_missing_cookie_is_logged() {
        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let guard = SignedSessionGuard::new(signer(Duration::hours(1)));

        let result =
            tracing::subscriber::with_default(subscriber, || guard.check(&MapStore::default()));

        assert!(matches!(result, AuthResult::Unauthorized(_)));
        assert!(logs.contents().contains("No admin session cookie"));
    }
}
