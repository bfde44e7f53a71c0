//! Admin session API.
//!
//! ```text
//! GET  /api/admin/session  - Is there an admin session cookie?
//! POST /api/admin/logout   - Delete the admin session cookie
//! POST /api/admin/login    - Exchange the admin password for a session
//! ```
//!
//! Session and logout consult the admin guard before anything else and
//! return its rejection verbatim. The request-independent halves
//! ([`verify_session`], [`end_session`]) take the guard and cookie store as
//! trait objects.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::Utc;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::error::{AppError, add_breadcrumb};
use crate::middleware::auth::{ADMIN_SESSION_COOKIE, AdminGuard, AuthResult};
use crate::middleware::cookies::{CookieStore, JarCookieStore};
use crate::services::auth::{self, AuthError, SessionSigner};
use crate::state::AppState;

fn server_error(message_key: &str, message: serde_json::Value) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ message_key: message })),
    )
        .into_response()
}

/// Report whether the request carries an admin session cookie.
///
/// - guard rejects: the guard's response
/// - cookie absent: 401 `{"authenticated": false}`
/// - cookie present: 200 `{"authenticated": true}`
/// - store fault: 500 `{"authenticated": false}`
pub fn verify_session(guard: &dyn AdminGuard, cookies: &dyn CookieStore) -> Response {
    if let AuthResult::Unauthorized(response) = guard.check(cookies) {
        return response;
    }

    match cookies.get(ADMIN_SESSION_COOKIE) {
        Ok(Some(_)) => (StatusCode::OK, Json(json!({ "authenticated": true }))).into_response(),
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "authenticated": false })),
        )
            .into_response(),
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Session check failed");
            server_error("authenticated", json!(false))
        }
    }
}

/// Delete the admin session cookie.
///
/// Idempotent: succeeds whether or not the cookie was present.
///
/// - guard rejects: the guard's response
/// - removed: 200 `{"success": true}`
/// - store fault: 500 `{"message": "server error"}`
pub fn end_session(guard: &dyn AdminGuard, cookies: &mut dyn CookieStore) -> Response {
    if let AuthResult::Unauthorized(response) = guard.check(&*cookies) {
        return response;
    }

    match cookies.remove(ADMIN_SESSION_COOKIE) {
        Ok(()) => {
            tracing::info!("Admin session ended");
            (StatusCode::OK, Json(json!({ "success": true }))).into_response()
        }
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Logout failed");
            server_error("message", json!("server error"))
        }
    }
}

/// `GET /api/admin/session`
#[instrument(skip(state, jar))]
pub async fn session(State(state): State<AppState>, jar: CookieJar) -> Response {
    let store = JarCookieStore::new(jar);
    verify_session(state.admin_guard(), &store)
}

/// `POST /api/admin/logout`
#[instrument(skip(state, jar))]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    let mut store = JarCookieStore::new(jar);
    let response = end_session(state.admin_guard(), &mut store);
    (store.into_jar(), response).into_response()
}

/// Login request body.
///
/// No `Debug` derive: the password must never reach logs.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// `POST /api/admin/login`
///
/// # Errors
///
/// - 400 malformed body
/// - 401 wrong password
/// - 503 no password hash configured
/// - 500 hashing or signing failure
#[instrument(skip(state, jar, body))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let Some(hash) = state.config().admin.password_hash.clone() else {
        tracing::warn!("Admin login attempted but no password hash is configured");
        return Err(AppError::ServiceUnavailable(
            "admin login not configured".to_string(),
        ));
    };

    // Argon2 is CPU-bound
    let verified = tokio::task::spawn_blocking(move || {
        auth::verify_password(&request.password, hash.expose_secret())
    })
    .await
    .map_err(|e| AppError::Internal(format!("password check panicked: {e}")))?;

    match verified {
        Ok(()) => {}
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("Admin login failed: invalid credentials");
            return Err(AppError::Unauthorized("invalid credentials".to_string()));
        }
        Err(e) => return Err(AppError::Internal(e.to_string())),
    }

    let mut store = JarCookieStore::new(jar);
    start_session(state.signer(), state.config().secure_cookies(), &mut store)?;

    add_breadcrumb("admin", "Admin logged in", None);
    tracing::info!("Admin login succeeded");

    Ok((store.into_jar(), Json(json!({ "success": true }))).into_response())
}

/// Mint a session token and store it as the admin session cookie.
///
/// # Errors
///
/// Returns `AppError::Internal` if signing or the cookie write fails.
pub fn start_session(
    signer: &SessionSigner,
    secure: bool,
    cookies: &mut dyn CookieStore,
) -> Result<(), AppError> {
    let token = signer
        .issue(Utc::now())
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let cookie = Cookie::build((ADMIN_SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .max_age(time::Duration::seconds(signer.ttl().num_seconds()))
        .build();

    cookies
        .set(cookie)
        .map_err(|e| AppError::Internal(e.to_string()))
}
