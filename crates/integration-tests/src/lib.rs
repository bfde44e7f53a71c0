//! Router-level integration tests for Cellar Door.
//!
//! Tests drive the real `axum` router in-process with
//! `tower::ServiceExt::oneshot`; no server or network is needed.
//!
//! ```bash
//! cargo test -p cellar-door-integration-tests
//! ```
//!
//! This library holds the shared fixtures: a test configuration, the
//! bundled catalog, stub admin guards and request/response helpers.

#![allow(clippy::missing_panics_doc, clippy::unwrap_used, clippy::expect_used)]

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    Extension,
    extract::ConnectInfo,
    http::{HeaderMap, Request, StatusCode, header},
    response::{IntoResponse, Response},
};
use cellar_door_storefront::{
    app,
    catalog::Catalog,
    config::{AdminConfig, SentryConfig, StorefrontConfig},
    middleware::{AdminGuard, AuthResult, CookieStore},
    services::auth::hash_password,
    state::AppState,
};
use secrecy::SecretString;
use tower::ServiceExt;

/// Admin password accepted by [`test_config`].
pub const ADMIN_PASSWORD: &str = "decant-the-barolo-slowly";

/// Session secret used by [`test_config`].
pub const SESSION_SECRET: &str = "k7#Qz!p2Lx9@vB4$wR8^mN1&tY6*cF3%";

/// Socket peer of every request (rate limiters key on it).
pub const CLIENT_IP: IpAddr = IpAddr::V4(std::net::Ipv4Addr::new(203, 0, 113, 10));

fn storefront_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../storefront")
}

/// Configuration pointing at the bundled content and static files.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    let hash = hash_password(ADMIN_PASSWORD).expect("hash test password");
    StorefrontConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from(SESSION_SECRET),
        admin: AdminConfig {
            password_hash: Some(SecretString::from(hash)),
            session_hours: 12,
        },
        content_dir: storefront_dir().join("content"),
        static_dir: storefront_dir().join("static"),
        client_ip_header: None,
        sentry: SentryConfig::default(),
    }
}

/// The catalog shipped in `crates/storefront/content`.
#[must_use]
pub fn test_catalog() -> Catalog {
    Catalog::load(&storefront_dir().join("content")).expect("load bundled catalog")
}

/// Attach the socket peer `axum::serve` would record.
fn with_peer(router: Router) -> Router {
    router.layer(Extension(ConnectInfo(SocketAddr::new(CLIENT_IP, 40_000))))
}

/// Router with the production signed-session guard.
#[must_use]
pub fn router() -> Router {
    router_with_state(AppState::new(test_config(), test_catalog()))
}

/// Router over an explicit state, as served to [`CLIENT_IP`].
#[must_use]
pub fn router_with_state(state: AppState) -> Router {
    with_peer(app(state))
}

/// Router with a stub guard.
#[must_use]
pub fn router_with_guard(guard: impl AdminGuard + 'static) -> Router {
    router_with_config(test_config(), guard)
}

/// Router with a custom configuration and stub guard.
#[must_use]
pub fn router_with_config(config: StorefrontConfig, guard: impl AdminGuard + 'static) -> Router {
    router_with_state(AppState::with_guard(config, test_catalog(), Arc::new(guard)))
}

/// Guard that lets everything through.
pub struct AllowGuard;

impl AdminGuard for AllowGuard {
    fn check(&self, _cookies: &dyn CookieStore) -> AuthResult {
        AuthResult::Authorized
    }
}

/// Guard that refuses with a fixed status and body.
pub struct DenyGuard {
    pub status: StatusCode,
    pub body: &'static str,
}

impl DenyGuard {
    /// Sentinel body used to prove the guard's response is passed verbatim.
    pub const SENTINEL: &'static str = "denied-by-stub-guard";

    /// A 401 refusal with the sentinel body.
    #[must_use]
    pub const fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            body: Self::SENTINEL,
        }
    }

    /// A 403 refusal with the sentinel body.
    #[must_use]
    pub const fn forbidden() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            body: Self::SENTINEL,
        }
    }
}

impl AdminGuard for DenyGuard {
    fn check(&self, _cookies: &dyn CookieStore) -> AuthResult {
        AuthResult::Unauthorized((self.status, self.body).into_response())
    }
}

/// Start a request builder.
#[must_use]
pub fn request(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder().method(method).uri(uri)
}

/// Send a request with an empty body.
pub async fn send(router: Router, method: &str, uri: &str, cookie: Option<&str>) -> Response {
    let mut builder = request(method, uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    router
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Send a JSON body.
pub async fn send_json(router: Router, uri: &str, body: &serde_json::Value) -> Response {
    send_json_with_headers(router, uri, body, &[]).await
}

/// Send a JSON body with extra request headers.
pub async fn send_json_with_headers(
    router: Router,
    uri: &str,
    body: &serde_json::Value,
    headers: &[(&str, &str)],
) -> Response {
    let mut builder = request("POST", uri).header(header::CONTENT_TYPE, "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    router
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

/// Send a URL-encoded form body.
pub async fn send_form(router: Router, uri: &str, form: &str, cookie: Option<&str>) -> Response {
    let mut builder =
        request("POST", uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    router
        .oneshot(builder.body(Body::from(form.to_string())).unwrap())
        .await
        .unwrap()
}

/// Split a response into status, headers and body text.
pub async fn read(response: Response) -> (StatusCode, HeaderMap, String) {
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

/// Split a JSON response into status and parsed body.
pub async fn read_json(response: Response) -> (StatusCode, serde_json::Value) {
    let (status, _, body) = read(response).await;
    let json = serde_json::from_str(&body).unwrap_or_else(|e| panic!("not JSON ({e}): {body}"));
    (status, json)
}

/// All `Set-Cookie` header values.
#[must_use]
pub fn set_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(String::from)
        .collect()
}

/// `name=value` pair from the `Set-Cookie` for `name`, if any.
#[must_use]
pub fn cookie_pair(headers: &HeaderMap, name: &str) -> Option<String> {
    set_cookies(headers)
        .into_iter()
        .find(|c| c.starts_with(&format!("{name}=")))
        .and_then(|c| c.split(';').next().map(str::to_string))
}
