//! Admin session gate: guard, session check, logout, login and pages.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::http::{HeaderName, StatusCode, header};
use cellar_door_integration_tests::{
    ADMIN_PASSWORD, AllowGuard, DenyGuard, cookie_pair, read, read_json, router,
    router_with_config, router_with_guard, send, send_json, send_json_with_headers, set_cookies,
    test_config,
};
use cellar_door_storefront::middleware::ADMIN_SESSION_COOKIE;
use serde_json::json;

fn session_cookie(value: &str) -> String {
    format!("{ADMIN_SESSION_COOKIE}={value}")
}

/// Log in with the real guard and return the `name=value` session cookie.
async fn login() -> String {
    let response = send_json(
        router(),
        "/api/admin/login",
        &json!({ "password": ADMIN_PASSWORD }),
    )
    .await;
    let (status, headers, _) = read(response).await;
    assert_eq!(status, StatusCode::OK);
    cookie_pair(&headers, ADMIN_SESSION_COOKIE).expect("session cookie set")
}

// ============================================================================
// GET /api/admin/session
// ============================================================================

#[tokio::test]
async fn test_session_without_cookie_is_unauthenticated() {
    let response = send(router_with_guard(AllowGuard), "GET", "/api/admin/session", None).await;
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "authenticated": false }));
}

#[tokio::test]
async fn test_session_with_any_value_is_authenticated() {
    let cookie = session_cookie("anything-at-all");
    let response = send(
        router_with_guard(AllowGuard),
        "GET",
        "/api/admin/session",
        Some(&cookie),
    )
    .await;
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "authenticated": true }));
}

#[tokio::test]
async fn test_session_denied_returns_guard_response_verbatim() {
    let cookie = session_cookie("token");
    for guard in [DenyGuard::unauthorized(), DenyGuard::forbidden()] {
        let expected = guard.status;
        let response = send(
            router_with_guard(guard),
            "GET",
            "/api/admin/session",
            Some(&cookie),
        )
        .await;
        let (status, headers, body) = read(response).await;
        assert_eq!(status, expected);
        assert_eq!(body, DenyGuard::SENTINEL);
        assert!(set_cookies(&headers).is_empty());
    }
}

// ============================================================================
// POST /api/admin/logout
// ============================================================================

#[tokio::test]
async fn test_logout_without_cookie_succeeds() {
    let response = send(router_with_guard(AllowGuard), "POST", "/api/admin/logout", None).await;
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let cookie = session_cookie("token");
    let response = send(
        router_with_guard(AllowGuard),
        "POST",
        "/api/admin/logout",
        Some(&cookie),
    )
    .await;
    let (status, headers, body) = read(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true}"#);

    let removal = set_cookies(&headers)
        .into_iter()
        .find(|c| c.starts_with(&format!("{ADMIN_SESSION_COOKIE}=")))
        .expect("removal cookie");
    assert!(removal.contains("Max-Age=0"));
    assert!(removal.contains("Path=/"));
}

#[tokio::test]
async fn test_logout_denied_keeps_cookie() {
    let cookie = session_cookie("token");
    let response = send(
        router_with_guard(DenyGuard::unauthorized()),
        "POST",
        "/api/admin/logout",
        Some(&cookie),
    )
    .await;
    let (status, headers, body) = read(response).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, DenyGuard::SENTINEL);
    assert!(set_cookies(&headers).is_empty());
}

// ============================================================================
// Real guard
// ============================================================================

#[tokio::test]
async fn test_real_guard_rejects_missing_and_forged_sessions() {
    let response = send(router(), "GET", "/api/admin/session", None).await;
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "unauthorized" }));

    let forged = session_cookie("9999999999.00112233445566778899aabbccddeeff.deadbeef");
    let response = send(router(), "GET", "/api/admin/session", Some(&forged)).await;
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "unauthorized" }));
}

#[tokio::test]
async fn test_login_session_logout_flow() {
    let cookie = login().await;

    let response = send(router(), "GET", "/api/admin/session", Some(&cookie)).await;
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "authenticated": true }));

    let response = send(router(), "POST", "/api/admin/logout", Some(&cookie)).await;
    let (status, headers, _) = read(response).await;
    assert_eq!(status, StatusCode::OK);
    assert!(cookie_pair(&headers, ADMIN_SESSION_COOKIE).is_some());

    // Browser dropped the cookie: the guard now refuses
    let response = send(router(), "GET", "/api/admin/session", None).await;
    let (status, _) = read_json(response).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// POST /api/admin/login
// ============================================================================

#[tokio::test]
async fn test_login_sets_hardened_cookie() {
    let response = send_json(
        router(),
        "/api/admin/login",
        &json!({ "password": ADMIN_PASSWORD }),
    )
    .await;
    let (status, headers, body) = read(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true}"#);

    let cookie = set_cookies(&headers)
        .into_iter()
        .find(|c| c.starts_with(&format!("{ADMIN_SESSION_COOKIE}=")))
        .unwrap();
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=43200"));
    // Plain-http base URL
    assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let response = send_json(router(), "/api/admin/login", &json!({ "password": "merlot" })).await;
    let (status, headers, body) = read(response).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"message":"invalid credentials"}"#);
    assert!(set_cookies(&headers).is_empty());
}

#[tokio::test]
async fn test_login_not_configured() {
    let mut config = test_config();
    config.admin.password_hash = None;
    let response = send_json(
        router_with_config(config, AllowGuard),
        "/api/admin/login",
        &json!({ "password": ADMIN_PASSWORD }),
    )
    .await;
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({ "message": "admin login not configured" }));
}

#[tokio::test]
async fn test_login_malformed_body() {
    let response = send_json(router(), "/api/admin/login", &json!({ "pass": 1 })).await;
    let (status, _) = read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_is_rate_limited() {
    let app = router();
    let mut statuses = Vec::new();
    for _ in 0..8 {
        let response = send_json(app.clone(), "/api/admin/login", &json!({ "password": "x" })).await;
        statuses.push(response.status());
    }
    assert!(statuses.contains(&StatusCode::TOO_MANY_REQUESTS));
}

/// Wrong-password login attempts, one per header set, returning statuses.
async fn failed_logins(app: &Router, attempts: &[Vec<(&str, String)>]) -> Vec<StatusCode> {
    let mut statuses = Vec::new();
    for headers in attempts {
        let headers: Vec<(&str, &str)> = headers.iter().map(|(n, v)| (*n, v.as_str())).collect();
        let response = send_json_with_headers(
            app.clone(),
            "/api/admin/login",
            &json!({ "password": "x" }),
            &headers,
        )
        .await;
        statuses.push(response.status());
    }
    statuses
}

#[tokio::test]
async fn test_login_limit_ignores_rotating_forwarded_for() {
    let attempts: Vec<_> = (0..20)
        .map(|i| {
            let forged = format!("198.51.100.{i}");
            vec![("x-forwarded-for", forged.clone()), ("x-real-ip", forged)]
        })
        .collect();
    let statuses = failed_logins(&router(), &attempts).await;
    assert!(statuses.contains(&StatusCode::TOO_MANY_REQUESTS), "{statuses:?}");
}

#[tokio::test]
async fn test_login_limit_keys_on_trusted_proxy_header() {
    let mut config = test_config();
    config.client_ip_header = Some(HeaderName::from_static("cf-connecting-ip"));
    let app = router_with_config(config, AllowGuard);

    // Distinct clients behind the proxy each get their own bucket
    let distinct: Vec<_> = (0..8)
        .map(|i| vec![("cf-connecting-ip", format!("198.51.100.{i}"))])
        .collect();
    let statuses = failed_logins(&app, &distinct).await;
    assert!(statuses.iter().all(|s| *s == StatusCode::UNAUTHORIZED), "{statuses:?}");

    // One client rotating x-forwarded-for still shares its bucket
    let rotating: Vec<_> = (0..8)
        .map(|i| {
            vec![
                ("cf-connecting-ip", "198.51.100.200".to_string()),
                ("x-forwarded-for", format!("192.0.2.{i}")),
            ]
        })
        .collect();
    let statuses = failed_logins(&app, &rotating).await;
    assert!(statuses.contains(&StatusCode::TOO_MANY_REQUESTS), "{statuses:?}");
}

// ============================================================================
// Admin pages
// ============================================================================

#[tokio::test]
async fn test_shell_redirects_to_dashboard_once() {
    let response = send(router_with_guard(AllowGuard), "GET", "/admin", None).await;
    let (status, headers, body) = read(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body.matches(r#"window.location.replace("/admin/dashboard")"#)
            .count(),
        1
    );

    // The inline script is allowed by the per-request nonce
    let csp = headers[header::CONTENT_SECURITY_POLICY].to_str().unwrap();
    let nonce = csp
        .split("'nonce-")
        .nth(1)
        .and_then(|rest| rest.split('\'').next())
        .unwrap();
    assert!(body.contains(&format!(r#"<script nonce="{nonce}">"#)));
}

#[tokio::test]
async fn test_shell_unauthenticated_goes_to_login() {
    let response = send(router(), "GET", "/admin", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/admin/login");
}

#[tokio::test]
async fn test_shell_passes_other_rejections_through() {
    let response = send(router_with_guard(DenyGuard::forbidden()), "GET", "/admin", None).await;
    let (status, _, body) = read(response).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, DenyGuard::SENTINEL);
}

#[tokio::test]
async fn test_dashboard_with_real_session() {
    let cookie = login().await;
    let response = send(router(), "GET", "/admin/dashboard", Some(&cookie)).await;
    let (status, _, body) = read(response).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Dashboard"));
    assert!(body.contains("Products loaded"));
}

#[tokio::test]
async fn test_dashboard_unauthenticated_goes_to_login() {
    let response = send(router(), "GET", "/admin/dashboard", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_login_page_renders() {
    let response = send(router(), "GET", "/admin/login", None).await;
    let (status, _, body) = read(response).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("admin-login-form"));
}
