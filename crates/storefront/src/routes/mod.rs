//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (catalog loaded)
//!
//! # Products
//! GET  /products               - Product listing (?category=)
//! GET  /products/{handle}      - Product detail
//!
//! # Cart (cookie)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (303 to /cart)
//! GET  /cart/count             - Item count JSON
//! POST /api/cart/reset         - Empty the cart
//!
//! # Gift cards
//! POST /api/gift-cards         - Purchase request (202, stub)
//!
//! # Admin
//! GET  /admin                  - Redirect shell (guarded)
//! GET  /admin/dashboard        - Dashboard (guarded)
//! GET  /admin/login            - Login form
//! GET  /api/admin/session      - Session check (guarded)
//! POST /api/admin/logout       - End session (guarded)
//! POST /api/admin/login        - Start session (rate limited)
//!
//! # Diagnostics
//! GET  /api/env-check          - Configuration summary
//! ```

pub mod admin;
pub mod api;
pub mod cart;
pub mod home;
pub mod products;

use axum::{
    Router,
    http::HeaderName,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{handle}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/count", get(cart::count))
}

/// Create the admin page routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::shell))
        .route("/dashboard", get(admin::dashboard))
        .route("/login", get(admin::login_page))
}

/// Create the JSON API router.
///
/// `client_ip_header` is the proxy header the rate limiters trust.
pub fn api_routes(client_ip_header: Option<&HeaderName>) -> Router<AppState> {
    let login = Router::new()
        .route("/admin/login", post(api::admin::login))
        .layer(auth_rate_limiter(client_ip_header.cloned()));

    let public = Router::new()
        .route("/gift-cards", post(api::gift_cards::purchase))
        .route("/cart/reset", post(cart::reset))
        .layer(api_rate_limiter(client_ip_header.cloned()));

    Router::new()
        .route("/admin/session", get(api::admin::session))
        .route("/admin/logout", post(api::admin::logout))
        .route("/env-check", get(api::diagnostics::env_check))
        .merge(login)
        .merge(public)
}

/// Create all routes for the storefront.
pub fn routes(client_ip_header: Option<&HeaderName>) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/admin", admin_routes())
        .nest("/api", api_routes(client_ip_header))
}
