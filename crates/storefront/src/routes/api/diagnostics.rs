//! Environment diagnostics.
//!
//! Reports configuration facts an operator needs when a deploy misbehaves.
//! Only booleans and public values: secrets are never echoed.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::state::AppState;

/// `GET /api/env-check` response body.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct EnvReport {
    pub environment: String,
    pub version: &'static str,
    pub base_url: String,
    pub secure_cookies: bool,
    pub sentry_configured: bool,
    pub admin_login_configured: bool,
    /// Proxy header rate limiters key on; `None` means the socket peer
    pub client_ip_header: Option<String>,
    pub products_loaded: usize,
}

impl EnvReport {
    /// Summarize the running configuration.
    #[must_use]
    pub fn collect(state: &AppState) -> Self {
        let config = state.config();
        Self {
            environment: config.environment().to_string(),
            version: env!("CARGO_PKG_VERSION"),
            base_url: config.base_url.clone(),
            secure_cookies: config.secure_cookies(),
            sentry_configured: config.sentry.dsn.is_some(),
            admin_login_configured: config.admin.password_hash.is_some(),
            client_ip_header: config
                .client_ip_header
                .as_ref()
                .map(|name| name.as_str().to_string()),
            products_loaded: state.catalog().len(),
        }
    }
}

/// `GET /api/env-check`
#[instrument(skip(state))]
pub async fn env_check(State(state): State<AppState>) -> Json<EnvReport> {
    Json(EnvReport::collect(&state))
}
