//! Admin HTML pages.
//!
//! `/admin` is a redirect shell: once the guard allows the request, the
//! page replaces its own history entry with `/admin/dashboard`. Pages send
//! unauthenticated browsers to the login form instead of returning the
//! guard's JSON rejection.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use tracing::instrument;

use crate::filters;
use crate::middleware::auth::AuthResult;
use crate::middleware::cookies::JarCookieStore;
use crate::middleware::csp::CspNonce;
use crate::routes::api::diagnostics::EnvReport;
use crate::state::AppState;

/// Dashboard route the shell forwards to.
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

/// Login page route.
pub const LOGIN_PATH: &str = "/admin/login";

/// Redirect shell template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/redirect.html")]
pub struct RedirectShellTemplate {
    pub target: &'static str,
    pub nonce: String,
}

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub report: EnvReport,
}

/// Admin login template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate;

/// Run the guard for an HTML page.
///
/// `None` means authorized. A 401 rejection becomes a redirect to the login
/// page; any other rejection is passed through.
fn guard_page(state: &AppState, jar: CookieJar) -> Option<Response> {
    let store = JarCookieStore::new(jar);
    match state.admin_guard().check(&store) {
        AuthResult::Authorized => None,
        AuthResult::Unauthorized(response) if response.status() == StatusCode::UNAUTHORIZED => {
            Some(Redirect::to(LOGIN_PATH).into_response())
        }
        AuthResult::Unauthorized(response) => Some(response),
    }
}

/// `GET /admin`
#[instrument(skip(state, jar, nonce))]
pub async fn shell(State(state): State<AppState>, jar: CookieJar, nonce: CspNonce) -> Response {
    if let Some(rejection) = guard_page(&state, jar) {
        return rejection;
    }

    RedirectShellTemplate {
        target: DASHBOARD_PATH,
        nonce: nonce.0,
    }
    .into_response()
}

/// `GET /admin/dashboard`
#[instrument(skip(state, jar))]
pub async fn dashboard(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(rejection) = guard_page(&state, jar) {
        return rejection;
    }

    DashboardTemplate {
        report: EnvReport::collect(&state),
    }
    .into_response()
}

/// `GET /admin/login`
pub async fn login_page() -> impl IntoResponse {
    LoginTemplate
}
