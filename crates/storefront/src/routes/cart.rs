//! Cart route handlers.
//!
//! The cart is stored entirely in the `cellar_cart` cookie (see
//! [`crate::models::cart`]); prices are always looked up from the catalog at
//! render time, never trusted from the cookie.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use cellar_door_core::{CurrencyCode, Price};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::cookies::{CookieStore, JarCookieStore};
use crate::models::cart::{CART_COOKIE, Cart};
use crate::state::AppState;

/// Cart cookie lifetime.
const CART_COOKIE_DAYS: i64 = 30;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub handle: String,
    pub title: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    /// Price a cart against the catalog. Lines for products no longer
    /// listed are skipped.
    #[must_use]
    pub fn build(cart: &Cart, catalog: &Catalog) -> Self {
        let mut subtotal = Price::zero(CurrencyCode::USD);
        let mut items = Vec::new();

        for line in cart.lines() {
            let Some(product) = catalog.get(&line.handle) else {
                continue;
            };
            let line_price = product.price.times(line.quantity);
            match subtotal.checked_add(line_price) {
                Some(total) => subtotal = total,
                None => {
                    tracing::warn!(handle = %line.handle, "Skipping cart line in foreign currency");
                    continue;
                }
            }
            items.push(CartItemView {
                handle: product.handle.clone(),
                title: product.title.clone(),
                quantity: line.quantity,
                price: product.price.to_string(),
                line_price: line_price.to_string(),
            });
        }

        Self {
            item_count: items.iter().map(|i| i.quantity).sum(),
            items,
            subtotal: subtotal.to_string(),
        }
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Read the cart from the request cookies.
fn read_cart(jar: &CookieJar) -> Cart {
    jar.get(CART_COOKIE)
        .map(|cookie| Cart::parse(cookie.value()))
        .unwrap_or_default()
}

/// Build the cart cookie for the response.
fn cart_cookie(cart: &Cart, config: &StorefrontConfig) -> Cookie<'static> {
    Cookie::build((CART_COOKIE, cart.encode()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies())
        .max_age(time::Duration::days(CART_COOKIE_DAYS))
        .build()
}

/// Display the cart page.
#[instrument(skip(state, jar))]
pub async fn show(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let cart = read_cart(&jar);
    CartShowTemplate {
        cart: CartView::build(&cart, state.catalog()),
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub handle: String,
    pub quantity: Option<u32>,
}

/// Add a product to the cart and redirect to the cart page.
#[instrument(skip(state, jar, form))]
pub async fn add(
    State(state): State<AppState>,
    jar: CookieJar,
    form: Result<Form<AddToCartForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let mut store = JarCookieStore::new(jar);
    let cart = add_to_cart(
        &mut store,
        state.catalog(),
        state.config(),
        &form.handle,
        form.quantity.unwrap_or(1),
    )?;

    add_breadcrumb("cart", "Added to cart", Some(&[("handle", form.handle.as_str())]));
    tracing::info!(handle = %form.handle, items = cart.item_count(), "Cart updated");

    Ok((store.into_jar(), Redirect::to("/cart")).into_response())
}

/// Merge `quantity` of `handle` into the cart cookie and return the new cart.
///
/// # Errors
///
/// - `AppError::NotFound` for a product not in the catalog
/// - `AppError::BadRequest` for a quantity or line count over the caps
/// - `AppError::Internal` if the cookie store fails
pub fn add_to_cart(
    cookies: &mut dyn CookieStore,
    catalog: &Catalog,
    config: &StorefrontConfig,
    handle: &str,
    quantity: u32,
) -> Result<Cart, AppError> {
    if catalog.get(handle).is_none() {
        return Err(AppError::NotFound(format!("product {handle}")));
    }

    let mut cart = cookies
        .get(CART_COOKIE)
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map(|value| Cart::parse(&value))
        .unwrap_or_default();
    cart.add(handle, quantity)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    cookies
        .set(cart_cookie(&cart, config))
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(cart)
}

/// Cart item count for the header badge.
#[instrument(skip(jar))]
pub async fn count(jar: CookieJar) -> Json<serde_json::Value> {
    Json(json!({ "count": read_cart(&jar).item_count() }))
}

/// Empty the cart. Resetting an absent cart succeeds.
#[instrument(skip(jar))]
pub async fn reset(jar: CookieJar) -> Response {
    let mut store = JarCookieStore::new(jar);
    match store.remove(CART_COOKIE) {
        Ok(()) => {
            tracing::info!("Cart reset");
            (store.into_jar(), Json(json!({ "success": true }))).into_response()
        }
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Cart reset failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "server error" })),
            )
                .into_response()
        }
    }
}
