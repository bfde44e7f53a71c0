//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Returns the build-time content hash of `main.css`.
///
/// Usage in templates: `/static/css/main.css?v={{ ""|css_hash }}`
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

/// Returns the build-time content hash of `admin.js`.
///
/// Usage in templates: `/static/js/admin.js?v={{ ""|admin_js_hash }}`
#[askama::filter_fn]
pub fn admin_js_hash(
    _value: impl Display,
    _env: &dyn askama::Values,
) -> askama::Result<&'static str> {
    Ok(env!("ADMIN_JS_HASH"))
}

/// Formats an alcohol percentage, e.g. `13.5` as `13.5% ABV`.
///
/// Usage in templates: `{{ abv|percent_abv }}`
#[askama::filter_fn]
pub fn percent_abv(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format!("{value}% ABV"))
}
