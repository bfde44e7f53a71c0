//! Request-scoped cookie store.
//!
//! Handlers never touch `CookieJar` directly for session cookies; they go
//! through [`CookieStore`] so the guard and endpoints can be exercised with
//! fakes that fail on demand.

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;
use thiserror::Error;

/// Error raised by a cookie store backend.
#[derive(Debug, Error)]
pub enum CookieStoreError {
    /// The store could not be read.
    #[error("cookie store read failed: {0}")]
    Read(String),
    /// The store could not be written.
    #[error("cookie store write failed: {0}")]
    Write(String),
}

/// Key-value cookie access for the current request/response pair.
pub trait CookieStore {
    /// Read a cookie value by name.
    ///
    /// Returns `Ok(None)` when the cookie is absent or has an empty value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, name: &str) -> Result<Option<String>, CookieStoreError>;

    /// Add or replace a cookie in the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&mut self, cookie: Cookie<'static>) -> Result<(), CookieStoreError>;

    /// Delete a cookie. Deleting an absent cookie is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&mut self, name: &str) -> Result<(), CookieStoreError>;
}

/// [`CookieStore`] backed by the request's [`CookieJar`].
///
/// Changes are collected as jar deltas; return [`JarCookieStore::into_jar`]
/// alongside the response so they become `Set-Cookie` headers.
#[derive(Debug, Clone)]
pub struct JarCookieStore {
    jar: CookieJar,
}

impl JarCookieStore {
    /// Wrap the jar extracted from the current request.
    #[must_use]
    pub const fn new(jar: CookieJar) -> Self {
        Self { jar }
    }

    /// Hand the jar (with any pending changes) back for the response.
    #[must_use]
    pub fn into_jar(self) -> CookieJar {
        self.jar
    }
}

impl CookieStore for JarCookieStore {
    fn get(&self, name: &str) -> Result<Option<String>, CookieStoreError> {
        Ok(self
            .jar
            .get(name)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty()))
    }

    fn set(&mut self, cookie: Cookie<'static>) -> Result<(), CookieStoreError> {
        let jar = std::mem::replace(&mut self.jar, CookieJar::new());
        self.jar = jar.add(cookie);
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<(), CookieStoreError> {
        // Path must match the one the cookie was set with for browsers to drop it
        let jar = std::mem::replace(&mut self.jar, CookieJar::new());
        self.jar = jar.remove(Cookie::build(name.to_owned()).path("/"));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, header::COOKIE};

    fn store_with(cookie_header: &str) -> JarCookieStore {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie_header).unwrap());
        JarCookieStore::new(CookieJar::from_headers(&headers))
    }

    #[test]
    fn test_get_present_and_absent() {
        let store = store_with("cellar_cart=barolo-2019:2; other=1");
        assert_eq!(
            store.get("cellar_cart").unwrap().as_deref(),
            Some("barolo-2019:2")
        );
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn test_empty_value_reads_as_absent() {
        let store = store_with("cellar_cart=");
        assert_eq!(store.get("cellar_cart").unwrap(), None);
    }

    #[test]
    fn test_remove_then_get() {
        let mut store = store_with("cellar_cart=barolo-2019:2");
        store.remove("cellar_cart").unwrap();
        assert_eq!(store.get("cellar_cart").unwrap(), None);
    }

    #[test]
    fn test_remove_absent_is_ok() {
        let mut store = JarCookieStore::new(CookieJar::new());
        assert!(store.remove("cellar_cart").is_ok());
    }

    #[test]
    fn test_set_then_get() {
        let mut store = JarCookieStore::new(CookieJar::new());
        store.set(Cookie::new("cellar_cart", "chablis:1")).unwrap();
        assert_eq!(store.get("cellar_cart").unwrap().as_deref(), Some("chablis:1"));
    }
}
