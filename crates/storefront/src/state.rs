//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::middleware::auth::{AdminGuard, SignedSessionGuard};
use crate::services::auth::SessionSigner;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc` and immutable after startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    signer: SessionSigner,
    admin_guard: Arc<dyn AdminGuard>,
}

impl AppState {
    /// Create state with the production admin guard.
    #[must_use]
    pub fn new(config: StorefrontConfig, catalog: Catalog) -> Self {
        let signer = session_signer(&config);
        let guard = Arc::new(SignedSessionGuard::new(signer.clone()));
        Self::build(config, catalog, signer, guard)
    }

    /// Create state with a custom admin guard.
    #[must_use]
    pub fn with_guard(
        config: StorefrontConfig,
        catalog: Catalog,
        admin_guard: Arc<dyn AdminGuard>,
    ) -> Self {
        let signer = session_signer(&config);
        Self::build(config, catalog, signer, admin_guard)
    }

    fn build(
        config: StorefrontConfig,
        catalog: Catalog,
        signer: SessionSigner,
        admin_guard: Arc<dyn AdminGuard>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                signer,
                admin_guard,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Signer used to mint admin session tokens.
    #[must_use]
    pub fn signer(&self) -> &SessionSigner {
        &self.inner.signer
    }

    /// Guard every admin handler consults first.
    #[must_use]
    pub fn admin_guard(&self) -> &dyn AdminGuard {
        self.inner.admin_guard.as_ref()
    }
}

fn session_signer(config: &StorefrontConfig) -> SessionSigner {
    SessionSigner::new(
        config.session_secret.clone(),
        chrono::Duration::hours(config.admin.session_hours),
    )
}
