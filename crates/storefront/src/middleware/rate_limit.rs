//! Rate limiting using governor and `tower_governor`.
//!
//! - `auth_rate_limiter`: admin login (~10/min, burst 5)
//! - `api_rate_limiter`: public JSON endpoints (~60/min, burst 30)
//!
//! Requests are keyed on the socket peer. Behind a reverse proxy every peer
//! is the proxy, so `CELLAR_CLIENT_IP_HEADER` names the single header that
//! proxy overwrites with the real client address (`cf-connecting-ip`,
//! `fly-client-ip`, `x-real-ip`). No other header is ever read: anything a
//! client can append to, such as `x-forwarded-for`, would mint a fresh
//! bucket per request.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderName, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Key extractor using the trusted proxy header if configured, then the
/// socket peer.
#[derive(Clone, Debug, Default)]
pub struct ClientIpKeyExtractor {
    trusted_header: Option<HeaderName>,
}

impl ClientIpKeyExtractor {
    /// Key on `trusted_header` when present and parseable, else the peer.
    #[must_use]
    pub const fn new(trusted_header: Option<HeaderName>) -> Self {
        Self { trusted_header }
    }
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        self.trusted_header
            .as_ref()
            .and_then(|name| req.headers().get(name))
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn limiter(
    trusted_header: Option<HeaderName>,
    replenish_secs: u64,
    burst: u32,
) -> Option<RateLimiterLayer> {
    GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor::new(trusted_header))
        .per_second(replenish_secs)
        .burst_size(burst)
        .finish()
        .map(|config| GovernorLayer::new(Arc::new(config)))
}

/// Rate limiter for the admin login: one token every 6 seconds, burst of 5.
///
/// # Panics
///
/// Never in practice: the constants are non-zero, which is all
/// `GovernorConfigBuilder::finish` requires.
#[must_use]
#[allow(clippy::expect_used)]
pub fn auth_rate_limiter(trusted_header: Option<HeaderName>) -> RateLimiterLayer {
    limiter(trusted_header, 6, 5).expect("non-zero auth rate limit")
}

/// Rate limiter for public JSON endpoints: one token per second, burst of 30.
///
/// # Panics
///
/// Never in practice, see [`auth_rate_limiter`].
#[must_use]
#[allow(clippy::expect_used)]
pub fn api_rate_limiter(trusted_header: Option<HeaderName>) -> RateLimiterLayer {
    limiter(trusted_header, 1, 30).expect("non-zero api rate limit")
}
