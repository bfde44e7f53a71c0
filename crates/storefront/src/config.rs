//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CELLAR_BASE_URL` - Public URL for the storefront
//! - `CELLAR_SESSION_SECRET` - Admin session signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `CELLAR_HOST` - Bind address (default: 127.0.0.1)
//! - `CELLAR_PORT` - Listen port (default: 3000)
//! - `CELLAR_ADMIN_PASSWORD_HASH` - Argon2 PHC hash of the admin password
//!   (admin login is disabled when unset)
//! - `CELLAR_ADMIN_SESSION_HOURS` - Admin session lifetime (default: 12)
//! - `CELLAR_CONTENT_DIR` - Catalog content directory (default: crates/storefront/content)
//! - `CELLAR_STATIC_DIR` - Static asset directory (default: crates/storefront/static)
//! - `CELLAR_CLIENT_IP_HEADER` - Header the reverse proxy overwrites with the
//!   client address, e.g. `cf-connecting-ip` (rate limiters key on the socket
//!   peer when unset)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use axum::http::HeaderName;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_ADMIN_SESSION_HOURS: i64 = 12;
const MAX_ADMIN_SESSION_HOURS: i64 = 24 * 7;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Admin session signing secret
    pub session_secret: SecretString,
    /// Admin login configuration
    pub admin: AdminConfig,
    /// Directory holding catalog markdown (`products/*.md`)
    pub content_dir: PathBuf,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Proxy-set header carrying the client IP; `None` keys on the peer
    pub client_ip_header: Option<HeaderName>,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
}

/// Admin login configuration.
///
/// Implements `Debug` manually to redact the password hash.
#[derive(Clone)]
pub struct AdminConfig {
    /// Argon2 PHC string for the admin password; `None` disables login
    pub password_hash: Option<SecretString>,
    /// Lifetime of an admin session token, in hours
    pub session_hours: i64,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field(
                "password_hash",
                &self.password_hash.as_ref().map(|_| "[REDACTED]"),
            )
            .field("session_hours", &self.session_hours)
            .finish()
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            password_hash: None,
            session_hours: DEFAULT_ADMIN_SESSION_HOURS,
        }
    }
}

/// Sentry error tracking configuration.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    /// DSN; Sentry is disabled when unset
    pub dsn: Option<String>,
    /// Environment name reported with events
    pub environment: Option<String>,
    /// Error event sample rate (0.0 - 1.0)
    pub sample_rate: f32,
    /// Transaction sample rate (0.0 - 1.0)
    pub traces_sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: None,
            sample_rate: 1.0,
            traces_sample_rate: 0.0,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("CELLAR_HOST", "127.0.0.1")?;
        let port = parse_env("CELLAR_PORT", "3000")?;
        let base_url = get_base_url("CELLAR_BASE_URL")?;
        let session_secret = get_validated_secret("CELLAR_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "CELLAR_SESSION_SECRET")?;

        let admin = AdminConfig::from_env()?;
        let content_dir = PathBuf::from(get_env_or_default(
            "CELLAR_CONTENT_DIR",
            "crates/storefront/content",
        ));
        let static_dir = PathBuf::from(get_env_or_default(
            "CELLAR_STATIC_DIR",
            "crates/storefront/static",
        ));
        let client_ip_header = get_optional_env("CELLAR_CLIENT_IP_HEADER")
            .map(|name| parse_header_name(&name, "CELLAR_CLIENT_IP_HEADER"))
            .transpose()?;
        let sentry = SentryConfig::from_env()?;

        Ok(Self {
            host,
            port,
            base_url,
            session_secret,
            admin,
            content_dir,
            static_dir,
            client_ip_header,
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Environment name for diagnostics and Sentry.
    #[must_use]
    pub fn environment(&self) -> &str {
        self.sentry.environment.as_deref().unwrap_or("development")
    }
}

impl AdminConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let password_hash = match get_optional_env("CELLAR_ADMIN_PASSWORD_HASH") {
            Some(hash) => {
                validate_password_hash(&hash, "CELLAR_ADMIN_PASSWORD_HASH")?;
                Some(SecretString::from(hash))
            }
            None => None,
        };

        let session_hours: i64 = parse_env(
            "CELLAR_ADMIN_SESSION_HOURS",
            &DEFAULT_ADMIN_SESSION_HOURS.to_string(),
        )?;
        if !(1..=MAX_ADMIN_SESSION_HOURS).contains(&session_hours) {
            return Err(ConfigError::InvalidEnvVar(
                "CELLAR_ADMIN_SESSION_HOURS".to_string(),
                format!("must be between 1 and {MAX_ADMIN_SESSION_HOURS}"),
            ));
        }

        Ok(Self {
            password_hash,
            session_hours,
        })
    }
}

impl SentryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            dsn: get_optional_env("SENTRY_DSN"),
            environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get the public base URL, requiring an http(s) URL with a host.
fn get_base_url(key: &str) -> Result<String, ConfigError> {
    let raw = get_required_env(key)?;
    let url = Url::parse(&raw)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an http(s) URL with a host".to_string(),
        ));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

/// Parse a header name, normalizing case.
fn parse_header_name(value: &str, var_name: &str) -> Result<HeaderName, ConfigError> {
    HeaderName::from_bytes(value.trim().to_ascii_lowercase().as_bytes())
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Validate that a value looks like an Argon2 PHC string.
fn validate_password_hash(hash: &str, var_name: &str) -> Result<(), ConfigError> {
    argon2::PasswordHash::new(hash).map_err(|e| {
        ConfigError::InvalidEnvVar(var_name.to_string(), format!("not a PHC hash: {e}"))
    })?;
    if !hash.starts_with("$argon2") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must be an argon2 hash".to_string(),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
