//! Admin authentication service.
//!
//! Password verification (Argon2) and signed admin session tokens.
//!
//! # Token format
//!
//! ```text
//! {expires_unix}.{nonce_hex}.{signature_hex}
//! ```
//!
//! `signature = HMAC-SHA256(session_secret, "{expires_unix}.{nonce_hex}")`.
//! Tokens carry no identity: there is a single admin role.

mod error;

pub use error::{AuthError, TokenError};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Nonce length in bytes (hex-encoded in the token).
const NONCE_BYTES: usize = 16;

/// Mints and validates admin session tokens.
#[derive(Clone)]
pub struct SessionSigner {
    secret: SecretString,
    ttl: Duration,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SessionSigner {
    /// Create a signer for tokens valid for `ttl`.
    #[must_use]
    pub const fn new(secret: SecretString, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    /// Token lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a new token expiring `ttl` after `now`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidKey` if the MAC rejects the secret.
    pub fn issue(&self, now: DateTime<Utc>) -> Result<String, TokenError> {
        let mut nonce = [0u8; NONCE_BYTES];
        rand::rng().fill_bytes(&mut nonce);

        let expires = (now + self.ttl).timestamp();
        let payload = format!("{expires}.{}", hex::encode(nonce));
        let signature = hex::encode(self.mac(&payload)?.finalize().into_bytes());

        Ok(format!("{payload}.{signature}"))
    }

    /// Validate a token, returning its expiry time.
    ///
    /// # Errors
    ///
    /// Returns `Malformed`, `BadSignature` or `Expired` describing why the
    /// token was refused.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, TokenError> {
        let (payload, signature) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;
        let (expires, nonce) = payload.split_once('.').ok_or(TokenError::Malformed)?;

        if nonce.len() != NONCE_BYTES * 2 || !nonce.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TokenError::Malformed);
        }
        let signature = hex::decode(signature).map_err(|_| TokenError::Malformed)?;

        // Constant-time comparison
        self.mac(payload)?
            .verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let expires = expires
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or(TokenError::Malformed)?;

        if expires <= now {
            return Err(TokenError::Expired);
        }

        Ok(expires)
    }

    fn mac(&self, payload: &str) -> Result<HmacSha256, TokenError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| TokenError::InvalidKey)?;
        mac.update(payload.as_bytes());
        Ok(mac)
    }
}

/// Hash a password using Argon2id.
///
/// Used by operators to produce `CELLAR_ADMIN_PASSWORD_HASH`.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a PHC hash.
///
/// This is CPU-heavy; call it from `spawn_blocking` in async code.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch and
/// `AuthError::PasswordHash` if the stored hash cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
