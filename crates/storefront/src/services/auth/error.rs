//! Authentication error types.

use thiserror::Error;

/// Errors raised while validating an admin session token.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// The token does not have the `expires.nonce.signature` shape.
    #[error("malformed session token")]
    Malformed,

    /// The signature does not match the payload.
    #[error("session token signature mismatch")]
    BadSignature,

    /// The token is past its expiry time.
    #[error("session token expired")]
    Expired,

    /// The signing key was rejected by the MAC implementation.
    #[error("invalid signing key")]
    InvalidKey,
}

/// Errors that can occur during admin authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Stored hash could not be parsed or a new hash could not be produced.
    #[error("password hashing error")]
    PasswordHash,

    /// Session token problem.
    #[error("token error: {0}")]
    Token(#[from] TokenError),
}
