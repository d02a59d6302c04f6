//! Error types for token and credential handling

use thiserror::Error;

/// Why a presented token was rejected.
///
/// Both kinds deny access. The distinction exists for diagnostics and
/// must not be echoed back to clients.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed or its signature does not verify")]
    Malformed,

    #[error("token is expired")]
    Expired,
}

/// Authentication error types
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing token")]
    MissingToken,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Signing failure: {0}")]
    SigningFailure(String),

    #[error("Hashing failure: {0}")]
    HashingFailure(String),
}
