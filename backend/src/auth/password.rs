//! Password hashing using bcrypt
//!
//! Provides salted, deliberately slow password hashing and verification.
//!
//! # Performance Considerations
//!
//! At the default cost of 14 a single hash takes on the order of a second.
//! Async callers must use the `*_async` variants, which run the work on
//! the blocking thread pool.

use authgate_shared::AuthError;

/// Reason reported for every failed verification.
pub const CREDENTIAL_INCORRECT: &str = "credential incorrect";

/// Outcome of checking a candidate password against a stored hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    pub matches: bool,
    pub reason: Option<&'static str>,
}

impl Verification {
    fn matched() -> Self {
        Self {
            matches: true,
            reason: None,
        }
    }

    fn mismatched() -> Self {
        Self {
            matches: false,
            reason: Some(CREDENTIAL_INCORRECT),
        }
    }
}

/// Password hashing service
///
/// Holds only the work factor, so it is `Copy` and free to pass around.
#[derive(Debug, Clone, Copy)]
pub struct PasswordService {
    cost: u32,
}

impl PasswordService {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a password using bcrypt (blocking operation)
    ///
    /// Fails only when the cost is out of range or the OS RNG fails.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        bcrypt::hash(password, self.cost).map_err(|e| AuthError::HashingFailure(e.to_string()))
    }

    /// Hash a password asynchronously (non-blocking)
    ///
    /// Spawns the CPU-intensive work on a blocking thread pool,
    /// preventing it from blocking the async runtime.
    pub async fn hash_async(&self, password: String) -> Result<String, AuthError> {
        let service = *self;
        tokio::task::spawn_blocking(move || service.hash(&password))
            .await
            .map_err(|e| AuthError::HashingFailure(format!("Task join error: {}", e)))?
    }

    /// Verify a password against a hash (blocking operation)
    ///
    /// A malformed stored hash reports the same generic mismatch as a
    /// wrong password.
    pub fn verify(candidate: &str, stored_hash: &str) -> Verification {
        match bcrypt::verify(candidate, stored_hash) {
            Ok(true) => Verification::matched(),
            Ok(false) | Err(_) => Verification::mismatched(),
        }
    }

    /// Verify a password asynchronously (non-blocking)
    pub async fn verify_async(candidate: String, stored_hash: String) -> Result<Verification, AuthError> {
        tokio::task::spawn_blocking(move || Self::verify(&candidate, &stored_hash))
            .await
            .map_err(|e| AuthError::HashingFailure(format!("Task join error: {}", e)))
    }
}
