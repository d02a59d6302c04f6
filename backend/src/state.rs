//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! # Design Principles
//!
//! 1. **Pre-compute expensive resources**: JWT keys are derived once
//! 2. **Cheap cloning**: All fields use Arc or are already Clone-cheap
//! 3. **Immutable after creation**: State is read-only during request handling
//! 4. **No globals**: the signing secret and store handle live here only

use crate::auth::{JwtService, PasswordService};
use crate::config::AppConfig;
use crate::repositories::UserStore;
use crate::services::TokenStore;
use authgate_shared::AuthError;
use std::sync::Arc;
use std::time::Duration;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// User record store
    pub store: Arc<dyn UserStore>,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Pre-initialized JWT service with cached keys
    pub jwt: JwtService,
    /// Password hashing at the configured cost
    pub passwords: PasswordService,
    /// Token pair bookkeeping
    pub tokens: TokenStore,
}

impl AppState {
    /// Create a new application state
    ///
    /// Fails with `SigningFailure` when the JWT secret is unusable; the
    /// process cannot serve authenticated routes without it.
    pub fn new(store: Arc<dyn UserStore>, config: AppConfig) -> Result<Self, AuthError> {
        let jwt = JwtService::new(
            &config.jwt.secret,
            config.jwt.access_token_expiry_secs,
            config.jwt.refresh_token_expiry_secs,
        )?;
        let passwords = PasswordService::new(config.password.bcrypt_cost);
        let tokens = TokenStore::new(store.clone(), config.store.timeout());

        Ok(Self {
            store,
            config: Arc::new(config),
            jwt,
            passwords,
            tokens,
        })
    }

    /// Get a reference to the user store
    #[inline]
    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    /// Get a reference to the JWT service
    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Deadline for each store round-trip
    #[inline]
    pub fn store_timeout(&self) -> Duration {
        self.config.store.timeout()
    }
}
