//! Token pair bookkeeping
//!
//! Records the latest pair issued to a user. The stored copy is never
//! consulted when validating tokens, so a failed write only costs the
//! audit trail and is not allowed to fail the login that triggered it.

use crate::repositories::{with_deadline, TokenFields, UserStore};
use authgate_shared::TokenPair;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Writes issued token pairs to the user store
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn UserStore>,
    deadline: Duration,
}

impl TokenStore {
    pub fn new(store: Arc<dyn UserStore>, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    /// Store `pair` as the user's current pair, replacing any earlier one.
    ///
    /// Returns whether the write landed. Failures are logged, not raised.
    pub async fn persist_pair(&self, user_id: &str, pair: &TokenPair, updated_at: DateTime<Utc>) -> bool {
        let fields = TokenFields {
            access_token: pair.access_token.clone(),
            refresh_token: pair.refresh_token.clone(),
            updated_at,
        };

        match with_deadline(self.deadline, self.store.upsert_token_fields(user_id, &fields)).await {
            Ok(true) => {
                debug!(user_id = %user_id, "Stored token pair");
                true
            }
            Ok(false) => {
                warn!(user_id = %user_id, "No user record to store token pair against");
                false
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to store token pair");
                false
            }
        }
    }
}
