//! User store boundary
//!
//! The service talks to persistence only through [`UserStore`]. Every call
//! is bounded by a caller-supplied deadline via [`with_deadline`].

use crate::auth::Identity;
use async_trait::async_trait;
use authgate_shared::{TokenPair, UserResponse};
use chrono::{DateTime, Utc};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// User record as stored
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRecord {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub user_type: String,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Identity claims to issue tokens for this user
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role: self.user_type.clone(),
        }
    }

    pub fn with_tokens(mut self, pair: &TokenPair, updated_at: DateTime<Utc>) -> Self {
        self.token = Some(pair.access_token.clone());
        self.refresh_token = Some(pair.refresh_token.clone());
        self.updated_at = updated_at;
        self
    }
}

impl From<UserRecord> for UserResponse {
    fn from(record: UserRecord) -> Self {
        Self {
            user_id: record.user_id,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            phone: record.phone,
            user_type: record.user_type,
            token: record.token,
            refresh_token: record.refresh_token,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Lookup keys the store supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    Email,
    Phone,
    UserId,
}

impl UserField {
    pub fn column(&self) -> &'static str {
        match self {
            UserField::Email => "email",
            UserField::Phone => "phone",
            UserField::UserId => "user_id",
        }
    }

    /// Read this field from a record
    pub fn value_of<'a>(&self, record: &'a UserRecord) -> &'a str {
        match self {
            UserField::Email => &record.email,
            UserField::Phone => &record.phone,
            UserField::UserId => &record.user_id,
        }
    }
}

impl fmt::Display for UserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Token bookkeeping written after each issuance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFields {
    pub access_token: String,
    pub refresh_token: String,
    pub updated_at: DateTime<Utc>,
}

/// User store failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("a user with this {0} already exists")]
    Duplicate(UserField),

    #[error("store call exceeded its {0:?} deadline")]
    Timeout(Duration),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistent user records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Number of users whose `field` equals `value`
    async fn count_by_field(&self, field: UserField, value: &str) -> Result<u64, StoreError>;

    async fn find_by_field(&self, field: UserField, value: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Insert a new user. Email and phone are unique; a clash is
    /// `StoreError::Duplicate` and leaves the store unchanged.
    async fn insert_user(&self, record: &UserRecord) -> Result<(), StoreError>;

    /// Overwrite the stored token pair. Returns whether a user matched.
    async fn upsert_token_fields(&self, user_id: &str, fields: &TokenFields) -> Result<bool, StoreError>;

    /// One page of users in creation order, plus the total count
    async fn list_users(&self, offset: u64, limit: u64) -> Result<(Vec<UserRecord>, u64), StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Run a store call, giving up once `deadline` has elapsed.
///
/// The call's future is dropped on expiry, which cancels it.
pub async fn with_deadline<T, F>(deadline: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(deadline, call)
        .await
        .map_err(|_| StoreError::Timeout(deadline))?
}
