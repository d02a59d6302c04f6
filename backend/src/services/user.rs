//! User service for signup, login and user lookups
//!
//! # Performance Optimizations
//!
//! - Password hashing/verification runs on blocking thread pool
//! - JWT service is shared from AppState (pre-computed keys)
//! - Every store call is bounded by the configured deadline

use crate::auth::PasswordService;
use crate::error::ApiError;
use crate::repositories::{with_deadline, UserField, UserRecord};
use crate::state::AppState;
use authgate_shared::validation::normalize_email;
use authgate_shared::{LoginRequest, PaginatedResponse, Pagination, SignupRequest, UserResponse};
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

/// User service for authentication operations
pub struct UserService;

impl UserService {
    /// Register a new user and hand back the record with its first token pair
    ///
    /// # Performance
    /// Password hashing is offloaded to blocking thread pool via `spawn_blocking`.
    /// Known duplicates are rejected before paying for the hash.
    pub async fn signup(state: &AppState, req: SignupRequest) -> Result<UserResponse, ApiError> {
        let email = normalize_email(&req.email);
        let phone = req.phone.trim().to_string();
        let deadline = state.store_timeout();

        // Fast path only; the store's uniqueness constraint is authoritative
        for (field, value) in [(UserField::Email, &email), (UserField::Phone, &phone)] {
            if with_deadline(deadline, state.store().count_by_field(field, value)).await? > 0 {
                debug!(field = %field, "Signup rejected: duplicate");
                return Err(ApiError::DuplicateCredentialTarget);
            }
        }

        let password_hash = state.passwords.hash_async(req.password).await?;

        let now = Utc::now();
        let record = UserRecord {
            user_id: Uuid::new_v4().to_string(),
            first_name: req.first_name,
            last_name: req.last_name,
            email,
            phone,
            password_hash,
            user_type: req.user_type.as_str().to_string(),
            token: None,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };

        let pair = state.jwt().issue_pair(&record.identity())?;
        let record = record.with_tokens(&pair, now);

        with_deadline(deadline, state.store().insert_user(&record)).await?;

        info!(user_id = %record.user_id, user_type = %record.user_type, "User signed up");
        Ok(record.into())
    }

    /// Login with email and password
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(state: &AppState, req: LoginRequest) -> Result<UserResponse, ApiError> {
        let email = normalize_email(&req.email);

        let user = with_deadline(
            state.store_timeout(),
            state.store().find_by_field(UserField::Email, &email),
        )
        .await?
        .ok_or_else(|| {
            debug!("Login rejected: unknown email");
            ApiError::CredentialMismatch
        })?;

        // Verify password on blocking thread pool (CPU-intensive)
        let verification = PasswordService::verify_async(req.password, user.password_hash.clone()).await?;
        if !verification.matches {
            debug!(user_id = %user.user_id, reason = ?verification.reason, "Login rejected");
            return Err(ApiError::CredentialMismatch);
        }

        let pair = state.jwt().issue_pair(&user.identity())?;
        let now = Utc::now();
        state.tokens.persist_pair(&user.user_id, &pair, now).await;

        info!(user_id = %user.user_id, "User logged in");
        Ok(user.with_tokens(&pair, now).into())
    }

    /// Fetch one user by id
    pub async fn get_user(state: &AppState, user_id: &str) -> Result<UserResponse, ApiError> {
        let user = with_deadline(
            state.store_timeout(),
            state.store().find_by_field(UserField::UserId, user_id),
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(UserResponse::from(user).without_tokens())
    }

    /// One page of users
    pub async fn list_users(
        state: &AppState,
        pagination: &Pagination,
    ) -> Result<PaginatedResponse<UserResponse>, ApiError> {
        let (users, total) = with_deadline(
            state.store_timeout(),
            state
                .store()
                .list_users(pagination.offset(), u64::from(pagination.per_page)),
        )
        .await?;

        let data = users
            .into_iter()
            .map(|user| UserResponse::from(user).without_tokens())
            .collect();
        Ok(PaginatedResponse::new(data, total, pagination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::repositories::{MemoryUserStore, StoreError, TokenFields, UserStore};
    use async_trait::async_trait;
    use authgate_shared::UserType;
    use axum::{http::StatusCode, response::IntoResponse};
    use rstest::rstest;
    use std::sync::Arc;

    fn test_state(store: MemoryUserStore) -> AppState {
        let mut config = AppConfig::default();
        config.password.bcrypt_cost = 4;
        AppState::new(Arc::new(store), config).unwrap()
    }

    fn signup_request(email: &str, phone: &str) -> SignupRequest {
        SignupRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password: "analytical-engine".to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            user_type: UserType::User,
        }
    }

    #[tokio::test]
    async fn test_signup_stores_hash_not_password() {
        let store = MemoryUserStore::new();
        let state = test_state(store.clone());

        let created = UserService::signup(&state, signup_request("a@x.com", "5550100")).await.unwrap();

        let stored = store
            .find_by_field(UserField::UserId, &created.user_id)
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored.password_hash, "analytical-engine");
        assert!(PasswordService::verify("analytical-engine", &stored.password_hash).matches);
        assert_eq!(stored.token, created.token);
    }

    #[tokio::test]
    async fn test_signup_normalizes_email() {
        let state = test_state(MemoryUserStore::new());
        let created = UserService::signup(&state, signup_request(" A@X.com", "5550100")).await.unwrap();
        assert_eq!(created.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_creates_no_second_record() {
        let store = MemoryUserStore::new();
        let state = test_state(store.clone());

        UserService::signup(&state, signup_request("a@x.com", "5550100")).await.unwrap();
        let second = UserService::signup(&state, signup_request("a@x.com", "5550199")).await;

        assert!(matches!(second, Err(ApiError::DuplicateCredentialTarget)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_phone_rejected() {
        let state = test_state(MemoryUserStore::new());

        UserService::signup(&state, signup_request("a@x.com", "5550100")).await.unwrap();
        let second = UserService::signup(&state, signup_request("b@x.com", "5550100")).await;

        assert!(matches!(second, Err(ApiError::DuplicateCredentialTarget)));
    }

    #[tokio::test]
    async fn test_login_issues_validating_token() {
        let state = test_state(MemoryUserStore::new());
        let created = UserService::signup(&state, signup_request("a@x.com", "5550100")).await.unwrap();

        let login = LoginRequest {
            email: "a@x.com".to_string(),
            password: "analytical-engine".to_string(),
        };
        let user = UserService::login(&state, login).await.unwrap();

        let claims = state.jwt().validate(user.token.as_deref().unwrap()).unwrap();
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.user_id, created.user_id);
    }

    #[tokio::test]
    async fn test_login_persists_new_pair() {
        let store = MemoryUserStore::new();
        let state = test_state(store.clone());
        UserService::signup(&state, signup_request("a@x.com", "5550100")).await.unwrap();

        let login = LoginRequest {
            email: "a@x.com".to_string(),
            password: "analytical-engine".to_string(),
        };
        let user = UserService::login(&state, login).await.unwrap();

        let stored = store.find_by_field(UserField::Email, "a@x.com").await.unwrap().unwrap();
        assert_eq!(stored.token, user.token);
        assert_eq!(stored.refresh_token, user.refresh_token);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_alike() {
        let state = test_state(MemoryUserStore::new());
        UserService::signup(&state, signup_request("a@x.com", "5550100")).await.unwrap();

        let wrong_password = UserService::login(
            &state,
            LoginRequest {
                email: "a@x.com".to_string(),
                password: "difference-engine".to_string(),
            },
        )
        .await;
        let unknown_email = UserService::login(
            &state,
            LoginRequest {
                email: "b@x.com".to_string(),
                password: "analytical-engine".to_string(),
            },
        )
        .await;

        assert!(matches!(wrong_password, Err(ApiError::CredentialMismatch)));
        assert!(matches!(unknown_email, Err(ApiError::CredentialMismatch)));
    }

    #[tokio::test]
    async fn test_get_user_hides_tokens() {
        let state = test_state(MemoryUserStore::new());
        let created = UserService::signup(&state, signup_request("a@x.com", "5550100")).await.unwrap();
        assert!(created.token.is_some());

        let fetched = UserService::get_user(&state, &created.user_id).await.unwrap();
        assert_eq!(fetched.email, "a@x.com");
        assert!(fetched.token.is_none());
        assert!(fetched.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_get_unknown_user_is_not_found() {
        let state = test_state(MemoryUserStore::new());
        let result = UserService::get_user(&state, "missing").await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_users_paginates() {
        let state = test_state(MemoryUserStore::new());
        for i in 0..3 {
            UserService::signup(&state, signup_request(&format!("{}@x.com", i), &format!("555010{}", i)))
                .await
                .unwrap();
        }

        let page = UserService::list_users(&state, &Pagination { page: 2, per_page: 2 })
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].email, "2@x.com");
    }

    /// How a wrapped store call misbehaves
    #[derive(Clone, Copy)]
    enum Fault {
        None,
        Stall,
        Down,
    }

    impl Fault {
        async fn apply(self) -> Result<(), StoreError> {
            match self {
                Fault::None => Ok(()),
                Fault::Stall => std::future::pending().await,
                Fault::Down => Err(StoreError::Unavailable("connection refused".to_string())),
            }
        }
    }

    /// Memory store with injectable faults on lookups and token writes
    struct FaultyStore {
        inner: MemoryUserStore,
        find: Fault,
        upsert: Fault,
    }

    #[async_trait]
    impl UserStore for FaultyStore {
        async fn count_by_field(&self, field: UserField, value: &str) -> Result<u64, StoreError> {
            self.inner.count_by_field(field, value).await
        }

        async fn find_by_field(&self, field: UserField, value: &str) -> Result<Option<UserRecord>, StoreError> {
            self.find.apply().await?;
            self.inner.find_by_field(field, value).await
        }

        async fn insert_user(&self, record: &UserRecord) -> Result<(), StoreError> {
            self.inner.insert_user(record).await
        }

        async fn upsert_token_fields(&self, user_id: &str, fields: &TokenFields) -> Result<bool, StoreError> {
            self.upsert.apply().await?;
            self.inner.upsert_token_fields(user_id, fields).await
        }

        async fn list_users(&self, offset: u64, limit: u64) -> Result<(Vec<UserRecord>, u64), StoreError> {
            self.inner.list_users(offset, limit).await
        }

        async fn health_check(&self) -> Result<(), StoreError> {
            self.inner.health_check().await
        }
    }

    fn faulty_state(inner: MemoryUserStore, find: Fault, upsert: Fault) -> AppState {
        let mut config = AppConfig::default();
        config.password.bcrypt_cost = 4;
        config.store.timeout_secs = 2;
        AppState::new(Arc::new(FaultyStore { inner, find, upsert }), config).unwrap()
    }

    fn login_request() -> LoginRequest {
        LoginRequest {
            email: "a@x.com".to_string(),
            password: "analytical-engine".to_string(),
        }
    }

    #[rstest]
    #[case::stalled(Fault::Stall)]
    #[case::unavailable(Fault::Down)]
    #[tokio::test(start_paused = true)]
    async fn test_login_survives_failed_token_write(#[case] upsert: Fault) {
        let memory = MemoryUserStore::new();
        let state = faulty_state(memory.clone(), Fault::None, upsert);
        let created = UserService::signup(&state, signup_request("a@x.com", "5550100")).await.unwrap();

        let logged_in = UserService::login(&state, login_request()).await.unwrap();

        let token = logged_in.token.expect("login returns an access token");
        assert!(logged_in.refresh_token.is_some());
        assert_eq!(state.jwt().validate(&token).unwrap().user_id, created.user_id);

        // The write never landed, so the signup pair is still the stored one
        let stored = memory
            .find_by_field(UserField::UserId, &created.user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.token, created.token);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_lookup_times_out_login() {
        let memory = MemoryUserStore::new();
        let seeded = test_state(memory.clone());
        UserService::signup(&seeded, signup_request("a@x.com", "5550100")).await.unwrap();

        let state = faulty_state(memory, Fault::Stall, Fault::None);
        let result = UserService::login(&state, login_request()).await;

        assert!(matches!(result, Err(ApiError::StoreTimeout)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_lookup_times_out_get_user() {
        let state = faulty_state(MemoryUserStore::new(), Fault::Stall, Fault::None);
        let result = UserService::get_user(&state, "u1").await;

        let err = result.unwrap_err();
        assert!(matches!(err, ApiError::StoreTimeout));
        assert_eq!(err.into_response().status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_unavailable_lookup_fails_login_and_get_user() {
        let state = faulty_state(MemoryUserStore::new(), Fault::Down, Fault::None);

        let login = UserService::login(&state, login_request()).await.unwrap_err();
        assert!(matches!(login, ApiError::StoreUnavailable(_)));
        assert_eq!(login.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);

        let lookup = UserService::get_user(&state, "u1").await;
        assert!(matches!(lookup, Err(ApiError::StoreUnavailable(_))));
    }
}
