//! Authentication routes
//!
//! Provides the public signup and login endpoints.
//!
//! # Performance Optimizations
//!
//! - Uses pre-computed JWT keys from AppState (no per-request allocation)
//! - Password hashing runs on blocking thread pool (doesn't block async runtime)

use super::extract::ValidatedJson;
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use authgate_shared::{LoginRequest, SignupRequest, UserResponse};
use axum::{extract::State, routing::post, Json, Router};

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users/signup", post(signup))
        .route("/users/login", post(login))
}

/// Register a new user
///
/// POST /users/signup
async fn signup(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SignupRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = UserService::signup(&state, req).await?;
    Ok(Json(user))
}

/// Login with email and password
///
/// POST /users/login
async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = UserService::login(&state, req).await?;
    Ok(Json(user))
}
