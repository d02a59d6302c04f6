//! Token-gated routes
//!
//! Everything here sits behind `auth_middleware`; handlers then apply the
//! access policy for their resource.

use super::extract::ValidatedQuery;
use crate::auth::{require_role, require_self_or_role, AuthorizationContext};
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use authgate_shared::{AccessGranted, PaginatedResponse, Pagination, UserResponse, ROLE_ADMIN};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:user_id", get(get_user))
        .route("/api/v1", get(api_v1))
        .route("/api/v2", get(api_v2))
}

/// List users
///
/// GET /users?page=&per_page=
///
/// # Authorization
/// ADMIN only.
async fn list_users(
    State(state): State<AppState>,
    context: AuthorizationContext,
    ValidatedQuery(pagination): ValidatedQuery<Pagination>,
) -> ApiResult<Json<PaginatedResponse<UserResponse>>> {
    require_role(&context, ROLE_ADMIN)?;

    let page = UserService::list_users(&state, &pagination).await?;
    Ok(Json(page))
}

/// Get one user
///
/// GET /users/:user_id
///
/// # Authorization
/// The user themselves, or an ADMIN.
async fn get_user(
    State(state): State<AppState>,
    context: AuthorizationContext,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    require_self_or_role(&context, &user_id, ROLE_ADMIN)?;

    let user = UserService::get_user(&state, &user_id).await?;
    Ok(Json(user))
}

/// GET /api/v1
async fn api_v1() -> Json<AccessGranted> {
    Json(AccessGranted {
        success: "Access granted for api - v1".to_string(),
    })
}

/// GET /api/v2
async fn api_v2() -> Json<AccessGranted> {
    Json(AccessGranted {
        success: "Access granted for api - v2".to_string(),
    })
}
