//! Authentication middleware
//!
//! Reads the raw token from the `token` request header, validates it and
//! attaches an [`AuthorizationContext`] to the request. Every rejection
//! reaches the client as the same 401; the reason is only logged.

use super::jwt::{Claims, JwtService};
use crate::error::ApiError;
use crate::state::AppState;
use authgate_shared::{AuthError, TokenError};
use axum::{
    extract::{FromRef, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// Header carrying the access token. Not `Authorization: Bearer`.
pub const TOKEN_HEADER: &str = "token";

/// Identity of the caller, derived from a validated access token.
///
/// Lives in the request extensions for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationContext {
    pub uid: String,
    pub role: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<Claims> for AuthorizationContext {
    fn from(claims: Claims) -> Self {
        Self {
            uid: claims.user_id,
            role: claims.role,
            email: claims.email,
            first_name: claims.first_name,
            last_name: claims.last_name,
        }
    }
}

/// Extract and validate the token carried by a request
pub fn authenticate(headers: &HeaderMap, jwt: &JwtService) -> Result<AuthorizationContext, AuthError> {
    let token = headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::MissingToken)?;

    let claims = jwt.validate(token).map_err(|kind| {
        debug!(reason = %kind, "Rejected token");
        kind
    })?;

    // Refresh tokens verify too, but carry no subject
    if claims.user_id.is_empty() {
        debug!("Rejected token without a subject");
        return Err(TokenError::Malformed.into());
    }

    Ok(claims.into())
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthorizationContext
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Already validated by `auth_middleware` on this route
        if let Some(context) = parts.extensions.get::<AuthorizationContext>() {
            return Ok(context.clone());
        }

        let app_state = AppState::from_ref(state);
        Ok(authenticate(&parts.headers, app_state.jwt())?)
    }
}

/// Middleware function for authentication
///
/// Applied as a layer to every protected route group.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let context = authenticate(request.headers(), state.jwt())?;
    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}
