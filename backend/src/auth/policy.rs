//! Access policies over an [`AuthorizationContext`]
//!
//! Pure checks, no IO. Role comparison is exact and case-sensitive; any
//! role other than the required one or `USER` fails closed.

use super::middleware::AuthorizationContext;
use authgate_shared::ROLE_USER;
use thiserror::Error;

/// The caller is authenticated but may not perform this operation
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Unauthorized to access this resource")]
pub struct Forbidden;

/// Allow only callers holding `required_role`
pub fn require_role(context: &AuthorizationContext, required_role: &str) -> Result<(), Forbidden> {
    if context.role == required_role {
        Ok(())
    } else {
        Err(Forbidden)
    }
}

/// Allow callers holding `required_role`, or a `USER` acting on their own id
pub fn require_self_or_role(
    context: &AuthorizationContext,
    requested_user_id: &str,
    required_role: &str,
) -> Result<(), Forbidden> {
    if context.role == ROLE_USER && context.uid == requested_user_id {
        return Ok(());
    }
    require_role(context, required_role)
}
