//! Authentication and authorization
//!
//! JWT issuance/validation, bcrypt password hashing, the request gate and
//! the access policies applied behind it.

mod jwt;
mod middleware;
mod password;
mod policy;

pub use jwt::{Claims, Identity, JwtService};
pub use middleware::{auth_middleware, authenticate, AuthorizationContext, TOKEN_HEADER};
pub use password::{PasswordService, Verification, CREDENTIAL_INCORRECT};
pub use policy::{require_role, require_self_or_role, Forbidden};
