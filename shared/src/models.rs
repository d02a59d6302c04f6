//! Role model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role name carried by administrators.
pub const ROLE_ADMIN: &str = "ADMIN";

/// Role name carried by regular users.
pub const ROLE_USER: &str = "USER";

/// Account type chosen at signup
///
/// Tokens carry the role as a plain string; this enum only exists to
/// reject unknown roles at the signup boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserType {
    Admin,
    User,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Admin => ROLE_ADMIN,
            UserType::User => ROLE_USER,
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(UserType::Admin),
            ROLE_USER => Ok(UserType::User),
            other => Err(format!("Unknown user type: {}", other)),
        }
    }
}
