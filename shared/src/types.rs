//! API request and response types

use crate::models::UserType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Pagination {
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: u32,
    #[serde(default = "default_per_page")]
    #[validate(range(min = 1, max = 100))]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    10
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl Pagination {
    /// Number of records to skip for this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, pagination: &Pagination) -> Self {
        let per_page = u64::from(pagination.per_page.max(1));
        let total_pages = total.div_ceil(per_page).min(u64::from(u32::MAX)) as u32;
        Self {
            data,
            total,
            page: pagination.page,
            per_page: pagination.per_page,
            total_pages,
        }
    }
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Access and refresh token issued together for one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signup request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 2, max = 100))]
    pub first_name: String,
    #[validate(length(min = 2, max = 100))]
    pub last_name: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "crate::validation::validate_phone"))]
    pub phone: String,
    pub user_type: UserType,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// User record as returned to clients. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub user_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserResponse {
    /// Drop the stored token pair; lookups must not hand out live tokens
    pub fn without_tokens(mut self) -> Self {
        self.token = None;
        self.refresh_token = None;
        self
    }
}

/// Body of the token-gated probe endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessGranted {
    pub success: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn signup() -> SignupRequest {
        SignupRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password: "analytical".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+44 20 7946 0958".to_string(),
            user_type: UserType::User,
        }
    }

    #[test]
    fn test_valid_signup_passes() {
        assert!(signup().validate().is_ok());
    }

    #[rstest]
    #[case::short_first_name(SignupRequest { first_name: "A".into(), ..signup() })]
    #[case::short_last_name(SignupRequest { last_name: "L".into(), ..signup() })]
    #[case::short_password(SignupRequest { password: "12345".into(), ..signup() })]
    #[case::bad_email(SignupRequest { email: "not-an-email".into(), ..signup() })]
    #[case::bad_phone(SignupRequest { phone: "call me".into(), ..signup() })]
    fn test_invalid_signup_rejected(#[case] req: SignupRequest) {
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_signup_rejects_unknown_user_type() {
        let body = r#"{"first_name":"Ada","last_name":"Lovelace","password":"analytical",
            "email":"ada@example.com","phone":"5550100","user_type":"ROOT"}"#;
        assert!(serde_json::from_str::<SignupRequest>(body).is_err());
    }

    #[test]
    fn test_pagination_defaults() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, 10);
        assert_eq!(p.offset(), 0);
    }

    #[rstest]
    #[case(1, 10, 0)]
    #[case(2, 10, 10)]
    #[case(5, 25, 100)]
    fn test_pagination_offset(#[case] page: u32, #[case] per_page: u32, #[case] expected: u64) {
        assert_eq!(Pagination { page, per_page }.offset(), expected);
    }

    #[test]
    fn test_paginated_response_counts_pages() {
        let p = Pagination { page: 1, per_page: 10 };
        let resp = PaginatedResponse::new(vec![1, 2, 3], 21, &p);
        assert_eq!(resp.total_pages, 3);

        let empty: PaginatedResponse<u8> = PaginatedResponse::new(vec![], 0, &p);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_user_response_omits_missing_tokens() {
        let user = UserResponse {
            user_id: "u1".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: "5550100".into(),
            user_type: "USER".into(),
            token: None,
            refresh_token: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("token").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
