//! Input validation functions
//!
//! Field-shape checks live on the request types as `validator` derives;
//! this module holds the custom validators they reference plus the
//! normalization applied before store lookups.

use validator::ValidationError;

/// Validate a phone number: digits with optional leading `+`, spaces,
/// dashes and parentheses, 7 to 20 digits in total.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let trimmed = phone.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("phone_empty"));
    }

    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
    {
        return Err(ValidationError::new("phone_format"));
    }

    let digits = body.chars().filter(|c| c.is_ascii_digit()).count();
    if !(7..=20).contains(&digits) {
        return Err(ValidationError::new("phone_length"));
    }

    Ok(())
}

/// Canonical form used to store and look up emails
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
