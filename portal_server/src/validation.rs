//! Field validators shared by request handlers.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ApiError, ApiResult};

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 \-]{6,18}[0-9]$").unwrap());

pub const MIN_PASSWORD_LEN: usize = 8;

/// School terms used by results and fee records.
pub const TERMS: &[&str] = &["term_1", "term_2", "term_3"];

/// Trimmed value of a required text field.
pub fn required(field: &str, value: &str) -> ApiResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Trimmed optional text; blank becomes `None`.
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Lowercased, trimmed email address.
pub fn email(field: &str, value: &str) -> ApiResult<String> {
    let value = required(field, value)?.to_lowercase();
    if !EMAIL_REGEX.is_match(&value) {
        return Err(ApiError::validation(format!("{field} is not a valid email address")));
    }
    Ok(value)
}

pub fn phone(field: &str, value: &str) -> ApiResult<String> {
    let value = required(field, value)?;
    if !PHONE_REGEX.is_match(&value) {
        return Err(ApiError::validation(format!("{field} is not a valid phone number")));
    }
    Ok(value)
}

pub fn password(value: &str) -> ApiResult<()> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Value must be one of `allowed`.
pub fn one_of(field: &str, value: &str, allowed: &[&str]) -> ApiResult<String> {
    let value = required(field, value)?;
    if !allowed.contains(&value.as_str()) {
        return Err(ApiError::validation(format!(
            "{field} must be one of: {}",
            allowed.join(", ")
        )));
    }
    Ok(value)
}

pub fn non_negative(field: &str, value: i64) -> ApiResult<i64> {
    if value < 0 {
        return Err(ApiError::validation(format!("{field} must not be negative")));
    }
    Ok(value)
}

pub fn term(value: &str) -> ApiResult<String> {
    one_of("term", &value.to_lowercase(), TERMS)
}

pub fn school_year(value: i32) -> ApiResult<i32> {
    if !(2000..=2100).contains(&value) {
        return Err(ApiError::validation("year is out of range"));
    }
    Ok(value)
}

/// Escape `%`, `_` and backslash so the value matches literally in (I)LIKE.
pub fn like_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("title", "  Maths Teacher ").unwrap(), "Maths Teacher");
        let err = required("title", "   ").unwrap_err();
        assert_eq!(err.to_string(), "title is required");
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(email("email", " Parent@Example.COM ").unwrap(), "parent@example.com");
        assert!(email("email", "not-an-email").is_err());
        assert!(email("email", "a b@c.de").is_err());
        assert!(email("email", "").is_err());
    }

    #[test]
    fn phone_numbers() {
        assert!(phone("phone", "+254 712 345678").is_ok());
        assert!(phone("phone", "0712-345-678").is_ok());
        assert!(phone("phone", "call me").is_err());
        assert!(phone("phone", "123").is_err());
    }

    #[test]
    fn password_length() {
        assert!(password("short").is_err());
        assert!(password("long enough").is_ok());
    }

    #[test]
    fn one_of_lists_choices() {
        let err = one_of("gender", "x", &["male", "female"]).unwrap_err();
        assert_eq!(err.to_string(), "gender must be one of: male, female");
        assert_eq!(one_of("gender", "female", &["male", "female"]).unwrap(), "female");
    }

    #[test]
    fn terms_and_years() {
        assert_eq!(term("Term_2").unwrap(), "term_2");
        assert!(term("term_4").is_err());
        assert!(school_year(2025).is_ok());
        assert!(school_year(1999).is_err());
    }

    #[test]
    fn optional_blank_is_none() {
        assert_eq!(optional(Some("  ".into())), None);
        assert_eq!(optional(Some(" x ".into())), Some("x".into()));
        assert_eq!(optional(None), None);
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(like_literal("Science"), "Science");
        assert_eq!(like_literal("%"), "\\%");
        assert_eq!(like_literal("a_b\\c"), "a\\_b\\\\c");
    }
}
