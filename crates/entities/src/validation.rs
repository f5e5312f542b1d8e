//! Field validation shared by the server and the client.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Maximum length of a user's display name.
pub const MAX_USER_NAME_LEN: usize = 50;
/// Minimum length of a plaintext password.
pub const MIN_PASSWORD_LEN: usize = 6;
/// Maximum length of a project name.
pub const MAX_PROJECT_NAME_LEN: usize = 100;
/// Maximum length of a task title.
pub const MAX_TASK_TITLE_LEN: usize = 100;
/// Maximum length of project and task descriptions.
pub const MAX_DESCRIPTION_LEN: usize = 500;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("valid email pattern")
});

/// A field failed a schema constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Name of the offending field.
    pub field: &'static str,
    /// Human readable reason.
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error for a field.
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trims `value` and checks it is non-empty and at most `max` characters.
pub fn required_text(field: &'static str, value: &str, max: usize) -> ValidationResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, format!("Please provide a {field}")));
    }
    bounded_text(field, trimmed, max)
}

/// Checks `value` is at most `max` characters.
pub fn bounded_text(field: &'static str, value: &str, max: usize) -> ValidationResult<String> {
    if value.chars().count() > max {
        return Err(ValidationError::new(
            field,
            format!("cannot be more than {max} characters"),
        ));
    }
    Ok(value.to_string())
}

/// Normalizes an email address (trimmed, lowercased) and checks its shape.
pub fn normalize_email(value: &str) -> ValidationResult<String> {
    let email = value.trim().to_lowercase();
    if email.is_empty() {
        return Err(ValidationError::new("email", "Please provide an email"));
    }
    if !EMAIL_PATTERN.is_match(&email) {
        return Err(ValidationError::new("email", "Please provide a valid email"));
    }
    Ok(email)
}

/// Checks a plaintext password meets the minimum length.
pub fn check_password(value: &str) -> ValidationResult<()> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::new(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_trims() {
        assert_eq!(required_text("name", "  Alpha  ", 10).unwrap(), "Alpha");
        assert!(required_text("name", "   ", 10).is_err());
        assert!(required_text("name", "abcdefghijk", 10).is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Jane.Doe@Example.COM ").unwrap(),
            "jane.doe@example.com"
        );
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("a@b").is_err());
        assert!(normalize_email("").is_err());
    }

    #[test]
    fn test_check_password() {
        assert!(check_password("12345").is_err());
        assert!(check_password("123456").is_ok());
    }

    #[test]
    fn test_error_display() {
        let error = ValidationError::new("title", "too long");
        assert_eq!(error.to_string(), "title: too long");
    }
}
