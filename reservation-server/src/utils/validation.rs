//! Input validation helpers
//!
//! Text length limits for booking form fields. SQLite TEXT has no built-in
//! length enforcement, so every handler input goes through here.

use super::{AppError, ErrorCode};

// ── Text length limits ──────────────────────────────────────────────

/// First / last names
pub const MAX_NAME_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Phone numbers
pub const MAX_PHONE_LEN: usize = 32;

/// Special requests
pub const MAX_NOTE_LEN: usize = 500;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::with_message(
            ErrorCode::RequiredField,
            format!("{field} must not be empty"),
        )
        .with_detail("field", field));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.chars().count() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.chars().count()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Minimal shape check: one `@` with a non-empty local part and a dotted domain.
pub fn validate_email(email: &str) -> Result<(), AppError> {
    validate_required_text(email, "email", MAX_EMAIL_LEN)?;
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(AppError::with_message(
            ErrorCode::InvalidFormat,
            format!("Invalid email address: {email}"),
        )
        .with_detail("field", "email"));
    }
    Ok(())
}

/// Email as stored: trimmed and lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Party size must be a positive integer
pub fn validate_party_size(party_size: i32) -> Result<(), AppError> {
    if party_size <= 0 {
        return Err(AppError::new(ErrorCode::InvalidPartySize).with_detail("partySize", party_size));
    }
    Ok(())
}

/// Trim an optional text field, mapping blank to None
pub fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Ada", "firstName", MAX_NAME_LEN).is_ok());

        let err = validate_required_text("   ", "firstName", MAX_NAME_LEN).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
        assert_eq!(err.message, "firstName must not be empty");

        let long = "x".repeat(MAX_NAME_LEN + 1);
        let err = validate_required_text(&long, "lastName", MAX_NAME_LEN).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(&None, "phone", MAX_PHONE_LEN).is_ok());
        assert!(validate_optional_text(&Some("555-0100".into()), "phone", MAX_PHONE_LEN).is_ok());
        assert!(
            validate_optional_text(&Some("9".repeat(MAX_PHONE_LEN + 1)), "phone", MAX_PHONE_LEN)
                .is_err()
        );
    }

    #[test]
    fn test_email() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email(" ada@example.com ").is_ok());

        for bad in ["ada", "@example.com", "ada@localhost", "ada@@example.com", "a da@example.com", "ada@example."] {
            let err = validate_email(bad).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidFormat, "{bad}");
        }
        assert_eq!(validate_email("").unwrap_err().code, ErrorCode::RequiredField);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn test_party_size() {
        assert!(validate_party_size(1).is_ok());
        assert!(validate_party_size(40).is_ok());
        assert_eq!(validate_party_size(0).unwrap_err().code, ErrorCode::InvalidPartySize);
        assert_eq!(validate_party_size(-3).unwrap_err().code, ErrorCode::InvalidPartySize);
    }

    #[test]
    fn test_normalize_optional_text() {
        assert_eq!(normalize_optional_text(Some("  ".into())), None);
        assert_eq!(normalize_optional_text(Some(" hi ".into())), Some("hi".into()));
        assert_eq!(normalize_optional_text(None), None);
    }
}
