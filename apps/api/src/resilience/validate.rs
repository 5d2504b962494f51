//! Synchronous fail-fast input gates. These run before any network call and
//! are deliberately separate from the retry path: validation failures are
//! never retried.

use crate::platforms::PlatformError;

const MAX_USERNAME_LEN: usize = 39;

/// Validates a GitHub-style username: 1–39 characters, alphanumeric or
/// hyphen, no leading/trailing hyphen, no consecutive hyphens.
pub fn validate_username(username: &str) -> Result<(), PlatformError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(PlatformError::Validation(
            "username must not be empty".to_string(),
        ));
    }
    if trimmed.len() > MAX_USERNAME_LEN {
        return Err(PlatformError::Validation(format!(
            "username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    if trimmed.starts_with('-') || trimmed.ends_with('-') {
        return Err(PlatformError::Validation(
            "username must not start or end with a hyphen".to_string(),
        ));
    }
    if trimmed.contains("--") {
        return Err(PlatformError::Validation(
            "username must not contain consecutive hyphens".to_string(),
        ));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(PlatformError::Validation(
            "username may only contain letters, digits, and hyphens".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), PlatformError> {
    let trimmed = email.trim();
    let Some((local, domain)) = trimmed.split_once('@') else {
        return Err(PlatformError::Validation(
            "email must contain a single '@'".to_string(),
        ));
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(PlatformError::Validation("email address is invalid".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        for name in ["octocat", "a", "dev-score", "User123", "x-1-y"] {
            assert!(validate_username(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_usernames() {
        let too_long = "a".repeat(40);
        for name in ["", "  ", "-leading", "trailing-", "dou--ble", "has space", &too_long] {
            assert!(validate_username(name).is_err(), "{name:?} should be invalid");
        }
    }

    #[test]
    fn test_valid_email() {
        assert!(validate_email("dev@example.com").is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        for email in ["", "no-at.com", "@example.com", "a@b", "a@@example.com"] {
            assert!(validate_email(email).is_err(), "{email:?} should be invalid");
        }
    }
}
