//! Shared helpers for filesystem operations.

use crate::error::{BlompError, Result};

/// Check a file or folder name before sending it to the dashboard.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(BlompError::Validation("Name must not be empty".to_string()));
    }
    if name.contains(['/', '\\']) {
        return Err(BlompError::Validation(format!(
            "Name must not contain a path separator: {}",
            name
        )));
    }
    Ok(())
}

/// Check an invitation address.
///
/// Addresses are rendered into a quoted list on the wire, so anything that
/// could break that rendering is rejected along with the obviously invalid.
pub(crate) fn validate_email(email: &str) -> Result<()> {
    let invalid = || BlompError::Validation(format!("Invalid e-mail address: {:?}", email));

    if email.is_empty() || email.chars().any(|c| c.is_whitespace() || "'\",[]".contains(c)) {
        return Err(invalid());
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("report.pdf").is_ok());
        assert!(validate_name("My Folder").is_ok());
        assert!(matches!(validate_name(""), Err(BlompError::Validation(_))));
        assert!(matches!(validate_name("  "), Err(BlompError::Validation(_))));
        assert!(matches!(validate_name("a/b"), Err(BlompError::Validation(_))));
        assert!(matches!(validate_name("a\\b"), Err(BlompError::Validation(_))));
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("a.b+tag@sub.example.org").is_ok());

        for bad in [
            "",
            "alice",
            "@example.com",
            "alice@",
            "a@b@c",
            "alice @example.com",
            "o'brien@example.com",
            "a,b@example.com",
            "a@example.com]",
            "\"a\"@example.com",
        ] {
            assert!(
                matches!(validate_email(bad), Err(BlompError::Validation(_))),
                "{} should be rejected",
                bad
            );
        }
    }
}
