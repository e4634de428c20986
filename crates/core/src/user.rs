//! User field rules.

use crate::password::validate_password_plaintext;
use crate::validation::{is_valid_email, FieldErrors};

/// Maximum name length in bytes.
pub const MAX_NAME_BYTES: usize = 500;

pub fn validate_email(email: &str, errors: &mut FieldErrors) {
    errors.check(!email.is_empty(), "email", "must be provided");
    errors.check(is_valid_email(email), "email", "must be a valid email address");
}

pub fn validate_name(name: &str, errors: &mut FieldErrors) {
    errors.check(!name.trim().is_empty(), "name", "must be provided");
    errors.check(
        name.len() <= MAX_NAME_BYTES,
        "name",
        "must not be more than 500 bytes long",
    );
}

/// Validate a registration: name, email and plaintext password together.
pub fn validate_registration(name: &str, email: &str, password: &str, errors: &mut FieldErrors) {
    validate_name(name, errors);
    validate_email(email, errors);
    validate_password_plaintext(password, errors);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_registration() {
        let mut errors = FieldErrors::new();
        validate_registration("Alice Smith", "alice@example.com", "pa55word", &mut errors);
        assert!(errors.is_empty(), "{errors}");
    }

    #[test]
    fn all_fields_reported_at_once() {
        let mut errors = FieldErrors::new();
        validate_registration("", "not-an-email", "short", &mut errors);
        assert_eq!(errors.get("name"), Some("must be provided"));
        assert_eq!(errors.get("email"), Some("must be a valid email address"));
        assert_eq!(errors.get("password"), Some("must be at least 8 bytes long"));
    }

    #[test]
    fn empty_email_reports_missing_first() {
        let mut errors = FieldErrors::new();
        validate_email("", &mut errors);
        assert_eq!(errors.get("email"), Some("must be provided"));
    }
}
