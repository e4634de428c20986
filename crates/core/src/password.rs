//! Password credentials: Argon2id hashing and plaintext length rules.
//!
//! Hashes are stored as PHC strings, so the salt and cost parameters travel
//! with the hash and verification needs nothing else.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::validation::FieldErrors;

/// Minimum accepted password length in bytes.
pub const MIN_PASSWORD_BYTES: usize = 8;

/// Maximum accepted password length in bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Well-formed Argon2id hash at the default cost that no password matches.
const DECOY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$tp34rqKXSY5eMVbhvDwhAg$EkzL7OKfD+4nmBCboKPG1Ht0uEenkierPEOFZXquu0k";

/// Hash `plaintext` with Argon2id (default cost) and a fresh random salt.
pub fn hash_password(plaintext: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|phc| phc.to_string())
}

/// Check `plaintext` against a stored PHC hash.
///
/// A mismatch is `Ok(false)`; only a malformed hash is an error.
pub fn verify_password(plaintext: &str, stored: &str) -> Result<bool, password_hash::Error> {
    let stored = PasswordHash::new(stored)?;
    match Argon2::default().verify_password(plaintext.as_bytes(), &stored) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Spend one full verification on `plaintext` against a decoy hash.
///
/// Called when no account matches a login so that unknown accounts cost
/// the same as wrong passwords. Always returns `false`.
pub fn verify_against_decoy(plaintext: &str) -> bool {
    matches!(verify_password(plaintext, DECOY_HASH), Ok(true))
}

/// Record length violations for a plaintext password under the `password` field.
pub fn validate_password_plaintext(password: &str, errors: &mut FieldErrors) {
    errors.check(!password.is_empty(), "password", "must be provided");
    errors.check(
        password.len() >= MIN_PASSWORD_BYTES,
        "password",
        "must be at least 8 bytes long",
    );
    errors.check(
        password.len() <= MAX_PASSWORD_BYTES,
        "password",
        "must not be more than 72 bytes long",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");

        assert!(
            hash.starts_with("$argon2id$"),
            "expected argon2id PHC prefix"
        );

        let verified = verify_password(password, &hash).expect("verify should succeed");
        assert!(verified, "correct password should verify as true");
    }

    #[test]
    fn test_wrong_password_fails() {
        let hash = hash_password("real-password").expect("hashing should succeed");
        let verified = verify_password("wrong-password", &hash).expect("verify should succeed");
        assert!(!verified, "wrong password should verify as false");
    }

    #[test]
    fn test_salts_differ_between_hashes() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_password_length_rules() {
        let mut errors = FieldErrors::new();
        validate_password_plaintext("short", &mut errors);
        assert_eq!(errors.get("password"), Some("must be at least 8 bytes long"));

        let mut errors = FieldErrors::new();
        validate_password_plaintext(&"x".repeat(73), &mut errors);
        assert_eq!(
            errors.get("password"),
            Some("must not be more than 72 bytes long")
        );

        let mut errors = FieldErrors::new();
        validate_password_plaintext("pa55word", &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_decoy_hash_is_well_formed_and_never_matches() {
        assert!(matches!(verify_password("anything-at-all", DECOY_HASH), Ok(false)));
        assert!(!verify_against_decoy("anything-at-all"));
    }
}
