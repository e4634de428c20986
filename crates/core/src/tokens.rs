//! Bearer token generation, scopes, and plaintext rules.
//!
//! A token is 16 bytes from a CSPRNG, encoded as unpadded RFC 4648 base32
//! (26 characters). Only the SHA-256 digest of the plaintext is persisted;
//! the plaintext is handed to the caller once and never stored or logged.

use std::fmt;
use std::str::FromStr;

use rand::RngCore;

use crate::hashing::sha256_digest;
use crate::validation::FieldErrors;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of random bytes behind every token.
pub const TOKEN_ENTROPY_BYTES: usize = 16;

/// Length of the encoded plaintext: ceil(16 * 8 / 5).
pub const TOKEN_PLAINTEXT_LEN: usize = 26;

// ---------------------------------------------------------------------------
// Scopes
// ---------------------------------------------------------------------------

/// What a token may be used for. Tokens are not interchangeable across scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenScope {
    Activation,
    Authentication,
}

impl TokenScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Activation => "activation",
            Self::Authentication => "authentication",
        }
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "activation" => Ok(Self::Activation),
            "authentication" => Ok(Self::Authentication),
            other => Err(format!("unknown token scope: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// A freshly generated token.
pub struct GeneratedToken {
    /// The plaintext token (shown to the user exactly once, never stored).
    pub plaintext: String,
    /// SHA-256 digest of the plaintext (stored in the database).
    pub hash: Vec<u8>,
}

impl fmt::Debug for GeneratedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedToken")
            .field("plaintext", &"<redacted>")
            .field("hash_len", &self.hash.len())
            .finish()
    }
}

/// Generate a new random token and its digest.
pub fn generate_token() -> GeneratedToken {
    let mut bytes = [0u8; TOKEN_ENTROPY_BYTES];
    rand::rng().fill_bytes(&mut bytes);

    let plaintext = base32::encode(&bytes);
    let hash = hash_token(&plaintext);

    GeneratedToken { plaintext, hash }
}

/// Digest of a plaintext token, used both when storing and when looking up.
pub fn hash_token(plaintext: &str) -> Vec<u8> {
    sha256_digest(plaintext.as_bytes())
}

/// Record shape violations of a submitted plaintext under the `token` field.
pub fn validate_token_plaintext(plaintext: &str, errors: &mut FieldErrors) {
    errors.check(!plaintext.is_empty(), "token", "must be provided");
    errors.check(
        plaintext.len() == TOKEN_PLAINTEXT_LEN,
        "token",
        "must be 26 bytes long",
    );
}

// ---------------------------------------------------------------------------
// base32 encoding helper (no extra dep)
// ---------------------------------------------------------------------------

mod base32 {
    const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

    /// Encode bytes as unpadded RFC 4648 base32.
    pub fn encode(bytes: &[u8]) -> String {
        let mut out = String::with_capacity((bytes.len() * 8).div_ceil(5));
        let mut buffer: u16 = 0;
        let mut bits: u32 = 0;

        for &byte in bytes {
            buffer = (buffer << 8) | u16::from(byte);
            bits += 8;
            while bits >= 5 {
                bits -= 5;
                let index = (buffer >> bits) & 0x1f;
                out.push(char::from(ALPHABET[usize::from(index)]));
            }
            buffer &= (1 << bits) - 1;
        }

        if bits > 0 {
            let index = (buffer << (5 - bits)) & 0x1f;
            out.push(char::from(ALPHABET[usize::from(index)]));
        }

        out
    }

}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_plaintext_is_26_base32_chars() {
        let token = generate_token();
        assert_eq!(token.plaintext.len(), TOKEN_PLAINTEXT_LEN);
        assert!(token
            .plaintext
            .chars()
            .all(|c| c.is_ascii_uppercase() || ('2'..='7').contains(&c)));
    }

    #[test]
    fn hash_matches_plaintext() {
        let token = generate_token();
        assert_eq!(token.hash, hash_token(&token.plaintext));
    }

    #[test]
    fn tokens_are_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a.plaintext, b.plaintext);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn single_character_mutation_changes_digest() {
        let token = generate_token();
        let mut mutated: Vec<char> = token.plaintext.chars().collect();
        mutated[0] = if mutated[0] == 'A' { 'B' } else { 'A' };
        let mutated: String = mutated.into_iter().collect();
        assert_ne!(hash_token(&mutated), token.hash);
    }

    #[test]
    fn debug_output_redacts_plaintext() {
        let token = generate_token();
        let debug = format!("{token:?}");
        assert!(!debug.contains(&token.plaintext));
    }

    #[test]
    fn plaintext_length_rules() {
        let mut errors = FieldErrors::new();
        validate_token_plaintext("", &mut errors);
        assert_eq!(errors.get("token"), Some("must be provided"));

        let mut errors = FieldErrors::new();
        validate_token_plaintext("TOOSHORT", &mut errors);
        assert_eq!(errors.get("token"), Some("must be 26 bytes long"));

        let mut errors = FieldErrors::new();
        validate_token_plaintext(&generate_token().plaintext, &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn scope_round_trips_through_str() {
        for scope in [TokenScope::Activation, TokenScope::Authentication] {
            assert_eq!(scope.as_str().parse::<TokenScope>(), Ok(scope));
        }
        assert!("password-reset".parse::<TokenScope>().is_err());
    }
}
