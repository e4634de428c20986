//! Token models.

use std::fmt;

use greenlight_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A stored token row. Only the digest is persisted.
#[derive(Debug, Clone, FromRow)]
pub struct TokenRecord {
    pub hash: Vec<u8>,
    pub user_id: DbId,
    pub expiry: Timestamp,
    pub scope: String,
}

/// A freshly issued token. The plaintext leaves the process exactly once,
/// in the response or email that delivers it.
#[derive(Clone, Serialize)]
pub struct IssuedToken {
    #[serde(rename = "token")]
    pub plaintext: String,
    pub expiry: Timestamp,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("plaintext", &"<redacted>")
            .field("expiry", &self.expiry)
            .finish()
    }
}
