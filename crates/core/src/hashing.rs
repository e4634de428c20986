//! SHA-256 digest used as the lookup key for bearer tokens.

use sha2::{Digest, Sha256};

/// Length in bytes of a [`sha256_digest`] output.
pub const DIGEST_LEN: usize = 32;

/// Compute the raw 32-byte SHA-256 digest of `data`.
pub fn sha256_digest(data: &[u8]) -> Vec<u8> {
    Sha256::digest(data).to_vec()
}
