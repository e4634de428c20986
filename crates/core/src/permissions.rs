//! Capability codes and the pure membership check used at the
//! authorization boundary.

use std::collections::BTreeSet;

use serde::Serialize;

/// Read access to the movie catalogue.
pub const MOVIES_READ: &str = "movies:read";

/// Create, update and delete access to the movie catalogue.
pub const MOVIES_WRITE: &str = "movies:write";

/// Codes granted to every newly registered user.
pub const DEFAULT_USER_PERMISSIONS: &[&str] = &[MOVIES_READ];

/// The set of capability codes held by one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Permissions(BTreeSet<String>);

impl Permissions {
    pub fn includes(&self, code: &str) -> bool {
        self.0.contains(code)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromIterator<String> for Permissions {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// True if `held` contains `code`. No I/O.
pub fn has(held: &Permissions, code: &str) -> bool {
    held.includes(code)
}
