//! Movie field rules and the `"<n> mins"` runtime encoding.

use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::validation::{unique, FieldErrors};

/// Earliest accepted release year.
pub const MIN_YEAR: i32 = 1888;

/// Maximum title length in bytes.
pub const MAX_TITLE_BYTES: usize = 500;

/// Maximum number of genres per movie.
pub const MAX_GENRES: usize = 5;

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid runtime format")]
pub struct RuntimeFormatError;

/// Running time in minutes. Serialized as `"102 mins"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Runtime(pub i32);

impl Runtime {
    pub fn minutes(self) -> i32 {
        self.0
    }
}

impl From<i32> for Runtime {
    fn from(minutes: i32) -> Self {
        Self(minutes)
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mins", self.0)
    }
}

impl FromStr for Runtime {
    type Err = RuntimeFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(' ');
        let (Some(number), Some("mins"), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(RuntimeFormatError);
        };
        number.parse().map(Self).map_err(|_| RuntimeFormatError)
    }
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Borrowed view of the user-editable movie fields.
#[derive(Debug, Clone, Copy)]
pub struct MovieFields<'a> {
    pub title: &'a str,
    pub year: i32,
    pub runtime: Runtime,
    pub genres: &'a [String],
}

/// Record every violation of the movie field rules in `errors`.
pub fn validate_movie(movie: &MovieFields<'_>, errors: &mut FieldErrors) {
    let max_year = chrono::Utc::now().year() + 1;

    errors.check(!movie.title.trim().is_empty(), "title", "must be provided");
    errors.check(
        movie.title.len() <= MAX_TITLE_BYTES,
        "title",
        "must not be more than 500 bytes long",
    );

    errors.check(movie.year != 0, "year", "must be provided");
    errors.check(movie.year >= MIN_YEAR, "year", "must be greater than 1888");
    errors.check(movie.year <= max_year, "year", "must not be in the future");

    errors.check(movie.runtime.0 != 0, "runtime", "must be provided");
    errors.check(movie.runtime.0 > 0, "runtime", "must be a positive integer");

    errors.check(!movie.genres.is_empty(), "genres", "must contain at least 1 genre");
    errors.check(
        movie.genres.len() <= MAX_GENRES,
        "genres",
        "must not contain more than 5 genres",
    );
    errors.check(
        movie.genres.iter().all(|g| !g.trim().is_empty()),
        "genres",
        "must not contain empty values",
    );
    errors.check(unique(movie.genres), "genres", "must not contain duplicate values");
}
