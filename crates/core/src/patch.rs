//! Tri-state field for partial updates.
//!
//! `Option<T>` cannot tell "field omitted" apart from "field sent as null".
//! [`Patch`] can: combine it with `#[serde(default)]` so a missing key
//! deserializes to [`Patch::Absent`], `null` to [`Patch::Null`] and any
//! other value to [`Patch::Value`].

use serde::{Deserialize, Deserializer};

use crate::validation::FieldErrors;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// The key was not present; keep the stored value.
    Absent,
    /// The key was present with an explicit `null`.
    Null,
    /// The key carried a new value.
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Self::Value(value),
            None => Self::Null,
        })
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Apply to a non-nullable target. `Null` records a field error and
    /// leaves `target` untouched.
    pub fn apply_required(self, target: &mut T, field: &str, errors: &mut FieldErrors) {
        match self {
            Self::Absent => {}
            Self::Null => errors.add(field, "must not be null"),
            Self::Value(value) => *target = value,
        }
    }

    /// Apply to a nullable target. `Null` clears it.
    pub fn apply_optional(self, target: &mut Option<T>) {
        match self {
            Self::Absent => {}
            Self::Null => *target = None,
            Self::Value(value) => *target = Some(value),
        }
    }
}
