use crate::validation::FieldErrors;

/// The kind of optimistic-concurrency or uniqueness conflict a write ran into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// The stored version moved (or the row vanished) between read and write.
    EditConflict,
    /// A unique constraint rejected the write. `field` names the offending column.
    DuplicateKey { field: String },
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },

    #[error("Conflict: {}", describe_conflict(.0))]
    Conflict(Conflict),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Storage error during {operation} on {table}: {message}")]
    Storage {
        operation: &'static str,
        table: &'static str,
        message: String,
    },
}

/// Convenience alias used across the core and repository layers.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn edit_conflict() -> Self {
        Self::Conflict(Conflict::EditConflict)
    }

    pub fn duplicate_key(field: impl Into<String>) -> Self {
        Self::Conflict(Conflict::DuplicateKey {
            field: field.into(),
        })
    }

    /// Build a validation error carrying a single field message.
    pub fn invalid_field(field: &str, message: &str) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        Self::Validation(errors)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_edit_conflict(&self) -> bool {
        matches!(self, Self::Conflict(Conflict::EditConflict))
    }
}

fn describe_conflict(conflict: &Conflict) -> String {
    match conflict {
        Conflict::EditConflict => "record was modified concurrently".to_string(),
        Conflict::DuplicateKey { field } => format!("duplicate value for {field}"),
    }
}
