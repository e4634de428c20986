//! Bounded query execution and driver error classification.

use std::future::Future;
use std::time::Duration;

use greenlight_core::error::CoreError;

/// Upper bound on any single store operation.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(3);

/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Postgres SQLSTATE for `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Run `query` with [`QUERY_TIMEOUT`], classifying any failure.
pub(crate) async fn bounded<T, F>(
    operation: &'static str,
    table: &'static str,
    query: F,
) -> Result<T, CoreError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(QUERY_TIMEOUT, query).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(classify(operation, table, err)),
        Err(_) => {
            tracing::warn!(
                operation,
                table,
                timeout_secs = QUERY_TIMEOUT.as_secs(),
                "Query timed out",
            );
            Err(CoreError::Storage {
                operation,
                table,
                message: format!("timed out after {}s", QUERY_TIMEOUT.as_secs()),
            })
        }
    }
}

/// Map a driver error onto the domain error taxonomy.
///
/// Unique violations become `DuplicateKey` naming the column taken from the
/// `uq_<table>_<column>` constraint. Foreign key violations mean the
/// referenced row is gone.
pub(crate) fn classify(operation: &'static str, table: &'static str, err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or_default();
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                return CoreError::duplicate_key(field_from_constraint(table, constraint));
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return CoreError::not_found("referenced record", constraint);
            }
            _ => {}
        }
    }
    CoreError::Storage {
        operation,
        table,
        message: err.to_string(),
    }
}

fn field_from_constraint<'a>(table: &str, constraint: &'a str) -> &'a str {
    constraint
        .strip_prefix("uq_")
        .and_then(|rest| rest.strip_prefix(table))
        .and_then(|rest| rest.strip_prefix('_'))
        .filter(|field| !field.is_empty())
        .unwrap_or(constraint)
}
