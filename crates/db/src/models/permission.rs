//! Permission catalogue rows.

use greenlight_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `permissions` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Permission {
    pub id: DbId,
    pub code: String,
}
