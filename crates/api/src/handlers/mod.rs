//! Request handlers, one module per resource.

pub mod movies;
pub mod tokens;
pub mod users;

use greenlight_core::error::CoreError;
use greenlight_core::types::DbId;

use crate::error::AppResult;

/// Parse a path ID. Anything but a positive integer is treated as missing.
pub(crate) fn parse_id(entity: &'static str, raw: &str) -> AppResult<DbId> {
    match raw.parse::<DbId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(CoreError::not_found(entity, raw).into()),
    }
}
