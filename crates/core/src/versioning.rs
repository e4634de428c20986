//! Optimistic-concurrency helpers shared by every versioned record.

use crate::error::{CoreError, CoreResult};
use crate::types::Version;

/// Reject a write up front when the caller pinned a version that no longer
/// matches the stored one. `None` means the caller did not pin a version.
pub fn check_expected_version(current: Version, expected: Option<Version>) -> CoreResult<()> {
    match expected {
        Some(expected) if expected != current => Err(CoreError::edit_conflict()),
        _ => Ok(()),
    }
}
