//! Greenlight domain core.
//!
//! Pure domain logic with no database or HTTP dependencies: the error
//! taxonomy, field validation, the pagination/filter engine, credential
//! hashing, token generation and capability codes.

pub mod error;
pub mod filters;
pub mod hashing;
pub mod movie;
pub mod password;
pub mod patch;
pub mod permissions;
pub mod tokens;
pub mod types;
pub mod user;
pub mod validation;
pub mod versioning;
