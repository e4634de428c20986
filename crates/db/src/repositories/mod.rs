//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Writes that take part in a
//! larger transaction also have an `_on` variant taking `&mut PgConnection`.
//! Every call is bounded by
//! [`crate::storage::QUERY_TIMEOUT`] and returns a
//! [`greenlight_core::error::CoreResult`].

pub mod movie_repo;
pub mod permission_repo;
pub mod token_repo;
pub mod user_repo;

pub use movie_repo::MovieRepo;
pub use permission_repo::PermissionRepo;
pub use token_repo::TokenRepo;
pub use user_repo::UserRepo;
