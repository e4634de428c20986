//! Row models and write DTOs, one module per table.

pub mod movie;
pub mod permission;
pub mod token;
pub mod user;
