//! Shared response envelope types for API handlers.
//!
//! Single resources use `{ "<name>": ... }` envelopes built with `json!`;
//! lists use [`PageResponse`].

use greenlight_core::filters::Metadata;
use serde::Serialize;

/// `{ "data": [...], "metadata": {...} }` envelope for paginated lists.
#[derive(Debug, Serialize)]
pub struct PageResponse<T: Serialize> {
    pub data: Vec<T>,
    pub metadata: Metadata,
}
