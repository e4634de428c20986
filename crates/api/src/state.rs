use std::sync::Arc;

use crate::background::BackgroundTasks;
use crate::config::ServerConfig;
use crate::mailer::Mailer;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool, passed explicitly to every repository call.
    pub pool: greenlight_db::DbPool,
    /// Server configuration (token lifetimes, mail sender).
    pub config: Arc<ServerConfig>,
    /// Runner for detached work such as mail delivery.
    pub background: BackgroundTasks,
    /// Outgoing mail transport.
    pub mailer: Arc<dyn Mailer>,
}
