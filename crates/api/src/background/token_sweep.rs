//! Periodic removal of expired tokens.
//!
//! Runs on a fixed interval using `tokio::time::interval` until cancelled.

use std::time::Duration;

use greenlight_db::repositories::TokenRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Run the sweep loop. The first sweep happens immediately.
pub async fn run(pool: PgPool, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Token sweep started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Token sweep stopping");
                break;
            }
            _ = interval.tick() => {
                match TokenRepo::delete_expired(&pool).await {
                    Ok(0) => tracing::debug!("Token sweep: nothing expired"),
                    Ok(deleted) => tracing::info!(deleted, "Token sweep: purged expired tokens"),
                    Err(e) => tracing::error!(error = %e, "Token sweep failed"),
                }
            }
        }
    }
}
