use axum::routing::post;
use axum::Router;

use crate::handlers::tokens;
use crate::state::AppState;

/// Routes mounted at `/tokens`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/authentication", post(tokens::create_authentication_token))
        .route("/activation", post(tokens::create_activation_token))
}
