//! Route tables. [`api_routes`] is nested under `/v1` by the router builder.

pub mod health;
pub mod movies;
pub mod tokens;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// All versioned API routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/movies", movies::router())
        .nest("/users", users::router())
        .nest("/tokens", tokens::router())
}
