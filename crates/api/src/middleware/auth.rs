//! Bearer-token authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use greenlight_core::error::CoreError;
use greenlight_core::tokens::{validate_token_plaintext, TokenScope};
use greenlight_core::validation::FieldErrors;
use greenlight_db::models::user::User;
use greenlight_db::repositories::UserRepo;

use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user resolved from an `authentication`-scoped token in the
/// `Authorization: Bearer <token>` header.
///
/// ```ignore
/// async fn my_handler(AuthUser(user): AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| AppError::unauthorized("you must be authenticated to access this resource"))?;

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(invalid_token)?;

        let mut errors = FieldErrors::new();
        validate_token_plaintext(token, &mut errors);
        if !errors.is_empty() {
            return Err(invalid_token());
        }

        match UserRepo::find_for_token(&state.pool, TokenScope::Authentication, token).await {
            Ok(user) => Ok(AuthUser(user)),
            Err(CoreError::NotFound { .. }) => Err(invalid_token()),
            Err(other) => Err(other.into()),
        }
    }
}

fn invalid_token() -> AppError {
    AppError::unauthorized("invalid or missing authentication token")
}
