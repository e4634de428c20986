//! Handlers for the `/tokens` resource.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use greenlight_core::error::CoreError;
use greenlight_core::password::{
    validate_password_plaintext, verify_against_decoy, verify_password,
};
use greenlight_core::tokens::TokenScope;
use greenlight_core::user::validate_email;
use greenlight_core::validation::FieldErrors;
use greenlight_db::repositories::{TokenRepo, UserRepo};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::mailer::{EmailMessage, ACTIVATION_TEMPLATE};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/tokens/authentication`.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for `POST /v1/tokens/activation`.
#[derive(Debug, Deserialize)]
pub struct ResendActivationRequest {
    #[serde(default)]
    pub email: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/tokens/authentication
///
/// Exchange email + password for an authentication token. Unknown emails
/// and wrong passwords are indistinguishable.
pub async fn create_authentication_token(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;

    let mut errors = FieldErrors::new();
    validate_email(&input.email, &mut errors);
    validate_password_plaintext(&input.password, &mut errors);
    errors.into_result()?;

    let Some(user) = UserRepo::find_by_email(&state.pool, &input.email).await? else {
        verify_against_decoy(&input.password);
        tracing::info!("Authentication failed for unknown email");
        return Err(invalid_credentials());
    };

    let matches = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))?;
    if !matches {
        tracing::info!(user_id = user.id, "Authentication failed");
        return Err(invalid_credentials());
    }

    let token = TokenRepo::issue(
        &state.pool,
        user.id,
        state.config.auth_token_ttl(),
        TokenScope::Authentication,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "authentication_token": token })),
    ))
}

/// POST /v1/tokens/activation
///
/// Replace any outstanding activation tokens with a fresh one and mail it
/// in the background. Returns 202.
pub async fn create_activation_token(
    State(state): State<AppState>,
    payload: Result<Json<ResendActivationRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;

    let mut errors = FieldErrors::new();
    validate_email(&input.email, &mut errors);
    errors.into_result()?;

    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| CoreError::invalid_field("email", "no matching email address found"))?;
    if user.activated {
        return Err(CoreError::invalid_field("email", "user has already been activated").into());
    }

    TokenRepo::revoke(&state.pool, user.id, TokenScope::Activation).await?;
    let token = TokenRepo::issue(
        &state.pool,
        user.id,
        state.config.activation_token_ttl(),
        TokenScope::Activation,
    )
    .await?;

    let mailer = state.mailer.clone();
    let message = EmailMessage {
        recipient: user.email.clone(),
        template: ACTIVATION_TEMPLATE,
        data: json!({ "activation_token": token.plaintext }),
    };
    state
        .background
        .spawn("activation_email", async move { mailer.send(message).await });

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "message": "an email will be sent to you containing activation instructions" })),
    ))
}

fn invalid_credentials() -> AppError {
    AppError::unauthorized("invalid authentication credentials")
}
