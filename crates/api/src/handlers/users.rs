//! Handlers for the `/users` resource (registration, activation).

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use greenlight_core::error::CoreError;
use greenlight_core::password::hash_password;
use greenlight_core::permissions::DEFAULT_USER_PERMISSIONS;
use greenlight_core::tokens::{validate_token_plaintext, TokenScope};
use greenlight_core::user::validate_registration;
use greenlight_core::validation::FieldErrors;
use greenlight_db::models::user::{CreateUser, UserResponse};
use greenlight_db::repositories::{TokenRepo, UserRepo};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::mailer::{EmailMessage, WELCOME_TEMPLATE};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /v1/users`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for `PUT /v1/users/activated`.
#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    #[serde(default)]
    pub token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/users
///
/// Create an inactive account holding the default permissions and mail
/// its first activation token in the background. Returns 202.
pub async fn register_user(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;

    let mut errors = FieldErrors::new();
    validate_registration(&input.name, &input.email, &input.password, &mut errors);
    errors.into_result()?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    let (user, token) = UserRepo::register(
        &state.pool,
        &CreateUser {
            name: input.name,
            email: input.email,
            password_hash,
        },
        DEFAULT_USER_PERMISSIONS,
        state.config.activation_token_ttl(),
    )
    .await?;

    let mailer = state.mailer.clone();
    let message = EmailMessage {
        recipient: user.email.clone(),
        template: WELCOME_TEMPLATE,
        data: json!({
            "activation_token": token.plaintext,
            "user_id": user.id,
        }),
    };
    state
        .background
        .spawn("welcome_email", async move { mailer.send(message).await });

    tracing::info!(user_id = user.id, "User registered");
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "user": UserResponse::from(&user) })),
    ))
}

/// PUT /v1/users/activated
///
/// Activate the account owning an activation token, then revoke every
/// activation token of that account.
pub async fn activate_user(
    State(state): State<AppState>,
    payload: Result<Json<ActivateRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;

    let mut errors = FieldErrors::new();
    validate_token_plaintext(&input.token, &mut errors);
    errors.into_result()?;

    let mut user = UserRepo::find_for_token(&state.pool, TokenScope::Activation, &input.token)
        .await
        .map_err(|e| match e {
            CoreError::NotFound { .. } => {
                CoreError::invalid_field("token", "invalid or expired activation token")
            }
            other => other,
        })?;

    user.activated = true;
    user.version = UserRepo::update(&state.pool, &user).await?;
    TokenRepo::revoke(&state.pool, user.id, TokenScope::Activation).await?;

    tracing::info!(user_id = user.id, "User activated");
    Ok(Json(json!({ "user": UserResponse::from(&user) })))
}
