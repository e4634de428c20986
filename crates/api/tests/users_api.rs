//! HTTP-level integration tests for registration, activation and tokens.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, create_user, get_auth, post_json, send_json, TEST_PASSWORD};
use greenlight_api::mailer::{ACTIVATION_TEMPLATE, WELCOME_TEMPLATE};
use greenlight_core::permissions::MOVIES_READ;
use greenlight_db::repositories::{PermissionRepo, UserRepo};
use serde_json::json;
use sqlx::PgPool;

fn registration(email: &str) -> serde_json::Value {
    json!({ "name": "Alice Smith", "email": email, "password": TEST_PASSWORD })
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_creates_inactive_reader_and_mails_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(&app, "/v1/users", registration("alice@example.com")).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let json = body_json(response).await;
    assert_eq!(json["user"]["email"], "alice@example.com");
    assert_eq!(json["user"]["activated"], false);
    assert!(json["user"].get("password_hash").is_none());

    let user_id = json["user"]["id"].as_i64().unwrap();
    let held = PermissionRepo::list_for_user(&app.pool, user_id).await.unwrap();
    assert!(held.includes(MOVIES_READ));
    assert_eq!(held.len(), 1);

    app.drain().await;
    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].template, WELCOME_TEMPLATE);
    assert_eq!(sent[0].data["user_id"], user_id);
    let token = app.mailer.last_activation_token("alice@example.com").unwrap();
    assert_eq!(token.len(), 26);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_validates_every_field(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = json!({ "name": "", "email": "not-an-email", "password": "short" });
    let response = post_json(&app, "/v1/users", body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert!(json["error"]["name"].is_string());
    assert!(json["error"]["email"].is_string());
    assert!(json["error"]["password"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_is_a_field_error(pool: PgPool) {
    let app = common::build_test_app(pool);
    post_json(&app, "/v1/users", registration("alice@example.com")).await;

    let response = post_json(&app, "/v1/users", registration("Alice@Example.com")).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_json(response).await["error"]["email"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_registration_leaves_no_account_behind(pool: PgPool) {
    let app = common::build_test_app(pool);
    sqlx::query("DELETE FROM permissions WHERE code = $1")
        .bind(MOVIES_READ)
        .execute(&app.pool)
        .await
        .unwrap();

    let response = post_json(&app, "/v1/users", registration("alice@example.com")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(UserRepo::find_by_email(&app.pool, "alice@example.com")
        .await
        .unwrap()
        .is_none());

    app.drain().await;
    assert!(app.mailer.sent().is_empty());

    sqlx::query("INSERT INTO permissions (code) VALUES ($1)")
        .bind(MOVIES_READ)
        .execute(&app.pool)
        .await
        .unwrap();
    let response = post_json(&app, "/v1/users", registration("alice@example.com")).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let user_id = body_json(response).await["user"]["id"].as_i64().unwrap();
    let held = PermissionRepo::list_for_user(&app.pool, user_id).await.unwrap();
    assert!(held.includes(MOVIES_READ));
}

// ---------------------------------------------------------------------------
// Activation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn activation_token_activates_once(pool: PgPool) {
    let app = common::build_test_app(pool);
    post_json(&app, "/v1/users", registration("alice@example.com")).await;
    app.drain().await;
    let token = app.mailer.last_activation_token("alice@example.com").unwrap();

    let body = json!({ "token": token });
    let response = send_json(&app, Method::PUT, "/v1/users/activated", None, body.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["user"]["activated"], true);

    let response = send_json(&app, Method::PUT, "/v1/users/activated", None, body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["error"]["token"],
        "invalid or expired activation token"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_activation_token_is_a_field_error(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = json!({ "token": "abc" });
    let response = send_json(&app, Method::PUT, "/v1/users/activated", None, body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["error"]["token"], "must be 26 bytes long");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn resend_invalidates_the_previous_activation_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    post_json(&app, "/v1/users", registration("alice@example.com")).await;

    let response = post_json(
        &app,
        "/v1/tokens/activation",
        json!({ "email": "alice@example.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    app.drain().await;
    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 2);
    let first = sent
        .iter()
        .find(|m| m.template == WELCOME_TEMPLATE)
        .and_then(|m| m.data["activation_token"].as_str())
        .unwrap()
        .to_string();
    let second = sent
        .iter()
        .find(|m| m.template == ACTIVATION_TEMPLATE)
        .and_then(|m| m.data["activation_token"].as_str())
        .unwrap()
        .to_string();

    let stale = send_json(&app, Method::PUT, "/v1/users/activated", None, json!({ "token": first })).await;
    assert_eq!(stale.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let fresh = send_json(&app, Method::PUT, "/v1/users/activated", None, json!({ "token": second })).await;
    assert_eq!(fresh.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn resend_for_active_or_unknown_email_is_a_field_error(pool: PgPool) {
    let app = common::build_test_app(pool);
    create_user(&app.pool, "active@example.com", true, &[]).await;

    let response = post_json(&app, "/v1/tokens/activation", json!({ "email": "active@example.com" })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["error"]["email"],
        "user has already been activated"
    );

    let response = post_json(&app, "/v1/tokens/activation", json!({ "email": "ghost@example.com" })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["error"]["email"],
        "no matching email address found"
    );
}

// ---------------------------------------------------------------------------
// Authentication tokens
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn credentials_exchange_for_a_working_bearer_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    create_user(&app.pool, "alice@example.com", true, &[MOVIES_READ]).await;

    let body = json!({ "email": "alice@example.com", "password": TEST_PASSWORD });
    let response = post_json(&app, "/v1/tokens/authentication", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let token = json["authentication_token"]["token"].as_str().unwrap().to_string();
    assert!(json["authentication_token"]["expiry"].is_string());

    let response = get_auth(&app, "/v1/movies", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_password_and_unknown_email_look_the_same(pool: PgPool) {
    let app = common::build_test_app(pool);
    create_user(&app.pool, "alice@example.com", true, &[]).await;

    let wrong_password = post_json(
        &app,
        "/v1/tokens/authentication",
        json!({ "email": "alice@example.com", "password": "not-the-password" }),
    )
    .await;
    let unknown_email = post_json(
        &app,
        "/v1/tokens/authentication",
        json!({ "email": "ghost@example.com", "password": TEST_PASSWORD }),
    )
    .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong_password).await, body_json(unknown_email).await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn activation_tokens_do_not_authenticate(pool: PgPool) {
    let app = common::build_test_app(pool);
    post_json(&app, "/v1/users", registration("alice@example.com")).await;
    app.drain().await;
    let activation = app.mailer.last_activation_token("alice@example.com").unwrap();

    let user = UserRepo::find_by_email(&app.pool, "alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(!user.activated);

    let response = get_auth(&app, "/v1/movies", &activation).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
