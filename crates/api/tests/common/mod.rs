#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::Duration as TokenTtl;
use greenlight_api::background::BackgroundTasks;
use greenlight_api::config::ServerConfig;
use greenlight_api::mailer::{EmailMessage, MailError, Mailer};
use greenlight_api::router::build_app_router;
use greenlight_api::state::AppState;
use greenlight_core::password::hash_password;
use greenlight_core::tokens::TokenScope;
use greenlight_db::models::user::{CreateUser, User};
use greenlight_db::repositories::{PermissionRepo, TokenRepo, UserRepo};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "pa55word!";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: String::new(),
        db_max_connections: 5,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        activation_token_ttl_hours: 72,
        auth_token_ttl_hours: 24,
        token_sweep_interval_secs: 3600,
        mail_sender: "Greenlight <test@greenlight.local>".to_string(),
    }
}

/// Mailer that keeps every message for later inspection.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// The `activation_token` carried by the most recent message to `recipient`.
    pub fn last_activation_token(&self, recipient: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find(|m| m.recipient == recipient)
            .and_then(|m| m.data["activation_token"].as_str().map(str::to_string))
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Router plus handles on the state it was built from.
pub struct TestApp {
    pub router: Router,
    pub pool: PgPool,
    pub mailer: Arc<RecordingMailer>,
    pub background: BackgroundTasks,
}

impl TestApp {
    /// Wait for detached work (mail delivery) to finish.
    pub async fn drain(&self) {
        assert!(self.background.shutdown(Duration::from_secs(5)).await);
    }
}

/// Build the full application router with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let config = test_config();
    let mailer = Arc::new(RecordingMailer::default());
    let background = BackgroundTasks::new();

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        background: background.clone(),
        mailer: mailer.clone(),
    };

    TestApp {
        router: build_app_router(state, &config),
        pool,
        mailer,
        background,
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`], optionally activated, holding `codes`.
pub async fn create_user(pool: &PgPool, email: &str, activated: bool, codes: &[&str]) -> User {
    let mut user = UserRepo::create(
        pool,
        &CreateUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
        },
    )
    .await
    .unwrap();

    if activated {
        user.activated = true;
        user.version = UserRepo::update(pool, &user).await.unwrap();
    }
    PermissionRepo::grant(pool, user.id, codes).await.unwrap();
    user
}

/// Issue an authentication token for `user_id` and return its plaintext.
pub async fn auth_token(pool: &PgPool, user_id: i64) -> String {
    TokenRepo::issue(pool, user_id, TokenTtl::hours(1), TokenScope::Authentication)
        .await
        .unwrap()
        .plaintext
}

/// An activated user holding `codes`, plus a bearer token for it.
pub async fn signed_in(pool: &PgPool, email: &str, codes: &[&str]) -> (User, String) {
    let user = create_user(pool, email, true, codes).await;
    let token = auth_token(pool, user.id).await;
    (user, token)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &TestApp, request: Request<Body>) -> Response<Body> {
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &TestApp, uri: &str) -> Response<Body> {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: &TestApp, uri: &str, token: &str) -> Response<Body> {
    let request = Request::get(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn send_json(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn post_json(app: &TestApp, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, None, body).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
