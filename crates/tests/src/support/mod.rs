//! Shared harness for the end-to-end suites.
//!
//! Builds the complete Axum application over a fresh in-memory database and
//! drives it with `tower::ServiceExt::oneshot`. Also provides store doubles
//! for failure paths the real store cannot produce on demand.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use farmsense_core::alerts::{Alert, AlertDraft, AlertFilter, WritePolicy};
use farmsense_core::auth::SqliteIdentityRepository;
use farmsense_core::middleware::{LoginRateLimiter, SessionAuth};
use farmsense_core::store::{
    connect, ensure_schema, AlertCounts, AlertRepository, SqliteStore, StoreError,
};
use server::router::create_app;
use server::state::{AppState, RuntimeSettings};

/// Password used by every seeded account.
pub const TEST_PASSWORD: &str = "pajiste-verde-9";

/// A fully wired application over its own in-memory database.
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

impl TestApp {
    /// Builds the app with default runtime settings.
    pub async fn new() -> Self {
        Self::with_settings(RuntimeSettings::default()).await
    }

    /// Builds the app with a specific alert write policy.
    pub async fn with_write_policy(policy: WritePolicy) -> Self {
        let settings = RuntimeSettings { write_policy: policy, ..RuntimeSettings::default() };
        Self::with_settings(settings).await
    }

    pub async fn with_settings(settings: RuntimeSettings) -> Self {
        // A single connection keeps every query on the same in-memory
        // database; a second connection would see an empty one.
        let pool = connect("sqlite::memory:", 1).await.unwrap();
        ensure_schema(&pool).await.unwrap();

        let identity = Arc::new(SqliteIdentityRepository::new(pool.clone()));
        let store = Arc::new(SqliteStore::new(pool.clone()));
        let state = AppState {
            identity: identity.clone(),
            records: store.clone(),
            alerts: store,
            session_auth: Arc::new(SessionAuth::new(identity)),
            login_limiter: Arc::new(LoginRateLimiter::new(5, 3)),
            settings: Arc::new(settings),
            pool,
        };

        Self { app: create_app(state.clone()), state }
    }

    /// Swaps the alert repository for a double and rebuilds the router.
    #[must_use]
    pub fn with_alert_store(mut self, alerts: Arc<dyn AlertRepository>) -> Self {
        self.state.alerts = alerts;
        self.app = create_app(self.state.clone());
        self
    }
}

/// Sends the request and decodes the JSON body, if any.
pub async fn request_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_json_with_token(uri: &str, token: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-session-token", token)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("x-session-token", token)
        .body(Body::empty())
        .unwrap()
}

pub fn delete_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header("x-session-token", token)
        .body(Body::empty())
        .unwrap()
}

/// Registers an account with [`TEST_PASSWORD`] and a minimal profile.
pub async fn signup(app: &Router, email: &str) -> Value {
    let (status, body) = request_json(
        app,
        post_json(
            "/api/auth/signup",
            &json!({ "email": email, "password": TEST_PASSWORD, "fullName": "Test Account" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signup for {email}: {body}");
    body
}

/// Logs an account in and returns its session token.
pub async fn login(app: &Router, email: &str) -> String {
    let (status, body) = request_json(
        app,
        post_json("/api/auth/login", &json!({ "email": email, "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login for {email}: {body}");
    body["token"].as_str().unwrap().to_string()
}

/// Registers a fresh account and returns a live session token for it.
pub async fn signup_and_login(app: &Router, email: &str) -> String {
    signup(app, email).await;
    login(app, email).await
}

/// Alert store double whose writes always fail. Reads behave as an empty
/// store so a dashboard over it still renders.
pub struct FailingAlertStore;

#[async_trait]
impl AlertRepository for FailingAlertStore {
    async fn create_alert(&self, _user_id: &str, _draft: &AlertDraft) -> Result<Alert, StoreError> {
        Err(StoreError::Database("injected alert write failure".to_string()))
    }

    async fn create_alerts(
        &self,
        _user_id: &str,
        _drafts: &[AlertDraft],
    ) -> Result<Vec<Alert>, StoreError> {
        Err(StoreError::Database("injected alert write failure".to_string()))
    }

    async fn list_alerts(
        &self,
        _user_id: &str,
        _filter: &AlertFilter,
    ) -> Result<Vec<Alert>, StoreError> {
        Ok(Vec::new())
    }

    async fn mark_alert_read(&self, _user_id: &str, _alert_id: &str) -> Result<bool, StoreError> {
        Ok(false)
    }

    async fn delete_alert(&self, _user_id: &str, _alert_id: &str) -> Result<bool, StoreError> {
        Ok(false)
    }

    async fn count_unread_alerts(&self, _user_id: &str) -> Result<AlertCounts, StoreError> {
        Ok(AlertCounts::default())
    }
}
