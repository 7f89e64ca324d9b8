//! Session lifecycle tests: signup, login, authenticated access, logout,
//! expiry and login lockout.
//!
//! These go through the real router and store, so they cover the pieces the
//! unit tests cannot: email normalization end to end, the sweeper against
//! seeded sessions, and the interaction between the limiter and the login
//! handler.

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

use farmsense_core::auth::{IdentityRepository, Session, SessionToken};

use crate::support::{
    get_with_token, login, post_json, post_json_with_token, request_json, signup, signup_and_login,
    TestApp, TEST_PASSWORD,
};

#[tokio::test]
async fn test_signup_rejects_duplicate_email_case_insensitively() {
    let tx = TestApp::new().await;
    signup(&tx.app, "Ana@Farm.RO").await;

    let (status, body) = request_json(
        &tx.app,
        post_json(
            "/api/auth/signup",
            &json!({ "email": "ana@farm.ro", "password": TEST_PASSWORD, "fullName": "Ana Doua" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "email is already registered");
}

#[tokio::test]
async fn test_login_normalizes_the_submitted_email() {
    let tx = TestApp::new().await;
    signup(&tx.app, "ana@farm.ro").await;

    let (status, body) = request_json(
        &tx.app,
        post_json(
            "/api/auth/login",
            &json!({ "email": "  ANA@FARM.RO  ", "password": TEST_PASSWORD }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "ana@farm.ro");
    assert!(body["token"].as_str().unwrap().starts_with("fs_"));
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_read_the_same() {
    let tx = TestApp::new().await;
    signup(&tx.app, "ana@farm.ro").await;

    let (status, body) = request_json(
        &tx.app,
        post_json("/api/auth/login", &json!({ "email": "ana@farm.ro", "password": "wrong-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let wrong_password_error = body["error"].clone();

    let (status, body) = request_json(
        &tx.app,
        post_json(
            "/api/auth/login",
            &json!({ "email": "nobody@farm.ro", "password": TEST_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["error"], wrong_password_error,
        "login failures must not say which part was wrong"
    );
}

#[tokio::test]
async fn test_profile_round_trips_through_me() {
    let tx = TestApp::new().await;

    let (status, _) = request_json(
        &tx.app,
        post_json(
            "/api/auth/signup",
            &json!({
                "email": "vet@clinic.ro",
                "password": TEST_PASSWORD,
                "fullName": "Dr. Radu Pop",
                "role": "veterinarian",
                "farmName": "Clinica Campului",
                "location": "Sibiu",
                "phone": "+40 700 000 000"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let token = login(&tx.app, "vet@clinic.ro").await;
    let (status, body) = request_json(&tx.app, get_with_token("/api/auth/me", &token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["fullName"], "Dr. Radu Pop");
    assert_eq!(body["data"]["role"], "veterinarian");
    assert_eq!(body["data"]["farmName"], "Clinica Campului");
    assert_eq!(body["data"]["location"], "Sibiu");
    assert_eq!(body["data"]["phone"], "+40 700 000 000");
    assert!(body["data"].get("passwordHash").is_none(), "hash must never serialize");
}

#[tokio::test]
async fn test_logout_ends_the_session_immediately() {
    let tx = TestApp::new().await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    // Warm the session cache so logout has something to invalidate.
    let (status, _) = request_json(&tx.app, get_with_token("/api/auth/me", &token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        request_json(&tx.app, post_json_with_token("/api/auth/logout", &token, &json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Logged out");

    let (status, _) = request_json(&tx.app, get_with_token("/api/auth/me", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A second logout with the dead token is rejected at the middleware.
    let (status, _) =
        request_json(&tx.app, post_json_with_token("/api/auth/logout", &token, &json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_session_is_rejected_then_swept() {
    let tx = TestApp::new().await;
    signup(&tx.app, "ana@farm.ro").await;
    let live_token = login(&tx.app, "ana@farm.ro").await;

    let user = tx
        .state
        .identity
        .find_user_by_email("ana@farm.ro")
        .await
        .unwrap()
        .expect("account was just created");

    // Mint a session that expired an hour ago, straight into the store.
    let stale_token = SessionToken::generate().unwrap();
    tx.state
        .identity
        .create_session(Session {
            token_hash: SessionToken::digest(&stale_token),
            user_id: user.id.clone(),
            created_at: Utc::now() - Duration::hours(2),
            expires_at: Utc::now() - Duration::hours(1),
        })
        .await
        .unwrap();

    let (status, body) = request_json(&tx.app, get_with_token("/api/auth/me", &stale_token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "session expired");

    let swept = tx.state.identity.delete_expired_sessions().await.unwrap();
    assert_eq!(swept, 1, "only the stale session is swept");

    let (status, _) = request_json(&tx.app, get_with_token("/api/auth/me", &live_token)).await;
    assert_eq!(status, StatusCode::OK, "the live session survives the sweep");
}

#[tokio::test]
async fn test_successful_login_resets_the_failure_budget() {
    let tx = TestApp::new().await;
    signup(&tx.app, "ana@farm.ro").await;

    let bad_login = json!({ "email": "ana@farm.ro", "password": "wrong-pass" });

    // Four failures leave one attempt in the burst budget.
    for _ in 0..4 {
        let (status, _) = request_json(&tx.app, post_json("/api/auth/login", &bad_login)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    // The successful login spends the last attempt and resets the budget.
    login(&tx.app, "ana@farm.ro").await;

    for _ in 0..5 {
        let (status, _) = request_json(&tx.app, post_json("/api/auth/login", &bad_login)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "budget is full again after the reset");
    }

    let (status, body) = request_json(&tx.app, post_json("/api/auth/login", &bad_login)).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "too many login attempts, try again later");
}

#[tokio::test]
async fn test_lockout_applies_even_with_the_right_password() {
    let tx = TestApp::new().await;
    signup(&tx.app, "ana@farm.ro").await;

    let bad_login = json!({ "email": "ana@farm.ro", "password": "wrong-pass" });
    for _ in 0..5 {
        let (status, _) = request_json(&tx.app, post_json("/api/auth/login", &bad_login)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    // The limiter is consulted before the password, so the correct password
    // cannot slip through an exhausted budget.
    let (status, _) = request_json(
        &tx.app,
        post_json("/api/auth/login", &json!({ "email": "ana@farm.ro", "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_deactivated_account_is_locked_out() {
    let tx = TestApp::new().await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    sqlx::query("UPDATE users SET is_active = 0 WHERE email = ?")
        .bind("ana@farm.ro")
        .execute(&tx.state.pool)
        .await
        .unwrap();

    let (status, body) = request_json(
        &tx.app,
        post_json("/api/auth/login", &json!({ "email": "ana@farm.ro", "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid email or password");

    // The pre-deactivation token was never cached, so the store is consulted
    // and the inactive flag wins.
    let (status, body) = request_json(&tx.app, get_with_token("/api/auth/me", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "account is inactive");
}
