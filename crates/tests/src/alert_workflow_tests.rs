//! Manual alert workflow tests: creation defaults, filters, read state,
//! deletion, and per-user isolation.

use axum::http::StatusCode;
use serde_json::json;

use crate::support::{
    delete_with_token, get_with_token, post_json_with_token, request_json, signup_and_login,
    TestApp,
};

async fn create_alert(
    tx: &TestApp,
    token: &str,
    payload: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    request_json(&tx.app, post_json_with_token("/api/alerts/create", token, payload)).await
}

#[tokio::test]
async fn test_manual_alert_defaults_to_medium_general() {
    let tx = TestApp::new().await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    let (status, body) = create_alert(
        &tx,
        &token,
        &json!({ "title": "Fence damaged", "message": "North fence needs repair" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["title"], "Fence damaged");
    assert_eq!(body["data"]["severity"], "medium");
    assert_eq!(body["data"]["category"], "general");
    assert_eq!(body["data"]["isRead"], false);
}

#[tokio::test]
async fn test_manual_alert_requires_title_and_message() {
    let tx = TestApp::new().await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    let (status, body) = create_alert(&tx, &token, &json!({ "title": "Fence damaged" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");

    // Whitespace-only strings count as missing.
    let (status, _) =
        create_alert(&tx, &token, &json!({ "title": "   ", "message": "something" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_mark_read_drops_the_unread_filter() {
    let tx = TestApp::new().await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    let (_, first) = create_alert(
        &tx,
        &token,
        &json!({ "title": "Check water trough", "message": "Low level", "severity": "high" }),
    )
    .await;
    let (_, second) = create_alert(
        &tx,
        &token,
        &json!({ "title": "Vaccine due", "message": "Next week", "severity": "critical" }),
    )
    .await;
    let first_id = first["data"]["id"].as_str().unwrap();
    let second_id = second["data"]["id"].as_str().unwrap();

    let (status, _) = request_json(
        &tx.app,
        post_json_with_token(&format!("/api/alerts/{first_id}/read"), &token, &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) =
        request_json(&tx.app, get_with_token("/api/alerts?unread_only=true", &token)).await;
    let unread = body["data"].as_array().unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0]["id"], second_id);

    // Marking the same alert again is a no-op, not an error.
    let (status, _) = request_json(
        &tx.app,
        post_json_with_token(&format!("/api/alerts/{first_id}/read"), &token, &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_severity_and_category_filters_compose() {
    let tx = TestApp::new().await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    let seeds = [
        ("Barn door", "high", "general"),
        ("Sick calf", "high", "animal"),
        ("Pond algae", "low", "environment"),
        ("Fever in herd", "critical", "animal"),
    ];
    for (title, severity, category) in seeds {
        let (status, _) = create_alert(
            &tx,
            &token,
            &json!({ "title": title, "message": "seeded", "severity": severity, "category": category }),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{title}");
    }

    let (_, body) = request_json(&tx.app, get_with_token("/api/alerts?severity=high", &token)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) =
        request_json(&tx.app, get_with_token("/api/alerts?category=animal", &token)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = request_json(
        &tx.app,
        get_with_token("/api/alerts?severity=high&category=animal", &token),
    )
    .await;
    let filtered = body["data"].as_array().unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0]["title"], "Sick calf");

    let (status, body) =
        request_json(&tx.app, get_with_token("/api/alerts?severity=terrible", &token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid severity: terrible");
}

#[tokio::test]
async fn test_delete_removes_only_the_target() {
    let tx = TestApp::new().await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    let (_, keep) = create_alert(&tx, &token, &json!({ "title": "Keep", "message": "m" })).await;
    let (_, doomed) = create_alert(&tx, &token, &json!({ "title": "Drop", "message": "m" })).await;
    let drop_id = doomed["data"]["id"].as_str().unwrap();

    let (status, body) = request_json(
        &tx.app,
        delete_with_token(&format!("/api/alerts/{drop_id}"), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Alert deleted");

    let (_, body) = request_json(&tx.app, get_with_token("/api/alerts", &token)).await;
    let remaining = body["data"].as_array().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["id"], keep["data"]["id"]);

    // Deleting it again reports not found.
    let (status, _) = request_json(
        &tx.app,
        delete_with_token(&format!("/api/alerts/{drop_id}"), &token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_alerts_are_isolated_per_user() {
    let tx = TestApp::new().await;
    let ana = signup_and_login(&tx.app, "ana@farm.ro").await;
    let radu = signup_and_login(&tx.app, "radu@farm.ro").await;

    let (_, created) =
        create_alert(&tx, &ana, &json!({ "title": "Ana's alert", "message": "private" })).await;
    let alert_id = created["data"]["id"].as_str().unwrap();

    let (_, body) = request_json(&tx.app, get_with_token("/api/alerts", &radu)).await;
    assert!(body["data"].as_array().unwrap().is_empty(), "radu cannot see ana's alerts");

    let (status, _) = request_json(
        &tx.app,
        post_json_with_token(&format!("/api/alerts/{alert_id}/read"), &radu, &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "foreign mark-read reads as not found");

    let (status, _) = request_json(
        &tx.app,
        delete_with_token(&format!("/api/alerts/{alert_id}"), &radu),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "foreign delete reads as not found");

    // Ana still sees her alert, untouched.
    let (_, body) = request_json(&tx.app, get_with_token("/api/alerts", &ana)).await;
    let alerts = body["data"].as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["isRead"], false);
}
