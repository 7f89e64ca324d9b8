//! Dashboard summary tests: counts, recent windows, and how read state and
//! other users' data stay out of it.

use axum::http::StatusCode;
use serde_json::json;

use crate::support::{
    get_with_token, post_json_with_token, request_json, signup_and_login, TestApp,
};

async fn submit_record(tx: &TestApp, token: &str, subject: &str, record_type: &str) {
    let (status, body) = request_json(
        &tx.app,
        post_json_with_token(
            "/api/records",
            token,
            &json!({
                "subjectName": subject,
                "recordType": record_type,
                "metrics": {},
                "status": "normal"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "seeding {subject}: {body}");
}

#[tokio::test]
async fn test_empty_dashboard_is_all_zeroes() {
    let tx = TestApp::new().await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    let (status, body) = request_json(&tx.app, get_with_token("/api/dashboard", &token)).await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["recordCounts"], json!({ "human": 0, "animal": 0, "environment": 0 }));
    assert!(data["recentRecords"].as_array().unwrap().is_empty());
    assert!(data["unreadAlerts"].as_array().unwrap().is_empty());
    assert_eq!(data["alertCounts"], json!({ "unread": 0, "critical": 0, "high": 0 }));
}

#[tokio::test]
async fn test_dashboard_reflects_seeded_activity() {
    let tx = TestApp::new().await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    submit_record(&tx, &token, "Ion", "human").await;
    submit_record(&tx, &token, "Maria", "human").await;
    submit_record(&tx, &token, "Bella", "animal").await;

    let (status, body) = request_json(&tx.app, get_with_token("/api/dashboard", &token)).await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["recordCounts"]["human"], 2);
    assert_eq!(data["recordCounts"]["animal"], 1);
    assert_eq!(data["recordCounts"]["environment"], 0);
    assert_eq!(data["recentRecords"].as_array().unwrap().len(), 3);

    // Each normal submission files one medium notice.
    assert_eq!(data["alertCounts"]["unread"], 3);
    assert_eq!(data["alertCounts"]["critical"], 0);
    assert_eq!(data["unreadAlerts"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_recent_windows_cap_while_counts_stay_exact() {
    let tx = TestApp::new().await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    for i in 0..12 {
        submit_record(&tx, &token, &format!("Subject {i}"), "human").await;
    }

    let (_, body) = request_json(&tx.app, get_with_token("/api/dashboard", &token)).await;
    let data = &body["data"];

    // The record window holds ten entries and the per-type counts describe
    // that window; the alert counters cover the whole table.
    assert_eq!(data["recentRecords"].as_array().unwrap().len(), 10);
    assert_eq!(data["recordCounts"]["human"], 10);
    assert_eq!(data["unreadAlerts"].as_array().unwrap().len(), 5);
    assert_eq!(data["alertCounts"]["unread"], 12);
}

#[tokio::test]
async fn test_read_alerts_leave_the_unread_window() {
    let tx = TestApp::new().await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    submit_record(&tx, &token, "Bella", "animal").await;
    submit_record(&tx, &token, "Miora", "animal").await;

    let (_, body) = request_json(&tx.app, get_with_token("/api/alerts", &token)).await;
    let first_id = body["data"][0]["id"].as_str().unwrap().to_string();

    let (status, _) = request_json(
        &tx.app,
        post_json_with_token(&format!("/api/alerts/{first_id}/read"), &token, &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request_json(&tx.app, get_with_token("/api/dashboard", &token)).await;
    let data = &body["data"];
    assert_eq!(data["alertCounts"]["unread"], 1);
    let unread = data["unreadAlerts"].as_array().unwrap();
    assert_eq!(unread.len(), 1);
    assert_ne!(unread[0]["id"], first_id);
}

#[tokio::test]
async fn test_dashboard_only_counts_the_callers_data() {
    let tx = TestApp::new().await;
    let ana = signup_and_login(&tx.app, "ana@farm.ro").await;
    let radu = signup_and_login(&tx.app, "radu@farm.ro").await;

    submit_record(&tx, &ana, "Bella", "animal").await;

    let (_, body) = request_json(&tx.app, get_with_token("/api/dashboard", &radu)).await;
    let data = &body["data"];
    assert_eq!(data["recordCounts"]["animal"], 0);
    assert_eq!(data["alertCounts"]["unread"], 0);
    assert!(data["recentRecords"].as_array().unwrap().is_empty());
}
