//! Record submission pipeline tests: typed metrics, listing, and the
//! companion alert write under both write policies.

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{json, Value};

use farmsense_core::alerts::WritePolicy;

use crate::support::{
    get_with_token, post_json_with_token, request_json, signup_and_login, FailingAlertStore,
    TestApp,
};

#[tokio::test]
async fn test_human_record_round_trips_every_metric() {
    let tx = TestApp::new().await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    let (status, body) = request_json(
        &tx.app,
        post_json_with_token(
            "/api/records",
            &token,
            &json!({
                "subjectName": "Ion Marinescu",
                "recordType": "human",
                "metrics": {
                    "temperature": 36.9,
                    "bloodPressure": "120/80",
                    "heartRate": 72,
                    "symptoms": "slight fatigue"
                },
                "status": "normal",
                "notes": "after the morning shift"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    let created = &body["data"];
    assert!(!created["id"].as_str().unwrap().is_empty());
    assert_eq!(created["recordType"], "human");
    assert_eq!(created["metrics"]["temperature"], 36.9);
    assert_eq!(created["metrics"]["bloodPressure"], "120/80");
    assert_eq!(created["metrics"]["heartRate"], 72);
    assert_eq!(created["notes"], "after the morning shift");

    let (status, body) = request_json(&tx.app, get_with_token("/api/records", &token)).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body["data"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["subjectName"], "Ion Marinescu");
    assert_eq!(listed[0]["metrics"]["symptoms"], "slight fatigue");
    assert_eq!(listed[0]["id"], created["id"]);
}

#[tokio::test]
async fn test_submission_notice_is_written_for_every_record() {
    let tx = TestApp::new().await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    let (status, _) = request_json(
        &tx.app,
        post_json_with_token(
            "/api/records",
            &token,
            &json!({
                "subjectName": "Parcela Nord",
                "recordType": "environment",
                "metrics": { "temperature": 21.5, "humidity": 60.0 },
                "status": "normal"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request_json(&tx.app, get_with_token("/api/alerts", &token)).await;
    assert_eq!(status, StatusCode::OK);
    let alerts = body["data"].as_array().unwrap();
    assert_eq!(alerts.len(), 1, "an in-range normal record files only the notice");
    assert_eq!(alerts[0]["title"], "New record: Parcela Nord");
    assert_eq!(alerts[0]["severity"], "medium");
    assert_eq!(alerts[0]["category"], "environment");
    assert_eq!(alerts[0]["isRead"], false);
}

#[tokio::test]
async fn test_notify_policy_skips_threshold_alerts() {
    let tx = TestApp::with_write_policy(WritePolicy::Notify).await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    let (status, _) = request_json(
        &tx.app,
        post_json_with_token(
            "/api/records",
            &token,
            &json!({
                "subjectName": "Bella",
                "recordType": "animal",
                "metrics": { "animalType": "bovine", "temperature": 41.0 },
                "status": "warning"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request_json(&tx.app, get_with_token("/api/alerts", &token)).await;
    let alerts = body["data"].as_array().unwrap();
    assert_eq!(alerts.len(), 1, "notify policy writes only the submission notice");
    assert_eq!(alerts[0]["title"], "New record: Bella");
    assert_eq!(alerts[0]["severity"], "high", "notice severity mirrors the warning status");
}

#[tokio::test]
async fn test_derive_policy_files_threshold_alerts() {
    let tx = TestApp::new().await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    let (status, _) = request_json(
        &tx.app,
        post_json_with_token(
            "/api/records",
            &token,
            &json!({
                "subjectName": "Bella",
                "recordType": "animal",
                "metrics": { "animalType": "bovine", "temperature": 41.0 },
                "status": "warning"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request_json(&tx.app, get_with_token("/api/alerts", &token)).await;
    let alerts = body["data"].as_array().unwrap();
    assert_eq!(alerts.len(), 2);

    let titles: Vec<&str> = alerts.iter().map(|a| a["title"].as_str().unwrap()).collect();
    assert!(titles.contains(&"New record: Bella"));
    assert!(titles.contains(&"Abnormal temperature - Bella"));

    let temperature_alert =
        alerts.iter().find(|a| a["title"] == "Abnormal temperature - Bella").unwrap();
    assert_eq!(temperature_alert["severity"], "critical", "41.0 °C is past the critical mark");
    assert!(temperature_alert["message"].as_str().unwrap().contains("38.0-39.5"));
}

#[tokio::test]
async fn test_contaminated_water_record_files_both_alerts() {
    let tx = TestApp::new().await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    let (status, _) = request_json(
        &tx.app,
        post_json_with_token(
            "/api/records",
            &token,
            &json!({
                "subjectName": "Fantana Veche",
                "recordType": "environment",
                "metrics": { "waterQuality": "contaminated" },
                "status": "warning"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request_json(&tx.app, get_with_token("/api/alerts", &token)).await;
    let alerts = body["data"].as_array().unwrap();
    assert_eq!(alerts.len(), 2);

    let water = alerts
        .iter()
        .find(|a| a["title"] == "Water quality alert - Fantana Veche")
        .expect("water quality alert");
    assert_eq!(water["severity"], "critical");
    assert_eq!(water["category"], "environment");

    let notice =
        alerts.iter().find(|a| a["title"] == "New record: Fantana Veche").expect("notice");
    assert_eq!(notice["severity"], "high", "notice severity mirrors the warning status");
}

#[tokio::test]
async fn test_alert_write_failure_does_not_block_the_record() {
    let tx = TestApp::new().await.with_alert_store(Arc::new(FailingAlertStore));
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    let (status, body) = request_json(
        &tx.app,
        post_json_with_token(
            "/api/records",
            &token,
            &json!({
                "subjectName": "Bella",
                "recordType": "animal",
                "metrics": { "animalType": "bovine", "temperature": 41.0 },
                "status": "critical"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "the record write stands on its own: {body}");
    assert_eq!(body["success"], true);

    let (status, body) = request_json(&tx.app, get_with_token("/api/records", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1, "the record was persisted");
}

#[tokio::test]
async fn test_unknown_metric_key_is_rejected() {
    let tx = TestApp::new().await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    let (status, _) = request_json(
        &tx.app,
        post_json_with_token(
            "/api/records",
            &token,
            &json!({
                "subjectName": "Parcela Nord",
                "recordType": "environment",
                "metrics": { "temperature": 21.0, "radiation": 5 },
                "status": "normal"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = request_json(&tx.app, get_with_token("/api/records", &token)).await;
    assert!(body["data"].as_array().unwrap().is_empty(), "nothing was stored");
}

#[tokio::test]
async fn test_listing_filters_by_type_and_pages() {
    let tx = TestApp::new().await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    for (subject, record_type) in [
        ("Ion", "human"),
        ("Maria", "human"),
        ("Bella", "animal"),
        ("Petru", "human"),
        ("Miora", "animal"),
    ] {
        let (status, _) = request_json(
            &tx.app,
            post_json_with_token(
                "/api/records",
                &token,
                &json!({
                    "subjectName": subject,
                    "recordType": record_type,
                    "metrics": {},
                    "status": "normal"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{subject}");
    }

    let (_, body) =
        request_json(&tx.app, get_with_token("/api/records?record_type=animal", &token)).await;
    let animals = body["data"].as_array().unwrap();
    assert_eq!(animals.len(), 2);
    assert!(animals.iter().all(|r| r["recordType"] == "animal"));

    let (_, body) = request_json(&tx.app, get_with_token("/api/records?limit=2", &token)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) =
        request_json(&tx.app, get_with_token("/api/records?limit=2&offset=4", &token)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1, "only one row past offset 4");
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let tx = TestApp::new().await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    for subject in ["First", "Second"] {
        let (status, _) = request_json(
            &tx.app,
            post_json_with_token(
                "/api/records",
                &token,
                &json!({
                    "subjectName": subject,
                    "recordType": "human",
                    "metrics": {},
                    "status": "normal"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = request_json(&tx.app, get_with_token("/api/records", &token)).await;
    let listed = body["data"].as_array().unwrap();
    assert_eq!(listed[0]["subjectName"], "Second");
    assert_eq!(listed[1]["subjectName"], "First");
}

#[tokio::test]
async fn test_subject_is_trimmed_and_blank_notes_dropped() {
    let tx = TestApp::new().await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    let (status, body) = request_json(
        &tx.app,
        post_json_with_token(
            "/api/records",
            &token,
            &json!({
                "subjectName": "  Bella  ",
                "recordType": "animal",
                "metrics": {},
                "status": "normal",
                "notes": "   "
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["subjectName"], "Bella");
    assert_eq!(body["data"]["notes"], Value::Null, "whitespace-only notes are stored as absent");
}
