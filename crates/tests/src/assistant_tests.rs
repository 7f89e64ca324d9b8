//! Assistant endpoint tests: keyword routing, the fallback, and input
//! validation through the full request path.

use axum::http::StatusCode;
use serde_json::json;

use crate::support::{post_json_with_token, request_json, signup_and_login, TestApp};

#[tokio::test]
async fn test_messages_route_to_their_keyword_family() {
    let tx = TestApp::new().await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    let cases = [
        ("My cow will not eat", "animal", "veterinarian"),
        ("is the water in the north well safe?", "environment", "water"),
        ("worker collapsed from the heat", "human", "60-100 bpm"),
        ("which treatment works for foot rot?", "general", "professional advice"),
    ];

    for (message, category, snippet) in cases {
        let (status, body) = request_json(
            &tx.app,
            post_json_with_token("/api/ai-chat", &token, &json!({ "message": message })),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{message}");
        assert_eq!(body["category"], category, "{message}");
        assert!(
            body["response"].as_str().unwrap().contains(snippet),
            "reply for {message:?} should mention {snippet:?}"
        );
    }
}

#[tokio::test]
async fn test_unmatched_message_gets_the_fallback() {
    let tx = TestApp::new().await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    let (status, body) = request_json(
        &tx.app,
        post_json_with_token("/api/ai-chat", &token, &json!({ "message": "buna dimineata" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "general");
    assert!(body["response"].as_str().unwrap().contains("I can help"));
}

#[tokio::test]
async fn test_matching_ignores_case() {
    let tx = TestApp::new().await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    let (_, lower) = request_json(
        &tx.app,
        post_json_with_token("/api/ai-chat", &token, &json!({ "message": "pig fever" })),
    )
    .await;
    let (_, upper) = request_json(
        &tx.app,
        post_json_with_token("/api/ai-chat", &token, &json!({ "message": "PIG FEVER" })),
    )
    .await;

    assert_eq!(lower, upper, "case must not change the reply");
    assert_eq!(lower["category"], "animal");
}

#[tokio::test]
async fn test_message_must_be_a_nonempty_string() {
    let tx = TestApp::new().await;
    let token = signup_and_login(&tx.app, "ana@farm.ro").await;

    for payload in [json!({}), json!({ "message": "" }), json!({ "message": 7 })] {
        let (status, body) =
            request_json(&tx.app, post_json_with_token("/api/ai-chat", &token, &payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(body["error"], "Message is required", "{payload}");
    }
}
