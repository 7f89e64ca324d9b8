//! Canned-response assistant handler.

#![allow(clippy::missing_errors_doc)]

use crate::{state::AppState, types::ApiError};
use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use farmsense_core::{
    assistant::{respond, ChatReply},
    auth::AuthenticatedUser,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use utoipa::ToSchema;

// ========== Request/Response Types ==========

/// Payload for `POST /api/ai-chat`. `message` is kept untyped so a missing,
/// non-string, or empty value all produce the same 400.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    #[serde(default)]
    #[schema(value_type = String)]
    pub message: Option<Value>,
}

// ========== Handlers ==========

/// POST /api/ai-chat - Ask the keyword-matching assistant.
#[utoipa::path(
    post,
    path = "/api/ai-chat",
    tag = "Assistant",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatReply),
        (status = 400, description = "Message missing or not a string"),
        (status = 401, description = "Missing or invalid session token")
    ),
    security(("session_token" = []))
)]
pub async fn chat(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(req) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    let Some(message) = req
        .message
        .as_ref()
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
    else {
        return Err(ApiError::Validation("Message is required".to_string()));
    };

    let reply = respond(message);
    debug!(user_id = %user.user_id, category = %reply.category, "assistant reply");

    // Optional fixed pacing so replies do not land uncannily fast.
    let delay = state.settings.assistant_delay;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    Ok(Json(reply))
}
