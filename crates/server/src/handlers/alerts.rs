//! Alert listing and management handlers.

#![allow(clippy::missing_errors_doc)]

use crate::{
    state::AppState,
    types::{ApiError, MessageResponse, SuccessResponse},
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};
use farmsense_core::{
    alerts::{Alert, AlertCategory, AlertDraft, AlertFilter, AlertSeverity},
    auth::AuthenticatedUser,
};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

// ========== Request/Response Types ==========

/// Payload for `POST /api/alerts/create`. Every field is required; blank
/// strings count as missing.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAlertRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub severity: Option<AlertSeverity>,
    #[serde(default)]
    pub category: Option<AlertCategory>,
}

/// Query string for `GET /api/alerts`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ListAlertsQuery {
    pub severity: Option<String>,
    pub category: Option<String>,
    pub unread_only: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListAlertsQuery {
    /// Builds the store filter, rejecting unknown severity/category names.
    fn into_filter(self) -> Result<AlertFilter, ApiError> {
        let severity = match self.severity.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                AlertSeverity::from_str(raw)
                    .ok_or_else(|| ApiError::Validation(format!("invalid severity: {raw}")))?,
            ),
        };
        let category = match self.category.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                AlertCategory::from_str(raw)
                    .ok_or_else(|| ApiError::Validation(format!("invalid category: {raw}")))?,
            ),
        };
        Ok(AlertFilter {
            severity,
            category,
            unread_only: self.unread_only.unwrap_or(false),
            limit: self
                .limit
                .unwrap_or(AlertFilter::DEFAULT_LIMIT)
                .clamp(1, AlertFilter::MAX_LIMIT),
            offset: self.offset.unwrap_or(0).max(0),
        })
    }
}

// ========== Handlers ==========

/// GET /api/alerts - The caller's alerts, newest first.
#[utoipa::path(
    get,
    path = "/api/alerts",
    tag = "Alerts",
    params(
        ("severity" = Option<String>, Query, description = "Filter: low, medium, high, or critical"),
        ("category" = Option<String>, Query, description = "Filter: human, animal, environment, or general"),
        ("unread_only" = Option<bool>, Query, description = "Only alerts not yet marked read"),
        ("limit" = Option<i64>, Query, description = "Page size (default 50, max 200)"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Alerts for the caller", body = SuccessResponse<Vec<Alert>>),
        (status = 400, description = "Unknown severity or category"),
        (status = 401, description = "Missing or invalid session token"),
        (status = 500, description = "Database error")
    ),
    security(("session_token" = []))
)]
pub async fn list_alerts(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<ListAlertsQuery>,
) -> Result<Json<SuccessResponse<Vec<Alert>>>, ApiError> {
    let filter = query.into_filter()?;
    let alerts = state.alerts.list_alerts(&user.user_id, &filter).await?;
    Ok(Json(SuccessResponse::new(alerts)))
}

/// POST /api/alerts/create - File an alert by hand.
#[utoipa::path(
    post,
    path = "/api/alerts/create",
    tag = "Alerts",
    request_body = CreateAlertRequest,
    responses(
        (status = 200, description = "Alert stored", body = SuccessResponse<Alert>),
        (status = 400, description = "Missing required fields"),
        (status = 401, description = "Missing or invalid session token"),
        (status = 500, description = "Database error")
    ),
    security(("session_token" = []))
)]
pub async fn create_alert(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<CreateAlertRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse<Alert>>, ApiError> {
    let Json(req) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;

    let title = req.title.filter(|s| !s.trim().is_empty());
    let message = req.message.filter(|s| !s.trim().is_empty());
    let (Some(title), Some(message), Some(severity), Some(category)) =
        (title, message, req.severity, req.category)
    else {
        return Err(ApiError::Validation("Missing required fields".to_string()));
    };

    let alert = state
        .alerts
        .create_alert(
            &user.user_id,
            &AlertDraft::new(title, message, severity, category),
        )
        .await?;

    info!(user_id = %user.user_id, alert_id = %alert.id, %severity, "alert filed");
    Ok(Json(SuccessResponse::new(alert)))
}

/// POST /api/alerts/{id}/read - Mark one alert read.
#[utoipa::path(
    post,
    path = "/api/alerts/{id}/read",
    tag = "Alerts",
    params(("id" = String, Path, description = "Alert identifier")),
    responses(
        (status = 200, description = "Alert marked read", body = SuccessResponse<MessageResponse>),
        (status = 401, description = "Missing or invalid session token"),
        (status = 404, description = "No such alert for this caller"),
        (status = 500, description = "Database error")
    ),
    security(("session_token" = []))
)]
pub async fn mark_alert_read(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(alert_id): Path<String>,
) -> Result<Json<SuccessResponse<MessageResponse>>, ApiError> {
    if !state.alerts.mark_alert_read(&user.user_id, &alert_id).await? {
        return Err(ApiError::NotFound("Alert not found".to_string()));
    }
    Ok(Json(SuccessResponse::new(MessageResponse::new(
        "Alert marked as read",
    ))))
}

/// DELETE /api/alerts/{id} - Delete one alert.
#[utoipa::path(
    delete,
    path = "/api/alerts/{id}",
    tag = "Alerts",
    params(("id" = String, Path, description = "Alert identifier")),
    responses(
        (status = 200, description = "Alert deleted", body = SuccessResponse<MessageResponse>),
        (status = 401, description = "Missing or invalid session token"),
        (status = 404, description = "No such alert for this caller"),
        (status = 500, description = "Database error")
    ),
    security(("session_token" = []))
)]
pub async fn delete_alert(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(alert_id): Path<String>,
) -> Result<Json<SuccessResponse<MessageResponse>>, ApiError> {
    if !state.alerts.delete_alert(&user.user_id, &alert_id).await? {
        return Err(ApiError::NotFound("Alert not found".to_string()));
    }
    info!(user_id = %user.user_id, %alert_id, "alert deleted");
    Ok(Json(SuccessResponse::new(MessageResponse::new(
        "Alert deleted",
    ))))
}
