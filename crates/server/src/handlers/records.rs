//! Health record submission and listing handlers.

#![allow(clippy::missing_errors_doc)]

use crate::{
    state::AppState,
    types::{ApiError, SuccessResponse},
};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Extension, Json,
};
use farmsense_core::{
    alerts::alerts_for_submission,
    auth::AuthenticatedUser,
    records::{HealthRecord, NewHealthRecord, RecordMetrics, RecordStatus, RecordType},
};
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::ToSchema;

/// Default page size when the caller does not ask for one.
const DEFAULT_LIMIT: i64 = 50;
/// Hard cap on a single page.
const MAX_LIMIT: i64 = 200;

// ========== Request/Response Types ==========

/// Payload for `POST /api/records`. Mirrors [`HealthRecord`] minus the
/// store-assigned fields; `recordType` selects the metrics schema and an
/// unknown type or metric key is rejected at deserialization.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordRequest {
    pub subject_name: String,
    #[serde(flatten)]
    pub metrics: RecordMetrics,
    pub status: RecordStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Query string for `GET /api/records`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ListRecordsQuery {
    pub record_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Resolves requested paging against the defaults and the page cap.
fn clamp_page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

// ========== Handlers ==========

/// POST /api/records - Submit a health record.
///
/// Companion alerts follow the configured write policy and are best-effort:
/// the record write stands even when the alert insert fails.
#[utoipa::path(
    post,
    path = "/api/records",
    tag = "Records",
    request_body = CreateRecordRequest,
    responses(
        (status = 200, description = "Record stored", body = SuccessResponse<HealthRecord>),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Missing or invalid session token"),
        (status = 500, description = "Database error")
    ),
    security(("session_token" = []))
)]
pub async fn create_record(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<CreateRecordRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse<HealthRecord>>, ApiError> {
    let Json(req) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    if req.subject_name.trim().is_empty() {
        return Err(ApiError::Validation("Subject name is required".to_string()));
    }

    let record = state
        .records
        .create_record(
            NewHealthRecord {
                user_id: user.user_id.clone(),
                subject_name: req.subject_name.trim().to_string(),
                metrics: req.metrics,
                status: req.status,
                notes: req.notes,
            }
            .normalized(),
        )
        .await?;

    let drafts = alerts_for_submission(&record, state.settings.write_policy);
    match state.alerts.create_alerts(&user.user_id, &drafts).await {
        Ok(alerts) => info!(
            user_id = %user.user_id,
            record_id = %record.id,
            record_type = %record.record_type(),
            alerts = alerts.len(),
            "record stored"
        ),
        Err(err) => warn!(
            user_id = %user.user_id,
            record_id = %record.id,
            error = %err,
            "companion alert write failed"
        ),
    }

    Ok(Json(SuccessResponse::new(record)))
}

/// GET /api/records - The caller's records, newest first.
#[utoipa::path(
    get,
    path = "/api/records",
    tag = "Records",
    params(
        ("record_type" = Option<String>, Query, description = "Filter: human, animal, or environment"),
        ("limit" = Option<i64>, Query, description = "Page size (default 50, max 200)"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "Records for the caller", body = SuccessResponse<Vec<HealthRecord>>),
        (status = 400, description = "Unknown record type"),
        (status = 401, description = "Missing or invalid session token"),
        (status = 500, description = "Database error")
    ),
    security(("session_token" = []))
)]
pub async fn list_records(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<ListRecordsQuery>,
) -> Result<Json<SuccessResponse<Vec<HealthRecord>>>, ApiError> {
    let record_type = match query.record_type.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            RecordType::from_str(raw)
                .ok_or_else(|| ApiError::Validation(format!("invalid record type: {raw}")))?,
        ),
    };
    let (limit, offset) = clamp_page(query.limit, query.offset);

    let records = state
        .records
        .list_records(&user.user_id, record_type, limit, offset)
        .await?;
    Ok(Json(SuccessResponse::new(records)))
}
