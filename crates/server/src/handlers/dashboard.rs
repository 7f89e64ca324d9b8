//! Dashboard summary handler.

#![allow(clippy::missing_errors_doc)]

use crate::{
    state::AppState,
    types::{ApiError, SuccessResponse},
};
use axum::{extract::State, Extension, Json};
use farmsense_core::{
    alerts::{Alert, AlertFilter},
    auth::AuthenticatedUser,
    records::{HealthRecord, RecordType},
    store::AlertCounts,
};
use serde::Serialize;
use utoipa::ToSchema;

/// How many recent records the dashboard shows and counts over.
const RECENT_RECORDS_LIMIT: i64 = 10;
/// How many unread alerts the dashboard lists.
const UNREAD_ALERTS_LIMIT: i64 = 5;

// ========== Response Types ==========

/// Per-type totals over the records shown on the dashboard. Counted over
/// the recent window, not the whole table.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct RecordTypeCounts {
    pub human: usize,
    pub animal: usize,
    pub environment: usize,
}

impl RecordTypeCounts {
    fn tally(records: &[HealthRecord]) -> Self {
        let mut counts = Self::default();
        for record in records {
            match record.record_type() {
                RecordType::Human => counts.human += 1,
                RecordType::Animal => counts.animal += 1,
                RecordType::Environment => counts.environment += 1,
            }
        }
        counts
    }
}

/// Unread alert totals, urgent severities broken out.
#[derive(Debug, Serialize, ToSchema)]
pub struct AlertCountSummary {
    pub unread: i64,
    pub critical: i64,
    pub high: i64,
}

impl From<AlertCounts> for AlertCountSummary {
    fn from(counts: AlertCounts) -> Self {
        Self {
            unread: counts.unread,
            critical: counts.critical,
            high: counts.high,
        }
    }
}

/// Everything the dashboard renders in one response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub record_counts: RecordTypeCounts,
    pub recent_records: Vec<HealthRecord>,
    pub unread_alerts: Vec<Alert>,
    pub alert_counts: AlertCountSummary,
}

// ========== Handlers ==========

/// GET /api/dashboard - Summary for the caller's landing page.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Dashboard summary", body = SuccessResponse<DashboardSummary>),
        (status = 401, description = "Missing or invalid session token"),
        (status = 500, description = "Database error")
    ),
    security(("session_token" = []))
)]
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<SuccessResponse<DashboardSummary>>, ApiError> {
    let recent_records = state
        .records
        .list_records(&user.user_id, None, RECENT_RECORDS_LIMIT, 0)
        .await?;
    let unread_alerts = state
        .alerts
        .list_alerts(
            &user.user_id,
            &AlertFilter {
                unread_only: true,
                limit: UNREAD_ALERTS_LIMIT,
                ..AlertFilter::default()
            },
        )
        .await?;
    let alert_counts = state.alerts.count_unread_alerts(&user.user_id).await?;

    Ok(Json(SuccessResponse::new(DashboardSummary {
        record_counts: RecordTypeCounts::tally(&recent_records),
        recent_records,
        unread_alerts,
        alert_counts: AlertCountSummary::from(alert_counts),
    })))
}
