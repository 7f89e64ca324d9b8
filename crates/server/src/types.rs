//! Shared API response types and the HTTP error mapping.

use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use farmsense_core::{
    auth::{AuthError, User, UserRole},
    store::StoreError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

/// Envelope for successful responses: `{ "success": true, "data": ... }`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self { success: true, data }
    }
}

/// API error with its HTTP status. Serializes as `{ "error": "<message>" }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    RateLimited(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        // Internal details are logged, never sent to the caller.
        let body = if let Self::Internal(detail) = &self {
            error!(detail = %detail, "internal error");
            serde_json::json!({ "error": "Internal server error" })
        } else {
            serde_json::json!({ "error": self.to_string() })
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials |
            AuthError::InvalidSession |
            AuthError::ExpiredSession |
            AuthError::InactiveUser => Self::Unauthorized(err.to_string()),
            AuthError::EmailTaken => Self::Conflict(err.to_string()),
            AuthError::RateLimited => Self::RateLimited(err.to_string()),
            AuthError::DatabaseError(_) |
            AuthError::TokenGenerationError(_) |
            AuthError::HashingError(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidRecordType(_) | StoreError::InvalidMetrics(_) => {
                Self::Validation(err.to_string())
            }
            StoreError::Database(_) => Self::Internal(err.to_string()),
        }
    }
}

/// Public view of a user account. Built from [`User`], which deliberately
/// keeps the password hash out of anything serializable.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub farm_name: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            farm_name: user.farm_name.clone(),
            location: user.location.clone(),
            phone: user.phone.clone(),
            created_at: user.created_at,
        }
    }
}

/// Generic acknowledgement body for operations with nothing else to return.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
