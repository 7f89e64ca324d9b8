//! Account signup, login, logout, and profile handlers.

#![allow(clippy::missing_errors_doc)]

use crate::{
    middleware::extract_session_token,
    state::AppState,
    types::{ApiError, MessageResponse, SuccessResponse, UserProfile},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Extension, Json,
};
use chrono::Utc;
use farmsense_core::auth::{
    normalize_email, AuthError, AuthenticatedUser, NewUser, Password, Session, SessionToken,
    UserRole,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use utoipa::ToSchema;

// ========== Request/Response Types ==========

/// Payload for `POST /api/auth/signup`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    /// Defaults to `farmer` when omitted.
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub farm_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Payload for `POST /api/auth/login`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned by a successful login. The plaintext token travels to the client
/// exactly once, here; only its digest is stored server-side.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

// ========== Validation ==========

/// Checks a signup payload before any database work.
fn validate_signup(req: &SignupRequest) -> Result<(), String> {
    let email = req.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err("A valid email address is required".to_string());
    }
    if req.password.len() < Password::MIN_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            Password::MIN_LENGTH
        ));
    }
    if req.full_name.trim().is_empty() {
        return Err("Full name is required".to_string());
    }
    Ok(())
}

// ========== Handlers ==========

/// POST /api/auth/signup - Register a new account.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created", body = SuccessResponse<UserProfile>),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Database error")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse<UserProfile>>, ApiError> {
    let Json(req) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    validate_signup(&req).map_err(ApiError::Validation)?;

    let password_hash = Password::hash(&req.password)?;
    let user = state
        .identity
        .create_user(NewUser {
            email: normalize_email(&req.email),
            password_hash,
            full_name: req.full_name.trim().to_string(),
            role: req.role,
            farm_name: req.farm_name,
            location: req.location,
            phone: req.phone,
        })
        .await?;

    info!(user_id = %user.id, "account created");
    Ok(Json(SuccessResponse::new(UserProfile::from(&user))))
}

/// POST /api/auth/login - Exchange credentials for a session token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = LoginResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Credentials rejected"),
        (status = 429, description = "Too many attempts for this account"),
        (status = 500, description = "Database error")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    let email = normalize_email(&req.email);

    // The limiter is consulted before the password is verified, so hammering
    // a single account costs attempts whether or not the password is right.
    if !state.login_limiter.check(&email) {
        warn!(%email, "login rate limit hit");
        return Err(ApiError::from(AuthError::RateLimited));
    }

    let Some(user) = state.identity.find_user_by_email(&email).await? else {
        debug!(%email, "login for unknown email");
        return Err(ApiError::from(AuthError::InvalidCredentials));
    };
    if !Password::verify(&req.password, &user.password_hash) {
        debug!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::from(AuthError::InvalidCredentials));
    }
    if !user.is_active {
        // Same answer as a wrong password so the response does not reveal
        // whether the account exists or was deactivated.
        debug!(user_id = %user.id, "login for inactive account");
        return Err(ApiError::from(AuthError::InvalidCredentials));
    }

    state.login_limiter.reset(&email);

    let token = SessionToken::generate()?;
    let now = Utc::now();
    state
        .identity
        .create_session(Session {
            token_hash: SessionToken::digest(&token),
            user_id: user.id.clone(),
            created_at: now,
            expires_at: now + state.settings.session_ttl,
        })
        .await?;

    info!(user_id = %user.id, "login succeeded");
    Ok(Json(LoginResponse {
        token,
        user: UserProfile::from(&user),
    }))
}

/// POST /api/auth/logout - Close the current session.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Session closed", body = SuccessResponse<MessageResponse>),
        (status = 401, description = "Missing or invalid session token"),
        (status = 500, description = "Database error")
    ),
    security(("session_token" = []))
)]
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    headers: HeaderMap,
) -> Result<Json<SuccessResponse<MessageResponse>>, ApiError> {
    // The session layer already admitted this request, so the header is
    // present; re-extract the plaintext to digest and revoke it.
    let Some(token) = extract_session_token(&headers) else {
        return Err(ApiError::Unauthorized("Missing session token".to_string()));
    };
    state
        .identity
        .delete_session(&SessionToken::digest(&token))
        .await?;
    state.session_auth.invalidate(&token);

    info!(user_id = %user.user_id, "session closed");
    Ok(Json(SuccessResponse::new(MessageResponse::new("Logged out"))))
}

/// GET /api/auth/me - Profile of the authenticated account.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Current profile", body = SuccessResponse<UserProfile>),
        (status = 401, description = "Missing or invalid session token"),
        (status = 500, description = "Database error")
    ),
    security(("session_token" = []))
)]
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<SuccessResponse<UserProfile>>, ApiError> {
    // Re-fetch for the full row; the request extension only carries the
    // fields the session layer needed.
    let Some(full) = state.identity.find_user_by_id(&user.user_id).await? else {
        // Account deleted out from under a live session.
        return Err(ApiError::Unauthorized("Invalid session token".to_string()));
    };
    Ok(Json(SuccessResponse::new(UserProfile::from(&full))))
}
