//! Request middleware for session authentication and login rate limiting.
//!
//! This module provides the **business logic layer** for request processing.
//! HTTP adapter functions (Axum extractors and middleware functions) live in
//! `crates/server/src/middleware`, while this module contains the session
//! resolution and rate limiting logic itself.
//!
//! # Architecture
//!
//! Authenticated API requests pass through a strict order of checks:
//!
//! ```text
//!   Incoming Request
//!        │
//!        ▼
//!   ┌─────────────────────────┐
//!   │  1. TOKEN EXTRACTION    │  X-Session-Token header
//!   │     - Header present?   │  (Authorization: Bearer accepted
//!   │     - Prefix check      │   as a fallback)
//!   └─────────────────────────┘
//!        │ missing / malformed?
//!        ├─> 401 Unauthorized
//!        │
//!        ▼
//!   ┌─────────────────────────┐
//!   │  2. SESSION RESOLUTION  │  SessionAuth::authenticate()
//!   │     - Cache lookup      │  - SHA-256 token digest
//!   │     - Joined DB lookup  │  - Expiry check
//!   │     - Account active?   │  - AuthenticatedUser
//!   └─────────────────────────┘
//!        │ AuthError?
//!        ├─> 401 Unauthorized
//!        │
//!        ▼
//!   ┌─────────────────────────┐
//!   │  3. REQUEST HANDLER     │  Records, alerts, dashboard,
//!   │     - Typed extraction  │  assistant chat
//!   │     - Owner scoping     │
//!   └─────────────────────────┘
//!        │
//!        ▼
//!   Response (JSON body or error)
//! ```
//!
//! The login endpoint is the one unauthenticated POST and gets its own guard:
//! [`LoginRateLimiter`] is consulted **before** the password is verified, so a
//! throttled caller learns nothing about whether the credentials were right.
//!
//! # Module Organization
//!
//! - **[`auth`]**: Session token resolution with a short-lived cache
//! - **[`rate_limiting`]**: Per-account token bucket for login attempts
//!
//! Request body validation has no middleware of its own: payloads are
//! deserialized into the strict types in [`crate::records`], which reject
//! unknown record types and cross-type metric keys at the serde boundary.
//!
//! # Session Resolution
//!
//! [`SessionAuth`](auth::SessionAuth) caches successful resolutions for 60
//! seconds, keyed by token digest:
//!
//! - **Cache hit**: no database query, but the session expiry stored with the
//!   entry is still re-checked against the clock
//! - **Cache miss**: single JOIN query resolving session and user together
//! - **Invalidation**: TTL expiry, plus explicit `invalidate()` on logout
//!
//! # Error Handling
//!
//! Middleware errors map onto HTTP statuses in the `server` crate:
//!
//! | Error Type                  | Status | Description                        |
//! |-----------------------------|--------|------------------------------------|
//! | `AuthError::InvalidSession` | 401    | Token unknown or malformed         |
//! | `AuthError::ExpiredSession` | 401    | Session past its expiry            |
//! | `AuthError::InactiveUser`   | 401    | Account deactivated                |
//! | `AuthError::RateLimited`    | 429    | Login attempts exhausted           |
//! | `AuthError::DatabaseError`  | 500    | Lookup failed                      |
//!
//! # Integration with Server Crate
//!
//! ```rust,ignore
//! // In crates/server/src/middleware/auth.rs
//! pub async fn require_session(
//!     State(state): State<AppState>,
//!     mut request: Request,
//!     next: Next,
//! ) -> Result<Response, ApiError> {
//!     let token = extract_session_token(request.headers())?;
//!     let user = state.session_auth.authenticate(&token).await?;
//!     request.extensions_mut().insert(user);
//!     Ok(next.run(request).await)
//! }
//! ```
//!
//! Keeping the logic here and the Axum adapters in the server crate lets the
//! session cache and the limiter be tested without any HTTP machinery.

pub mod auth;
pub mod rate_limiting;

pub use auth::SessionAuth;
pub use rate_limiting::LoginRateLimiter;
