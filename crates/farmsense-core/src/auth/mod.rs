//! Session authentication for the FarmSense API.
//!
//! Implements the account and session lifecycle: password signup, token
//! login, per-request session resolution, and expiry cleanup, backed by
//! `SQLite`.
//!
//! # Architecture
//!
//! - **[`credentials`]**: Data models ([`User`](credentials::User),
//!   [`Session`](credentials::Session)) and the crypto primitives
//!   ([`Password`](credentials::Password),
//!   [`SessionToken`](credentials::SessionToken)).
//! - **[`repository`]**: Database abstraction
//!   ([`IdentityRepository`](repository::IdentityRepository) trait) with the
//!   `SQLite` implementation.
//! - **[`AuthenticatedUser`]**: Post-authentication identity attached to each
//!   request.
//!
//! # Authentication Flow
//!
//! ```text
//!
//!   HTTP Request                      Repository Layer        Request Handling
//!   ============                      ================        ================
//!
//!   X-Session-Token: fs_abc...
//!        │
//!        ├──> Format Validation
//!        │    (35 chars, fs_ prefix)
//!        │
//!        ├──> SHA-256 Digest ───────> Session + User Lookup
//!        │    (tokens stored hashed)  (single joined query)
//!        │                                 │
//!        ├──> Expiry / Active Checks <─────┘
//!        │    - expires_at > now
//!        │    - user.is_active
//!        │
//!        └──> AuthenticatedUser ──────────────────────────> handler reads it
//!             (id, email, name, role)                       from extensions
//! ```
//!
//! # Security Notes
//!
//! - Passwords are Argon2id PHC strings (64 MB memory, 3 iterations,
//!   parallelism 4); plaintext never touches the database.
//! - Session tokens are generated from Ring's `SystemRandom` with rejection
//!   sampling and stored only as SHA-256 digests, so a database leak does
//!   not yield usable sessions. The digest also keeps lookups O(1) on the
//!   primary key.
//! - Login failures collapse into one [`AuthError::InvalidCredentials`]
//!   answer whether the email is unknown or the password wrong, so the
//!   endpoint cannot be used to enumerate accounts.
//!
//! # Error Handling
//!
//! All operations return [`Result<T, AuthError>`](AuthError). The server
//! layer maps these onto HTTP statuses: credential and session problems
//! become 401, [`EmailTaken`](AuthError::EmailTaken) becomes 409, and
//! database failures become 500.

pub mod credentials;
pub mod repository;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub use credentials::{normalize_email, NewUser, Password, Session, SessionToken, User, UserRole};
pub use repository::{IdentityRepository, SqliteIdentityRepository};

/// Error types for account and session operations.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Login failed. Deliberately does not say whether the email or the
    /// password was wrong.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The presented token is malformed or matches no session.
    #[error("invalid session token")]
    InvalidSession,

    /// The session exists but is past its expiry.
    #[error("session expired")]
    ExpiredSession,

    /// The account behind the session has been deactivated.
    #[error("account is inactive")]
    InactiveUser,

    /// Signup attempted with an email that is already registered.
    #[error("email is already registered")]
    EmailTaken,

    /// Too many recent login attempts for this account.
    #[error("too many login attempts, try again later")]
    RateLimited,

    /// Database operation failed.
    #[error("database error: {0}")]
    DatabaseError(String),

    /// Secure random generation failed while minting a token.
    #[error("token generation error: {0}")]
    TokenGenerationError(String),

    /// Password hashing failed.
    #[error("password hashing error: {0}")]
    HashingError(String),
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::DatabaseError(err.to_string())
    }
}

/// The identity a request acts as, resolved once by the session layer and
/// carried in request extensions. Everything handlers need without another
/// database lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
}
