//! Identity models and the credential primitives behind them.
//!
//! Passwords are stored as Argon2id PHC strings and never leave this module
//! in plaintext. Session tokens are high-entropy random strings handed to
//! the client once; only their SHA-256 digest is persisted, so a leaked
//! database cannot be replayed as live sessions.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use chrono::{DateTime, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use utoipa::ToSchema;

use crate::auth::AuthError;

/// What kind of account this is. Informational for now; every role has the
/// same capabilities over its own data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Runs a farm and files records for it.
    #[default]
    Farmer,
    /// Provides veterinary oversight.
    Veterinarian,
    /// Local or regulatory authority account.
    Authority,
}

impl UserRole {
    /// Storage form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Farmer => "farmer",
            Self::Veterinarian => "veterinarian",
            Self::Authority => "authority",
        }
    }

    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "farmer" => Some(Self::Farmer),
            "veterinarian" => Some(Self::Veterinarian),
            "authority" => Some(Self::Authority),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One registered account row.
///
/// Deliberately not serializable: `password_hash` must never travel in an
/// API response. The server layer builds its own profile DTO from this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    /// Stored normalized (trimmed, lowercase); the unique key for login.
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub full_name: String,
    pub role: UserRole,
    pub farm_name: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    /// Cleared to deactivate an account; existing sessions stop working on
    /// the next check.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A signup as submitted, before the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: UserRole,
    pub farm_name: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
}

/// One login session row. Only the token digest is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// SHA-256 hex digest of the plaintext token; primary key.
    pub token_hash: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Session token generation, format checks, and digesting.
pub struct SessionToken;

impl SessionToken {
    const PREFIX: &'static str = "fs_";
    const RANDOM_LENGTH: usize = 32;
    const TOTAL_LENGTH: usize = Self::PREFIX.len() + Self::RANDOM_LENGTH;

    /// Generates a fresh session token with the `fs_` prefix.
    ///
    /// Uses rejection sampling so every alphanumeric character is equally
    /// likely; a plain modulo would skew the first eight characters of the
    /// charset by about 1.6%.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TokenGenerationError`] if the system random
    /// number generator fails.
    pub fn generate() -> Result<String, AuthError> {
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        const CHARSET_LEN: usize = 62;
        #[allow(clippy::cast_possible_truncation)]
        const MAX_UNBIASED: u8 = (256 / CHARSET_LEN * CHARSET_LEN - 1) as u8;

        let rng = SystemRandom::new();
        let mut token = String::with_capacity(Self::TOTAL_LENGTH);
        token.push_str(Self::PREFIX);

        for _ in 0..Self::RANDOM_LENGTH {
            loop {
                let mut byte = [0u8; 1];
                rng.fill(&mut byte).map_err(|_| {
                    AuthError::TokenGenerationError("secure random source failed".to_string())
                })?;

                if byte[0] <= MAX_UNBIASED {
                    token.push(CHARSET[(byte[0] as usize) % CHARSET_LEN] as char);
                    break;
                }
            }
        }

        Ok(token)
    }

    /// Cheap shape check before any digesting or database work. Rejecting
    /// malformed tokens here keeps junk out of the lookup path.
    #[must_use]
    pub fn is_valid_format(token: &str) -> bool {
        token.len() == Self::TOTAL_LENGTH
            && token.starts_with(Self::PREFIX)
            && token[Self::PREFIX.len()..].chars().all(|c| c.is_ascii_alphanumeric())
    }

    /// SHA-256 hex digest of a plaintext token, the form stored in the
    /// sessions table.
    ///
    /// SHA-256 without a work factor is fine here: tokens are 62^32 random
    /// strings, not guessable passwords, so the digest only needs to be
    /// one-way, not slow.
    #[must_use]
    pub fn digest(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Password hashing and verification.
pub struct Password;

impl Password {
    /// Shortest password signup accepts.
    pub const MIN_LENGTH: usize = 8;

    /// Hashes a password with Argon2id (OWASP parameters: 64 MB memory,
    /// 3 iterations, parallelism 4).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::HashingError`] if parameter construction,
    /// salting, or hashing fails.
    pub fn hash(password: &str) -> Result<String, AuthError> {
        let params = Params::new(65536, 3, 4, Some(32))
            .map_err(|e| AuthError::HashingError(format!("argon2 params: {e}")))?;
        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

        let rng = SystemRandom::new();
        let mut salt_bytes = [0u8; 16];
        rng.fill(&mut salt_bytes)
            .map_err(|_| AuthError::HashingError("salt generation failed".to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| AuthError::HashingError(format!("salt encoding: {e}")))?;

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashingError(format!("password hashing: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a password against a stored PHC string. Malformed stored
    /// hashes verify as `false` rather than erroring.
    #[must_use]
    pub fn verify(password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
    }
}

/// Canonical email form used for storage and lookup.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
