use crate::auth::{
    credentials::SessionToken, repository::IdentityRepository, AuthenticatedUser, AuthError,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

/// Resolves session tokens to users, with a short in-memory cache so hot
/// sessions do not hit the database on every request.
pub struct SessionAuth {
    repository: Arc<dyn IdentityRepository>,
    cache: Arc<DashMap<String, CachedSession>>,
    cache_ttl: Duration,
}

struct CachedSession {
    user: AuthenticatedUser,
    /// Session expiry carried into the cache; a cache hit re-checks it so a
    /// session never outlives its expiry by the cache TTL.
    expires_at: DateTime<Utc>,
    cached_at: Instant,
}

impl SessionAuth {
    /// Default cache lifetime. Deactivating an account can therefore lag by
    /// up to this long on a hot session.
    pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

    #[must_use]
    pub fn new(repository: Arc<dyn IdentityRepository>) -> Self {
        Self::with_cache_ttl(repository, Self::DEFAULT_CACHE_TTL)
    }

    #[must_use]
    pub fn with_cache_ttl(repository: Arc<dyn IdentityRepository>, cache_ttl: Duration) -> Self {
        Self { repository, cache: Arc::new(DashMap::new()), cache_ttl }
    }

    /// Resolves a plaintext token to the user it belongs to.
    ///
    /// The cache is keyed by token digest, not plaintext, so resident
    /// memory never holds usable tokens.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the token is malformed, unknown, expired,
    /// belongs to an inactive account, or the lookup fails.
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        if !SessionToken::is_valid_format(token) {
            return Err(AuthError::InvalidSession);
        }

        let digest = SessionToken::digest(token);

        if let Some(cached) = self.cache.get(&digest) {
            if cached.cached_at.elapsed() < self.cache_ttl && Utc::now() < cached.expires_at {
                return Ok(cached.user.clone());
            }
        }

        let (session, user) = self
            .repository
            .find_session_user(&digest)
            .await?
            .ok_or(AuthError::InvalidSession)?;

        if session.is_expired() {
            // Best effort; the sweeper removes it anyway.
            let _ = self.repository.delete_session(&digest).await;
            self.cache.remove(&digest);
            return Err(AuthError::ExpiredSession);
        }

        if !user.is_active {
            return Err(AuthError::InactiveUser);
        }

        let authenticated = AuthenticatedUser {
            user_id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
        };

        self.cache.insert(
            digest,
            CachedSession {
                user: authenticated.clone(),
                expires_at: session.expires_at,
                cached_at: Instant::now(),
            },
        );

        Ok(authenticated)
    }

    /// Drops a token's cache entry. Called on logout so the token stops
    /// working immediately instead of after the cache TTL.
    pub fn invalidate(&self, token: &str) {
        self.cache.remove(&SessionToken::digest(token));
    }
}
