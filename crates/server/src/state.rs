//! Shared application state handed to every handler.

use farmsense_core::{
    alerts::WritePolicy,
    auth::IdentityRepository,
    middleware::{LoginRateLimiter, SessionAuth},
    store::{AlertRepository, RecordRepository},
};
use sqlx::{Pool, Sqlite};
use std::{sync::Arc, time::Duration};

/// Runtime knobs resolved from configuration at startup.
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    /// Whether record submission also runs the metric rules.
    pub write_policy: WritePolicy,

    /// Session lifetime granted at login.
    pub session_ttl: chrono::Duration,

    /// Fixed pause before assistant replies.
    pub assistant_delay: Duration,

    /// In-flight request cap applied by the router.
    pub max_concurrent_requests: usize,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            write_policy: WritePolicy::default(),
            session_ttl: chrono::Duration::hours(168),
            assistant_delay: Duration::ZERO,
            max_concurrent_requests: 100,
        }
    }
}

/// Everything the handlers need, cheap to clone per request.
///
/// Repositories are trait objects so tests can swap in failing or counting
/// doubles without a database.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityRepository>,
    pub records: Arc<dyn RecordRepository>,
    pub alerts: Arc<dyn AlertRepository>,
    pub session_auth: Arc<SessionAuth>,
    pub login_limiter: Arc<LoginRateLimiter>,
    pub settings: Arc<RuntimeSettings>,
    /// Kept for the liveness probe; handlers go through the repositories.
    pub pool: Pool<Sqlite>,
}
