use anyhow::Result;
use axum::serve;
use farmsense_core::{
    auth::{IdentityRepository, SqliteIdentityRepository},
    config::AppConfig,
    middleware::{LoginRateLimiter, SessionAuth},
    store::{self, SqliteStore},
};
use server::{
    router,
    state::{AppState, RuntimeSettings},
};
use sqlx::{Pool, Sqlite};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{signal, sync::broadcast};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How often idle login-limiter buckets are dropped.
const LIMITER_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Graceful shutdown timeout in seconds.
/// After this timeout, the server will be forcefully terminated.
const GRACEFUL_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Initializes the logging system based on the configuration.
///
/// `RUST_LOG` takes precedence over `logging.level`; the bare values `debug`
/// and `trace` are expanded to per-crate filters so dependency noise stays
/// at warn.
fn init_logging(config: &AppConfig) {
    let filter = if let Ok(env_filter) = std::env::var("RUST_LOG") {
        if env_filter == "debug" {
            EnvFilter::new("warn,farmsense_core=debug,server=debug,farmsense_cli=debug")
        } else if env_filter == "trace" {
            EnvFilter::new("warn,farmsense_core=trace,server=trace,farmsense_cli=trace")
        } else {
            EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| {
                EnvFilter::new("warn,farmsense_core=debug,server=debug,farmsense_cli=debug")
            })
        }
    } else {
        let level = &config.logging.level;
        EnvFilter::new(format!(
            "warn,farmsense_core={level},server={level},farmsense_cli={level}"
        ))
    };

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format.as_str() == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer().json();
        registry.with(fmt_layer).init();
    } else {
        // "pretty" and any other format default to pretty logging
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .with_target(false);
        registry.with(fmt_layer).init();
    }
}

/// Builds the shared application state from configuration and a live pool.
fn init_state(config: &AppConfig, pool: Pool<Sqlite>) -> AppState {
    let identity: Arc<dyn IdentityRepository> =
        Arc::new(SqliteIdentityRepository::new(pool.clone()));
    let store = Arc::new(SqliteStore::new(pool.clone()));
    let session_auth = Arc::new(SessionAuth::new(identity.clone()));
    let login_limiter = Arc::new(LoginRateLimiter::new(
        config.auth.login_burst,
        config.auth.login_attempts_per_minute,
    ));

    AppState {
        identity,
        records: store.clone(),
        alerts: store,
        session_auth,
        login_limiter,
        settings: Arc::new(RuntimeSettings {
            write_policy: config.write_policy(),
            session_ttl: config.session_ttl(),
            assistant_delay: config.assistant_response_delay(),
            max_concurrent_requests: config.server.max_concurrent_requests,
        }),
        pool,
    }
}

/// Spawns the background task that prunes expired session rows.
fn spawn_session_sweeper(
    identity: Arc<dyn IdentityRepository>,
    interval: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it so startup stays quiet.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match identity.delete_expired_sessions().await {
                        Ok(0) => {}
                        Ok(swept) => info!(swept, "expired sessions removed"),
                        Err(err) => warn!(error = %err, "session sweep failed"),
                    }
                }
                _ = shutdown_rx.recv() => break,
            }
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let config =
        AppConfig::load().map_err(|e| anyhow::anyhow!("Configuration load failed: {e}"))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {e}"))?;

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    init_logging(&config);
    info!("Starting FarmSense server");
    debug!(
        bind_port = config.bind_port(),
        database_url = %config.database_url(),
        write_policy = ?config.write_policy(),
        session_ttl_hours = config.auth.session_ttl_hours,
        "Configuration loaded"
    );

    let pool = store::connect(config.database_url(), config.database.max_connections)
        .await
        .map_err(|e| anyhow::anyhow!("Database connection failed: {e}"))?;
    store::ensure_schema(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Schema setup failed: {e}"))?;
    info!("Database schema ready");

    let state = init_state(&config, pool);

    let sweeper_handle = spawn_session_sweeper(
        state.identity.clone(),
        config.sweep_interval(),
        shutdown_tx.subscribe(),
    );
    let limiter_cleanup_handle = state.login_limiter.start_cleanup_task(LIMITER_CLEANUP_INTERVAL);

    let app = router::create_app(state);
    let addr = config.socket_addr().map_err(|e| anyhow::anyhow!(e))?;
    info!(address = %addr, "FarmSense server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server = serve(listener, app.into_make_service_with_connect_info::<SocketAddr>());

    if let Err(e) = server.with_graceful_shutdown(shutdown_signal()).await {
        error!(error = %e, "Server error occurred");
    }

    let _ = shutdown_tx.send(());
    sweeper_handle.abort();
    limiter_cleanup_handle.abort();
    info!("Server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(
                error = %e,
                "Failed to install Ctrl+C handler"
            );
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!(
                    error = %e,
                    "Failed to install signal handler"
                );

                () = std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!(
        "Shutdown signal received, starting graceful shutdown (timeout: {}s)",
        GRACEFUL_SHUTDOWN_TIMEOUT_SECS
    );
}
