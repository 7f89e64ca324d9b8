//! Application configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: Hardcoded in struct `Default` implementations
//! 2. **Config file**: TOML file specified by `FARMSENSE_CONFIG` env var
//! 3. **Environment variables**: `FARMSENSE__*` env vars override specific fields
//!
//! # Configuration Sections
//!
//! - [`ServerConfig`]: HTTP server settings (bind address, concurrency)
//! - [`DatabaseConfig`]: `SQLite` connection settings
//! - [`AuthConfig`]: session lifetime, sweeper cadence, login throttling
//! - [`AlertsConfig`]: record write path behavior
//! - [`AssistantConfig`]: chat assistant tuning
//! - [`LoggingConfig`]: log level and format
//!
//! # Validation
//!
//! Configuration is validated at load time. Invalid configurations (e.g.,
//! a zero session lifetime, an unknown logging format) return errors rather
//! than failing silently at the first request.
//!
//! # Example
//!
//! ```toml
//! [server]
//! bind_address = "0.0.0.0"
//! bind_port = 8000
//!
//! [database]
//! url = "sqlite://./db/farmsense.db"
//!
//! [auth]
//! session_ttl_hours = 168
//!
//! [alerts]
//! write_path = "notify-and-derive"
//! ```

use crate::alerts::WritePolicy;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// HTTP server configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// IP address to bind the server to. Defaults to `127.0.0.1`.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port number to listen on. Must be greater than 0. Defaults to `8000`.
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Maximum number of concurrent requests the server can handle.
    /// Defaults to `100`.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Request timeout in seconds. Defaults to `30`.
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    8000
}

fn default_max_concurrent_requests() -> usize {
    100
}

fn default_request_timeout_seconds() -> u64 {
    30
}

/// `SQLite` connection settings shared by the server and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL. Defaults to `sqlite://./db/farmsense.db`; the file is
    /// created on first connect.
    pub url: String,

    /// Connection pool size. Defaults to `5`.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

/// Session and login security settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Hours a session stays valid after login. Defaults to `168` (one week).
    pub session_ttl_hours: u64,

    /// Seconds between expired-session sweeps. Defaults to `3600`.
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,

    /// Login attempts allowed in a burst per account before throttling.
    /// Defaults to `5`.
    #[serde(default = "default_login_burst")]
    pub login_burst: u32,

    /// Sustained login attempts per minute per account once the burst is
    /// spent. Defaults to `3`.
    #[serde(default = "default_login_attempts_per_minute")]
    pub login_attempts_per_minute: u32,
}

fn default_sweep_interval_seconds() -> u64 {
    3600
}

fn default_login_burst() -> u32 {
    5
}

fn default_login_attempts_per_minute() -> u32 {
    3
}

/// Behavior of the record write path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    /// What a record submission produces besides the record itself:
    /// `"notify"` for just the submission notice, `"notify-and-derive"`
    /// (the default) to also run the metric rules.
    #[serde(default)]
    pub write_path: WritePolicy,
}

/// Chat assistant tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Fixed delay in milliseconds before each reply, to pace the
    /// conversation. Defaults to `0` (reply immediately).
    pub response_delay_ms: u64,
}

/// Application logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "trace", "debug", "info", "warn", "error").
    /// Defaults to `"info"`.
    pub level: String,

    /// Output format: `"json"` or `"pretty"`. Defaults to `"pretty"`.
    pub format: String,
}

/// Root application configuration containing all subsystem settings.
///
/// This is the primary configuration structure loaded from TOML files and
/// environment variables. Environment overrides use the `FARMSENSE` prefix
/// with `__` as a separator (e.g. `FARMSENSE__SERVER__BIND_PORT=8080`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment environment (e.g., "development", "production").
    /// Defaults to `"development"`.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Session and login security configuration.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Record write path configuration.
    #[serde(default)]
    pub alerts: AlertsConfig,

    /// Chat assistant configuration.
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_environment() -> String {
    "development".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8000,
            max_concurrent_requests: 100,
            request_timeout_seconds: 30,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: "sqlite://./db/farmsense.db".to_string(), max_connections: 5 }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: 168,
            sweep_interval_seconds: 3600,
            login_burst: 5,
            login_attempts_per_minute: 3,
        }
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self { write_path: WritePolicy::default() }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self { response_delay_ms: 0 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            alerts: AlertsConfig::default(),
            assistant: AssistantConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment variable overrides.
    ///
    /// Environment variables with the `FARMSENSE__` prefix can override any
    /// configuration value. Use `__` as a separator for nested fields
    /// (e.g., `FARMSENSE__SERVER__BIND_PORT=8080`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or
    /// deserialized.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_builder = Config::builder()
            .set_default("environment", "development")?
            .set_default("server.bind_address", "127.0.0.1")?
            .set_default("server.bind_port", 8000)?
            .set_default("server.max_concurrent_requests", 100)?
            .set_default("server.request_timeout_seconds", 30)?
            .set_default("database.url", "sqlite://./db/farmsense.db")?
            .set_default("database.max_connections", 5)?
            .set_default("auth.session_ttl_hours", 168)?
            .set_default("auth.sweep_interval_seconds", 3600)?
            .set_default("auth.login_burst", 5)?
            .set_default("auth.login_attempts_per_minute", 3)?
            .set_default("alerts.write_path", "notify-and-derive")?
            .set_default("assistant.response_delay_ms", 0)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("FARMSENSE").separator("__"))
            .build()?;

        config_builder.try_deserialize()
    }

    /// Loads configuration from `config/config.toml` with fallback to defaults.
    ///
    /// The config file path can be overridden using the `FARMSENSE_CONFIG`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("FARMSENSE_CONFIG").unwrap_or_else(|_| "config/config.toml".to_string());
        Self::from_file(&config_path)
    }

    /// Returns the parsed socket address for the HTTP server.
    ///
    /// # Errors
    ///
    /// Returns an error string if `server.bind_address` and `server.bind_port`
    /// do not combine into a valid socket address.
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, String> {
        format!("{}:{}", self.server.bind_address, self.server.bind_port).parse().map_err(|_| {
            format!("Invalid socket address: {}:{}", self.server.bind_address, self.server.bind_port)
        })
    }

    /// Returns the request timeout as a [`Duration`].
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_seconds)
    }

    /// Returns the session lifetime as a [`chrono::Duration`], for computing
    /// `expires_at` at login.
    #[must_use]
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::try_from(self.auth.session_ttl_hours).unwrap_or(168))
    }

    /// Returns the expired-session sweep interval as a [`Duration`].
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.auth.sweep_interval_seconds)
    }

    /// Returns the assistant's fixed response delay as a [`Duration`].
    #[must_use]
    pub fn assistant_response_delay(&self) -> Duration {
        Duration::from_millis(self.assistant.response_delay_ms)
    }

    /// Validates the configuration for correctness and consistency.
    ///
    /// Checks include:
    /// - Socket address fields are non-zero and parseable
    /// - Database URL points at `SQLite`
    /// - All lifetimes and rates are greater than zero where required
    /// - Logging format is either `"json"` or `"pretty"`
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.bind_port == 0 {
            return Err("Bind port must be greater than 0".to_string());
        }

        if self.server.max_concurrent_requests == 0 {
            return Err("Max concurrent requests must be greater than 0".to_string());
        }

        if self.database.url.is_empty() {
            return Err("Database URL must not be empty".to_string());
        }

        if !self.database.url.starts_with("sqlite") {
            return Err(format!("Unsupported database URL: {}", self.database.url));
        }

        if self.database.max_connections == 0 {
            return Err("Database pool size must be greater than 0".to_string());
        }

        if self.auth.session_ttl_hours == 0 {
            return Err("Session lifetime must be greater than 0".to_string());
        }

        if self.auth.sweep_interval_seconds == 0 {
            return Err("Session sweep interval must be greater than 0".to_string());
        }

        if self.auth.login_burst == 0 {
            return Err("Login burst must be greater than 0".to_string());
        }

        if self.auth.login_attempts_per_minute == 0 {
            return Err("Login attempts per minute must be greater than 0".to_string());
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err("Logging format must be 'json' or 'pretty'".to_string());
        }

        Ok(())
    }

    /// Returns the server bind address.
    #[must_use]
    pub fn bind_address(&self) -> &str {
        &self.server.bind_address
    }

    /// Returns the server bind port.
    #[must_use]
    pub fn bind_port(&self) -> u16 {
        self.server.bind_port
    }

    /// Returns the database URL.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Returns the record write path policy.
    #[must_use]
    pub fn write_policy(&self) -> WritePolicy {
        self.alerts.write_path
    }
}
