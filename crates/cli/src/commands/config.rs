use clap::Subcommand;
use farmsense_core::{alerts::WritePolicy, config::AppConfig};
use std::path::Path;

use super::utils::{print_info, print_success, CliResult};

const SAMPLE_CONFIG: &str = r#"# FarmSense Configuration
# This is a sample configuration file with sensible defaults

environment = "development"

[server]
bind_address = "127.0.0.1"
bind_port = 8000
max_concurrent_requests = 100
request_timeout_seconds = 30

[database]
url = "sqlite://./db/farmsense.db"
max_connections = 5

[auth]
session_ttl_hours = 168
sweep_interval_seconds = 3600
login_burst = 5
login_attempts_per_minute = 3

[alerts]
# "notify-and-derive" also files threshold alerts for abnormal metrics;
# "notify" files only the submission notice.
write_path = "notify-and-derive"

[assistant]
response_delay_ms = 0

[logging]
level = "info"
format = "pretty"
"#;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate the current configuration
    Validate {
        /// Path to config file (defaults to config/config.toml)
        #[arg(short, long, default_value = "config/config.toml")]
        file: String,
    },

    /// Show current configuration
    Show {
        /// Path to config file (defaults to config/config.toml)
        #[arg(short, long, default_value = "config/config.toml")]
        file: String,

        /// Show sensitive values (like database URLs)
        #[arg(long)]
        show_sensitive: bool,
    },

    /// Generate a sample configuration file
    Generate {
        /// Output path for the config file
        #[arg(short, long, default_value = "config/config.toml")]
        output: String,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn handle_config_command(command: ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Validate { file } => validate_config(&file),
        ConfigCommands::Show { file, show_sensitive } => show_config(&file, show_sensitive),
        ConfigCommands::Generate { output, force } => generate_config(&output, force),
    }
}

const fn write_path_name(policy: WritePolicy) -> &'static str {
    match policy {
        WritePolicy::Notify => "notify",
        WritePolicy::NotifyAndDerive => "notify-and-derive",
    }
}

fn validate_config(file: &str) -> CliResult<()> {
    if !Path::new(file).exists() {
        return Err(super::utils::CliError::Config(format!("File not found: {file}")));
    }

    print_info(&format!("Loading configuration from {file}..."));

    let config =
        AppConfig::from_file(file).map_err(|e| super::utils::CliError::Config(e.to_string()))?;

    print_info("Validating configuration...");
    config.validate().map_err(super::utils::CliError::Config)?;

    print_success("Configuration is valid!");

    // Show basic stats
    println!("Configuration Summary:");
    println!("  Server: {}:{}", config.server.bind_address, config.server.bind_port);
    println!("  Database connections: {}", config.database.max_connections);
    println!("  Session TTL: {}h", config.auth.session_ttl_hours);
    println!("  Alert write path: {}", write_path_name(config.alerts.write_path));

    Ok(())
}

fn show_config(file: &str, show_sensitive: bool) -> CliResult<()> {
    let config =
        AppConfig::from_file(file).map_err(|e| super::utils::CliError::Config(e.to_string()))?;

    println!("Configuration from {file}:");

    println!("\n[Server]");
    println!("  Bind Address: {}", config.server.bind_address);
    println!("  Bind Port: {}", config.server.bind_port);
    println!("  Max Concurrent Requests: {}", config.server.max_concurrent_requests);
    println!("  Request Timeout: {}s", config.server.request_timeout_seconds);

    println!("\n[Database]");
    if show_sensitive {
        println!("  URL: {}", config.database.url);
    } else {
        println!("  URL: [hidden - use --show-sensitive to reveal]");
    }
    println!("  Max Connections: {}", config.database.max_connections);

    println!("\n[Authentication]");
    println!("  Session TTL: {}h", config.auth.session_ttl_hours);
    println!("  Session Sweep Interval: {}s", config.auth.sweep_interval_seconds);
    println!("  Login Burst: {}", config.auth.login_burst);
    println!("  Login Attempts/Minute: {}", config.auth.login_attempts_per_minute);

    println!("\n[Alerts]");
    println!("  Write Path: {}", write_path_name(config.alerts.write_path));

    println!("\n[Assistant]");
    println!("  Response Delay: {}ms", config.assistant.response_delay_ms);

    println!("\n[Logging]");
    println!("  Level: {}", config.logging.level);
    println!("  Format: {}", config.logging.format);

    Ok(())
}

fn generate_config(output: &str, force: bool) -> CliResult<()> {
    if Path::new(output).exists() && !force {
        return Err(super::utils::CliError::Config(format!(
            "File {output} already exists. Use --force to overwrite."
        )));
    }

    std::fs::write(output, SAMPLE_CONFIG).map_err(super::utils::CliError::from)?;

    print_success(&format!("Sample configuration generated: {output}"));
    print_info("Remember to:");
    print_info("  1. Point database.url at a persistent path before going live");
    print_info("  2. Adjust session TTL and login limits for your deployment");
    print_info("  3. Switch logging format to \"json\" when shipping logs");

    Ok(())
}
