use clap::Subcommand;
use farmsense_core::config::AppConfig;

use super::utils::{print_error, print_info, print_success, CliResult};

#[derive(Subcommand)]
pub enum ServerCommands {
    /// Check that a running server answers its health endpoint
    Ping {
        /// Path to config file (defaults to config/config.toml)
        #[arg(short, long, default_value = "config/config.toml")]
        file: String,

        /// Server base URL (defaults to the configured bind address)
        #[arg(long)]
        url: Option<String>,
    },
}

pub async fn handle_server_command(command: ServerCommands) -> CliResult<()> {
    match command {
        ServerCommands::Ping { file, url } => ping_server(&file, url).await,
    }
}

async fn ping_server(file: &str, url_override: Option<String>) -> CliResult<()> {
    let config =
        AppConfig::from_file(file).map_err(|e| super::utils::CliError::Config(e.to_string()))?;

    let base_url = url_override
        .unwrap_or_else(|| format!("http://{}:{}", config.bind_address(), config.bind_port()));
    let health_url = format!("{}/health", base_url.trim_end_matches('/'));

    print_info(&format!("Checking {health_url}..."));

    let client = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()
        .map_err(super::utils::CliError::from)?;

    let start = std::time::Instant::now();
    let response = client.get(&health_url).send().await?;
    let elapsed = start.elapsed();

    let status = response.status();
    let body: serde_json::Value = response.json().await?;
    let database = body.get("database").and_then(serde_json::Value::as_str).unwrap_or("unknown");

    if status.is_success() {
        print_success(&format!("Server is healthy ({}ms)", elapsed.as_millis()));
        println!("  Database: {database}");
        Ok(())
    } else {
        print_error(&format!("Server reported HTTP {status}"));
        println!("  Database: {database}");
        Err(super::utils::CliError::Network(format!("health check failed with {status}")))
    }
}
