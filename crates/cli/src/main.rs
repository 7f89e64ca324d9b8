use clap::{Parser, Subcommand};
use sqlx::{Pool, Sqlite};

use farmsense_core::store;

mod commands;
use commands::{
    handle_config_command, handle_db_command, handle_server_command, handle_user_command,
    ConfigCommands, DbCommands, ServerCommands, UserCommands,
};

const DEFAULT_DATABASE_URL: &str = "sqlite://./db/farmsense.db";

#[derive(Parser)]
#[command(name = "farmsense-cli")]
#[command(about = "FarmSense CLI - Management tool for the FarmSense monitoring server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database URL (falls back to DATABASE_URL, then the default path)
    #[arg(long)]
    database: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Account management
    #[command(subcommand)]
    User(UserCommands),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Database maintenance
    #[command(subcommand)]
    Db(DbCommands),

    /// Checks against a running server
    #[command(subcommand)]
    Server(ServerCommands),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::User(user_command) => {
            let (pool, _) = open_database(cli.database).await?;
            handle_user_command(user_command, pool).await?;
        }

        Commands::Config(config_command) => {
            handle_config_command(config_command)?;
        }

        Commands::Db(db_command) => {
            let (pool, database_url) = open_database(cli.database).await?;
            handle_db_command(db_command, pool, &database_url).await?;
        }

        Commands::Server(server_command) => {
            handle_server_command(server_command).await?;
        }
    }

    Ok(())
}

/// Opens the database named by the `--database` flag, the `DATABASE_URL`
/// environment variable or the default path, in that order. The schema is
/// applied on every open; it is idempotent.
async fn open_database(
    override_url: Option<String>,
) -> Result<(Pool<Sqlite>, String), Box<dyn std::error::Error>> {
    let database_url = override_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

    let pool = store::connect(&database_url, 1).await?;
    store::ensure_schema(&pool).await?;

    Ok((pool, database_url))
}
