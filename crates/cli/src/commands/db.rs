use clap::Subcommand;
use sqlx::{Pool, Sqlite};

use farmsense_core::auth::{IdentityRepository, SqliteIdentityRepository};

use super::utils::{print_info, print_success, CliResult};

#[derive(Subcommand)]
pub enum DbCommands {
    /// Create the database file and apply the schema
    Init,

    /// Remove sessions that are past their expiry
    SweepSessions,
}

pub async fn handle_db_command(
    command: DbCommands,
    pool: Pool<Sqlite>,
    database_url: &str,
) -> CliResult<()> {
    match command {
        DbCommands::Init => {
            // Opening the pool already created the file and applied the
            // idempotent schema; getting here means both worked.
            print_success(&format!("Database ready: {database_url}"));
        }

        DbCommands::SweepSessions => {
            let identity = SqliteIdentityRepository::new(pool);
            let swept = identity.delete_expired_sessions().await?;
            if swept == 0 {
                print_info("No expired sessions to remove");
            } else {
                print_success(&format!("Removed {swept} expired sessions"));
            }
        }
    }

    Ok(())
}
