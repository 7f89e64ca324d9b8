pub mod config;
pub mod db;
pub mod server;
pub mod user;
pub mod utils;

pub use config::{handle_config_command, ConfigCommands};
pub use db::{handle_db_command, DbCommands};
pub use server::{handle_server_command, ServerCommands};
pub use user::{handle_user_command, UserCommands};
