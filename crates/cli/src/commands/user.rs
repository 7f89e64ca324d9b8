use clap::Subcommand;
use prettytable::{row, Table};
use sqlx::{Pool, Sqlite};

use farmsense_core::auth::{
    normalize_email, IdentityRepository, NewUser, Password, SqliteIdentityRepository, UserRole,
};
use farmsense_core::store::{AlertRepository, RecordRepository, SqliteStore};

use super::utils::{print_info, print_success, CliError, CliResult};

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a new account
    Create {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        #[arg(short, long)]
        full_name: String,

        /// Account role: farmer, veterinarian or authority
        #[arg(short, long, default_value = "farmer")]
        role: String,

        #[arg(long)]
        farm_name: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        phone: Option<String>,
    },

    /// Show the stored profile for an account
    Show {
        #[arg(short, long)]
        email: String,
    },

    /// Show record and alert counts for an account
    Stats {
        #[arg(short, long)]
        email: String,
    },
}

pub async fn handle_user_command(command: UserCommands, pool: Pool<Sqlite>) -> CliResult<()> {
    let identity = SqliteIdentityRepository::new(pool.clone());

    match command {
        UserCommands::Create { email, password, full_name, role, farm_name, location, phone } => {
            let params =
                CreateUserParams { email, password, full_name, role, farm_name, location, phone };
            handle_create_user(&identity, params).await?;
        }

        UserCommands::Show { email } => {
            handle_show_user(&identity, &email).await?;
        }

        UserCommands::Stats { email } => {
            let store = SqliteStore::new(pool);
            handle_user_stats(&identity, &store, &email).await?;
        }
    }

    Ok(())
}

struct CreateUserParams {
    email: String,
    password: String,
    full_name: String,
    role: String,
    farm_name: Option<String>,
    location: Option<String>,
    phone: Option<String>,
}

async fn handle_create_user(
    identity: &SqliteIdentityRepository,
    params: CreateUserParams,
) -> CliResult<()> {
    let role = UserRole::from_str(&params.role).ok_or_else(|| {
        CliError::General(format!(
            "invalid role '{}', expected farmer, veterinarian or authority",
            params.role
        ))
    })?;

    if params.password.len() < Password::MIN_LENGTH {
        return Err(CliError::General(format!(
            "password must be at least {} characters",
            Password::MIN_LENGTH
        )));
    }

    let password_hash = Password::hash(&params.password)?;
    let user = identity
        .create_user(NewUser {
            email: normalize_email(&params.email),
            password_hash,
            full_name: params.full_name.trim().to_string(),
            role,
            farm_name: params.farm_name,
            location: params.location,
            phone: params.phone,
        })
        .await?;

    print_success("Account created");
    println!("Id: {}", user.id);
    println!("Email: {}", user.email);
    println!("Role: {}", user.role);

    Ok(())
}

async fn handle_show_user(identity: &SqliteIdentityRepository, email: &str) -> CliResult<()> {
    let user = identity
        .find_user_by_email(&normalize_email(email))
        .await?
        .ok_or_else(|| CliError::General(format!("no account for '{email}'")))?;

    let mut table = Table::new();
    table.add_row(row!["Field", "Value"]);
    table.add_row(row!["Id", user.id]);
    table.add_row(row!["Email", user.email]);
    table.add_row(row!["Full name", user.full_name]);
    table.add_row(row!["Role", user.role.as_str()]);
    table.add_row(row!["Farm", user.farm_name.as_deref().unwrap_or("-")]);
    table.add_row(row!["Location", user.location.as_deref().unwrap_or("-")]);
    table.add_row(row!["Phone", user.phone.as_deref().unwrap_or("-")]);
    table.add_row(row!["Active", if user.is_active { "yes" } else { "no" }]);
    table.add_row(row!["Created", user.created_at.format("%Y-%m-%d %H:%M").to_string()]);
    table.printstd();

    Ok(())
}

async fn handle_user_stats(
    identity: &SqliteIdentityRepository,
    store: &SqliteStore,
    email: &str,
) -> CliResult<()> {
    let user = identity
        .find_user_by_email(&normalize_email(email))
        .await?
        .ok_or_else(|| CliError::General(format!("no account for '{email}'")))?;

    let records = store.count_records(&user.id).await?;
    let alerts = store.count_unread_alerts(&user.id).await?;

    print_info(&format!("Statistics for {}", user.email));

    let mut table = Table::new();
    table.add_row(row!["Metric", "Count"]);
    table.add_row(row!["Records (total)", records.total]);
    table.add_row(row!["  human", records.human]);
    table.add_row(row!["  animal", records.animal]);
    table.add_row(row!["  environment", records.environment]);
    table.add_row(row!["Unread alerts", alerts.unread]);
    table.add_row(row!["  critical", alerts.critical]);
    table.add_row(row!["  high", alerts.high]);
    table.printstd();

    Ok(())
}
