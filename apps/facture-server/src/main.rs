mod config;
mod error;
mod extract;
mod handlers;
mod server;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use facture_storage::{AccountStatus, CreateUserParams, Role, Store};
use facture_store_sqlite::SqliteStore;

use config::ServerConfig;
use server::AppState;

#[derive(Parser)]
#[command(name = "facture-server")]
#[command(about = "Facture invoicing API server")]
struct Cli {
    /// Database URL (e.g. sqlite://facture.db)
    #[arg(
        long,
        global = true,
        env = "FACTURE_DATABASE_URL",
        default_value = "sqlite://facture.db"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server
    Serve {
        /// Address to listen on
        #[arg(long, env = "FACTURE_LISTEN", default_value = "127.0.0.1:5000")]
        listen: String,
    },
    /// Create an admin account
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let store = Arc::new(SqliteStore::open(&cli.database_url).await?);

    match cli.command {
        Command::Serve { listen } => {
            let config = ServerConfig::from_env()?;
            let state = AppState { store, config };
            server::serve(state, &listen).await?;
        }
        Command::CreateAdmin {
            email,
            full_name,
            password,
        } => {
            let email = facture_policy::normalize_email(&email)
                .map_err(|e| anyhow::anyhow!(e.to_string()))?;
            let password_hash = facture_auth::hash_password(&password)?;
            let user = store
                .create_user(&CreateUserParams {
                    full_name,
                    email,
                    password_hash,
                    role: Role::Admin,
                    status: AccountStatus::Active,
                })
                .await?;
            println!("✓ Admin account created: {} <{}>", user.full_name, user.email);
        }
    }

    Ok(())
}
