//! Operator command-line tool for the Brightspoke backend.
//!
//! # Usage
//!
//! ```bash
//! # Create the data directory and empty collection files
//! brightspoke store init
//!
//! # Provision the demo customer
//! brightspoke store seed
//!
//! # Create an account (customers get the full profile + cart chain)
//! brightspoke account create \
//!     --email ops@example.com \
//!     --username ops \
//!     --password 'changeme' \
//!     --first-name Olive \
//!     --last-name Preston \
//!     --role admin
//! ```
//!
//! The store location comes from `BRIGHTSPOKE_DATA_DIR` (default `data`),
//! loaded the same way the API server loads it.

#![cfg_attr(not(test), forbid(unsafe_code))]

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "brightspoke")]
#[command(about = "Operator tool for the Brightspoke backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the document store
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
    /// Manage accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    /// Create the data directory and empty collection files
    Init,
    /// Provision the demo customer through the registration chain
    Seed,
}

#[derive(Subcommand)]
enum AccountAction {
    /// Create a new account
    Create {
        /// Email address (unique across all accounts)
        #[arg(short, long)]
        email: String,

        /// Login username
        #[arg(short, long)]
        username: String,

        /// Raw password (hashed before it is stored)
        #[arg(short, long)]
        password: String,

        /// Given name
        #[arg(long)]
        first_name: String,

        /// Family name
        #[arg(long)]
        last_name: String,

        /// Account role: customer or admin
        #[arg(short, long, default_value = "customer")]
        role: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Store { action } => match action {
            StoreAction::Init => commands::store::init().await?,
            StoreAction::Seed => commands::store::seed().await?,
        },
        Commands::Account { action } => match action {
            AccountAction::Create {
                email,
                username,
                password,
                first_name,
                last_name,
                role,
            } => {
                commands::account::create(
                    &email,
                    &username,
                    &password,
                    &first_name,
                    &last_name,
                    &role,
                )
                .await?;
            }
        },
    }

    Ok(())
}
