//! Portfolio CLI - Database migrations and admin bootstrap.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! folio migrate
//!
//! # Show whether an admin is bound, and who
//! folio admin status
//!
//! # Bind the admin without going through the web setup page
//! folio admin setup -e owner@example.com
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about = "Portfolio site CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Inspect or bootstrap the admin binding
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Show whether an admin is bound
    Status,
    /// Bind the admin email (only works once)
    Setup {
        /// Admin email address, compared exactly (case-sensitive)
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Status => commands::admin::status().await?,
            AdminAction::Setup { email } => commands::admin::setup(&email).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_admin_setup() {
        let cli = Cli::try_parse_from(["folio", "admin", "setup", "-e", "Owner@Example.com"])
            .map_err(|e| e.to_string());
        assert!(matches!(
            cli,
            Ok(Cli {
                command: Commands::Admin {
                    action: AdminAction::Setup { ref email }
                }
            }) if email == "Owner@Example.com"
        ));
    }
}
