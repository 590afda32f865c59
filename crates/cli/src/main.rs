//! i1Fashion CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply the workspace migrations
//! i1f-cli migrate
//!
//! # Check the database is reachable and show row counts
//! i1f-cli check
//!
//! # Load products and variants from a YAML catalog
//! i1f-cli seed catalog seed/catalog.yaml
//! ```
//!
//! All commands read `DATABASE_URL` (or `ADMIN_DATABASE_URL`) from the
//! environment or a `.env` file.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "i1f-cli")]
#[command(author, version, about = "i1Fashion CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Check database connectivity and show table counts
    Check,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Load products and variants from a YAML file
    Catalog {
        /// Path to the catalog file
        #[arg(default_value = "seed/catalog.yaml")]
        file: String,

        /// Only validate the file, do not write anything
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
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
        Commands::Check => commands::check::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file, dry_run } => {
                commands::seed::catalog(&file, dry_run).await?;
            }
        },
    }
    Ok(())
}
