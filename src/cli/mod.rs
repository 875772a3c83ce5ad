pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "grandson")]
#[command(about = "Grandson Project - operator tooling for the storefront backend")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply database migrations")]
    Migrate,

    #[command(about = "Admin account management")]
    Admin {
        #[command(subcommand)]
        cmd: commands::admin::AdminCommands,
    },

    #[command(about = "Load products and delivery zones into the database")]
    Seed {
        #[arg(long, help = "YAML catalog file (defaults to the demo catalog)")]
        file: Option<std::path::PathBuf>,
    },

    #[command(about = "Browse the catalog through backend, database or demo data")]
    Catalog {
        #[command(subcommand)]
        cmd: commands::catalog::CatalogCommands,
    },

    #[command(about = "Print an argon2 hash for a password")]
    HashPassword {
        #[arg(help = "Password to hash")]
        password: String,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = crate::config::config();

    match cli.command {
        Commands::Migrate => commands::migrate::handle(config, output_format).await,
        Commands::Admin { cmd } => commands::admin::handle(cmd, config, output_format).await,
        Commands::Seed { file } => commands::seed::handle(file, config, output_format).await,
        Commands::Catalog { cmd } => commands::catalog::handle(cmd, config, output_format).await,
        Commands::HashPassword { password } => commands::password::handle(&password, output_format),
    }
}
