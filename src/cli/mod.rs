pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "appointctl")]
#[command(about = "appointctl - Operator tooling for the appointment scheduling API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Hash a password with the configured Argon2 parameters")]
    HashPassword {
        #[arg(help = "Password to hash (read from stdin if omitted)")]
        password: Option<String>,
    },

    #[command(about = "Issue and inspect role tokens")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },

    #[command(about = "Preview recurring availability without storing it")]
    Slots {
        #[command(subcommand)]
        cmd: commands::slots::SlotsCommands,
    },

    #[command(about = "Create bootstrap records in the configured store")]
    Seed {
        #[command(subcommand)]
        cmd: commands::seed::SeedCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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

    match cli.command {
        Commands::HashPassword { password } => commands::password::handle(password, output_format).await,
        Commands::Token { cmd } => commands::token::handle(cmd, output_format).await,
        Commands::Slots { cmd } => commands::slots::handle(cmd, output_format).await,
        Commands::Seed { cmd } => commands::seed::handle(cmd, output_format).await,
    }
}
