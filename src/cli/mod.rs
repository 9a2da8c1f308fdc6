pub mod commands;
pub mod context;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "dealer")]
#[command(about = "Dealer admin console - sales, service, loan and team records")]
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
    #[command(about = "Login, logout and session status")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Check where an admin path leads with the current session")]
    Open {
        #[arg(help = "Path such as /admin/loan-details")]
        path: String,
    },

    #[command(about = "List record types, or show the fields of one")]
    Resources {
        #[arg(help = "Resource slug")]
        resource: Option<String>,
    },

    #[command(about = "List, search, create, edit, delete and export records")]
    Records {
        #[command(subcommand)]
        cmd: commands::records::RecordCommands,
    },

    #[command(about = "Upload an image and optionally store its URL on a record")]
    Upload(commands::upload::UploadArgs),

    #[command(about = "Record counts for every resource")]
    Dashboard,
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
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Open { path } => commands::open::handle(path, output_format).await,
        Commands::Resources { resource } => commands::resources::handle(resource, output_format).await,
        Commands::Records { cmd } => commands::records::handle(cmd, output_format).await,
        Commands::Upload(args) => commands::upload::handle(args, output_format).await,
        Commands::Dashboard => commands::dashboard::handle(output_format).await,
    }
}
