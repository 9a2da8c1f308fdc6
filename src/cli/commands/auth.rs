use clap::Subcommand;
use serde_json::json;

use crate::cli::context::Context;
use crate::cli::utils::{output_success, prompt_line};
use crate::cli::OutputFormat;
use crate::session::{self, AuthClient, Credentials};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to the admin console")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Forget the stored session")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut ctx = Context::load()?;

    match cmd {
        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt_line("Password: ")?,
            };
            let auth = AuthClient::from_config(ctx.config)?;
            let credentials = Credentials { email, password };
            let grant = session::login(&mut ctx.session, &auth, &credentials).await?;

            output_success(
                &output_format,
                &format!("Logged in as {}", credentials.email),
                Some(json!({ "role": grant.role })),
            )
        }
        AuthCommands::Logout => {
            ctx.session.logout()?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let authenticated = ctx.session.is_authenticated();
            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({
                        "authenticated": authenticated,
                        "role": ctx.session.role(),
                        "environment": ctx.config.environment.name(),
                        "storage": ctx.session.storage().path().display().to_string(),
                    }))?);
                }
                OutputFormat::Text => {
                    if authenticated {
                        println!("Logged in (role: {})", ctx.session.role().unwrap_or("unknown"));
                    } else {
                        println!("Not logged in");
                    }
                }
            }
            Ok(())
        }
    }
}
