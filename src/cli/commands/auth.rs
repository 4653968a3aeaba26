use clap::Subcommand;
use serde_json::json;

use crate::cli::config::CliContext;
use crate::cli::utils::{output_success, prompt};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to server")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Logout and forget the stored session")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show current user information")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, ctx: &CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { username, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt("Password: ")?,
            };
            let user = ctx.session.login(&ctx.client, &username, &password).await?;
            output_success(
                &output_format,
                &format!("Logged in as {}", user.username),
                Some(json!({ "user": user })),
            )
        }
        AuthCommands::Logout => {
            ctx.session.logout().await;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let authenticated = ctx.session.is_authenticated().await;
            let message = if authenticated { "Authenticated" } else { "Not logged in" };
            output_success(
                &output_format,
                message,
                Some(json!({ "authenticated": authenticated, "api_url": ctx.client.base_url().as_str() })),
            )
        }
        AuthCommands::Whoami => {
            let user = ctx
                .session
                .current_user()
                .await
                .ok_or_else(|| anyhow::anyhow!("Not logged in. Run `contacts auth login <username>`"))?;
            let role = user.role.clone().unwrap_or_else(|| "-".to_string());
            output_success(
                &output_format,
                &format!("{} (role: {}, expires {})", user.username, role, user.expiration.to_rfc3339()),
                Some(json!({ "user": user })),
            )
        }
    }
}
