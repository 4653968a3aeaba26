pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::cli::config::CliContext;
use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "contacts")]
#[command(about = "Contacts CLI - list, search and edit contacts over the REST API")]
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
    #[command(about = "Initialize configuration directory with required files")]
    Init {
        #[command(subcommand)]
        cmd: commands::init::InitCommands,
    },

    #[command(about = "Authentication and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "List contacts with optional search, filters, sort and paging")]
    List(commands::contacts::ListArgs),

    #[command(about = "Show one contact")]
    Show {
        #[arg(help = "Contact ID")]
        id: String,
    },

    #[command(about = "Create a contact")]
    Create {
        #[command(flatten)]
        fields: commands::contacts::ContactFields,
        #[arg(long, help = "Start from generated sample data")]
        sample: bool,
    },

    #[command(about = "Update a contact; only the given fields change")]
    Update {
        #[arg(help = "Contact ID")]
        id: String,
        #[command(flatten)]
        fields: commands::contacts::ContactFields,
    },

    #[command(about = "Delete a contact")]
    Delete {
        #[arg(help = "Contact ID")]
        id: String,
        #[arg(long, short, help = "Skip the confirmation prompt")]
        yes: bool,
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

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        // Needs no session or server
        Commands::Init { cmd } => commands::init::handle(cmd, output_format).await,
        command => run_with_context(command, CliContext::load(config).await?, output_format).await,
    }
}

async fn run_with_context(command: Commands, ctx: CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    match command {
        Commands::Init { cmd } => commands::init::handle(cmd, output_format).await,
        Commands::Auth { cmd } => commands::auth::handle(cmd, &ctx, output_format).await,
        Commands::List(args) => commands::contacts::list(&ctx, args, output_format).await,
        Commands::Show { id } => commands::contacts::show(&ctx, id, output_format).await,
        Commands::Create { fields, sample } => {
            commands::contacts::create(&ctx, fields, sample, output_format).await
        }
        Commands::Update { id, fields } => commands::contacts::update(&ctx, id, fields, output_format).await,
        Commands::Delete { id, yes } => commands::contacts::delete(&ctx, id, yes, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_update_with_partial_fields() {
        let cli = Cli::try_parse_from(["contacts", "--json", "update", "7", "--city", "Tacoma"]).unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        match cli.command {
            Commands::Update { id, fields } => {
                assert_eq!(id, "7");
                assert_eq!(fields.city.as_deref(), Some("Tacoma"));
                assert!(fields.email.is_none());
            }
            _ => panic!("expected update"),
        }
    }

    #[tokio::test]
    async fn init_runs_without_a_session() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("CONTACTS_CONFIG_DIR", dir.path());

        let cli = Cli::try_parse_from(["contacts", "--json", "init", "config"]).unwrap();
        let result = run(cli, AppConfig::development()).await;
        std::env::remove_var("CONTACTS_CONFIG_DIR");

        result.unwrap();
        let written = std::fs::read_to_string(dir.path().join(".env")).unwrap();
        assert!(written.contains("CONTACTS_API_URL"));
    }
}
