use clap::Subcommand;
use serde_json::json;
use std::fs;

use crate::cli::config::get_config_dir;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

const ENV_TEMPLATE: &str = "\
# contactbook client settings
CONTACTS_API_URL=http://localhost:8080
CONTACTS_API_VERSION=v2
# CONTACTS_LIST_MODE=paged
# CONTACTS_PAGE_SIZE=10
";

#[derive(Subcommand)]
pub enum InitCommands {
    #[command(about = "Initialize configuration directory")]
    Config {
        #[arg(long, help = "Overwrite an existing .env template")]
        force: bool,
    },
}

pub async fn handle(cmd: InitCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        InitCommands::Config { force } => {
            let dir = get_config_dir()?;
            let env_file = dir.join(".env");

            let written = if env_file.exists() && !force {
                false
            } else {
                fs::write(&env_file, ENV_TEMPLATE)?;
                true
            };

            let message = if written {
                format!("Initialized configuration in {}", dir.display())
            } else {
                format!("Configuration already present in {}", dir.display())
            };
            output_success(
                &output_format,
                &message,
                Some(json!({ "config_dir": dir, "env_file": env_file, "written": written })),
            )
        }
    }
}
