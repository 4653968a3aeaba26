use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::{FileSessionStorage, SessionStore};
use crate::client::RestClient;
use crate::config::AppConfig;
use crate::controller::{ContactListController, ControllerSettings};
use crate::gateway::HttpContactGateway;

pub const SESSION_FILE: &str = "session.json";

/// `$CONTACTS_CONFIG_DIR`, else `~/.config/contactbook`
pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("CONTACTS_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("contactbook")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn session_path() -> anyhow::Result<PathBuf> {
    Ok(get_config_dir()?.join(SESSION_FILE))
}

/// Everything a command needs: configuration, the persisted session and a
/// client pointed at the configured API.
pub struct CliContext {
    pub config: AppConfig,
    pub session: Arc<SessionStore>,
    pub client: RestClient,
}

impl CliContext {
    pub async fn load(config: AppConfig) -> anyhow::Result<Self> {
        let storage = FileSessionStorage::new(session_path()?);
        let session = Arc::new(SessionStore::new(storage, config.session.default_lifetime_hours));

        // An unreadable session file just means logging in again
        if let Err(e) = session.load().await {
            tracing::warn!("ignoring stored session: {}", e);
        }

        let client = RestClient::from_config(&config, session.clone())?;
        Ok(Self {
            config,
            session,
            client,
        })
    }

    pub fn gateway(&self) -> HttpContactGateway {
        HttpContactGateway::new(self.client.clone(), &self.config.api.version)
    }

    pub fn controller(&self) -> ContactListController<HttpContactGateway> {
        self.controller_for(&self.config)
    }

    /// Controller using view settings from `config` instead of the loaded ones
    pub fn controller_for(&self, config: &AppConfig) -> ContactListController<HttpContactGateway> {
        ContactListController::new(
            Arc::new(self.gateway()),
            self.session.clone(),
            ControllerSettings::from_config(config),
        )
    }
}
