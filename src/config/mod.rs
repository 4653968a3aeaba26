use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub view: ViewConfig,
    pub session: SessionConfig,
    pub dev_server: DevServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub version: String,
    pub request_timeout_secs: u64,
}

/// How the list screen fetches contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListMode {
    /// `GET /api/{version}/contacts`, everything at once
    All,
    /// `GET /api/{version}/contacts/paged` with search and server-side sort
    Paged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    pub message_ttl_secs: u64,
    pub page_size: u32,
    pub list_mode: ListMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Lifetime given to sessions whose login response carries no expiration
    pub default_lifetime_hours: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevServerConfig {
    pub port: u16,
    pub password: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    /// Generated contacts the backend starts with
    pub seed_contacts: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // API overrides
        if let Ok(v) = env::var("CONTACTS_API_URL") {
            self.api.base_url = v;
        }
        if let Ok(v) = env::var("CONTACTS_API_VERSION") {
            self.api.version = v;
        }
        if let Ok(v) = env::var("CONTACTS_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs = v.parse().unwrap_or(self.api.request_timeout_secs);
        }

        // View overrides
        if let Ok(v) = env::var("CONTACTS_MESSAGE_TTL_SECS") {
            self.view.message_ttl_secs = v.parse().unwrap_or(self.view.message_ttl_secs);
        }
        if let Ok(v) = env::var("CONTACTS_PAGE_SIZE") {
            self.view.page_size = v.parse().unwrap_or(self.view.page_size);
        }
        if let Ok(v) = env::var("CONTACTS_LIST_MODE") {
            self.view.list_mode = match v.to_ascii_lowercase().as_str() {
                "paged" => ListMode::Paged,
                "all" => ListMode::All,
                _ => self.view.list_mode,
            };
        }

        // Session overrides
        if let Ok(v) = env::var("CONTACTS_SESSION_HOURS") {
            self.session.default_lifetime_hours = v.parse().unwrap_or(self.session.default_lifetime_hours);
        }

        // Development backend overrides
        if let Ok(v) = env::var("CONTACTS_DEV_PORT") {
            self.dev_server.port = v.parse().unwrap_or(self.dev_server.port);
        }
        if let Ok(v) = env::var("CONTACTS_DEV_PASSWORD") {
            self.dev_server.password = v;
        }
        if let Ok(v) = env::var("CONTACTS_JWT_SECRET") {
            self.dev_server.jwt_secret = v;
        }
        if let Ok(v) = env::var("CONTACTS_DEV_SEED") {
            self.dev_server.seed_contacts = v.parse().unwrap_or(self.dev_server.seed_contacts);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:8080".to_string(),
                version: "v2".to_string(),
                request_timeout_secs: 30,
            },
            view: ViewConfig {
                message_ttl_secs: 3,
                page_size: 10,
                list_mode: ListMode::All,
            },
            session: SessionConfig {
                default_lifetime_hours: 24,
            },
            dev_server: DevServerConfig {
                port: 8080,
                password: "password".to_string(),
                jwt_secret: "contactbook-development-secret".to_string(),
                jwt_expiry_hours: 24,
                seed_contacts: 0,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://contacts.staging.example.com".to_string(),
                version: "v2".to_string(),
                request_timeout_secs: 15,
            },
            session: SessionConfig {
                default_lifetime_hours: 8,
            },
            ..Self::development()
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://contacts.example.com".to_string(),
                version: "v2".to_string(),
                request_timeout_secs: 10,
            },
            view: ViewConfig {
                message_ttl_secs: 3,
                page_size: 25,
                list_mode: ListMode::Paged,
            },
            session: SessionConfig {
                default_lifetime_hours: 4,
            },
            ..Self::development()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    pub fn message_ttl(&self) -> Duration {
        Duration::from_secs(self.view.message_ttl_secs)
    }
}

// Global snapshot of the environment - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
