#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

use contactbook::auth::{FileSessionStorage, SessionStore};
use contactbook::client::RestClient;
use contactbook::config::AppConfig;
use contactbook::contact::Contact;
use contactbook::dev_server::{self, DevAuth, DevState};
use contactbook::gateway::{HttpContactGateway, MemoryContactGateway};

pub const PASSWORD: &str = "password";
pub const JWT_SECRET: &str = "integration-test-secret";

/// Dev backend running inside the test's runtime on its own port
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub state: DevState,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(MemoryContactGateway::new()).await
    }

    pub async fn start_with(contacts: MemoryContactGateway) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = DevState::new(
            contacts,
            DevAuth {
                password: PASSWORD.to_string(),
                jwt_secret: JWT_SECRET.to_string(),
                expiry_hours: 1,
            },
            10,
        );

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        tokio::spawn(dev_server::serve(listener, state.clone()));

        let server = Self { port, base_url, state };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn config(&self) -> AppConfig {
        config_for(&self.base_url)
    }
}

pub fn config_for(base_url: &str) -> AppConfig {
    let mut config = AppConfig::development();
    config.api.base_url = base_url.to_string();
    config.api.request_timeout_secs = 5;
    config
}

/// Client and session store pointed at `base_url`, with nothing logged in
pub fn client_for(base_url: &str) -> Result<(RestClient, Arc<SessionStore>)> {
    let session = Arc::new(SessionStore::in_memory());
    let client = RestClient::new(base_url, Duration::from_secs(5), session.clone())?;
    Ok((client, session))
}

/// Same as [`client_for`] but persisting the session in `dir/session.json`
pub fn file_client_for(base_url: &str, dir: &Path) -> Result<(RestClient, Arc<SessionStore>)> {
    let session = Arc::new(SessionStore::new(
        FileSessionStorage::new(dir.join("session.json")),
        24,
    ));
    let client = RestClient::new(base_url, Duration::from_secs(5), session.clone())?;
    Ok((client, session))
}

/// Logged-in gateway against `server`
pub async fn logged_in_gateway(server: &TestServer) -> Result<(HttpContactGateway, Arc<SessionStore>)> {
    let (client, session) = client_for(&server.base_url)?;
    session.login(&client, "alice", PASSWORD).await?;
    Ok((HttpContactGateway::new(client, "v2"), session))
}

pub fn valid_contact(first: &str, last: &str) -> Contact {
    Contact {
        id: None,
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
        phone_number: "555-123-4567".to_string(),
        address: Some("1200 Main Street".to_string()),
        city: "Seattle".to_string(),
        state: "WA".to_string(),
        zip_code: "98101".to_string(),
    }
}
