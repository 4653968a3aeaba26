use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use contactbook::config::config;
use contactbook::dev_server::{self, DevState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up CONTACTS_DEV_PORT, CONTACTS_DEV_PASSWORD, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config();
    tracing::info!("Starting contactbook dev backend in {:?} mode", config.environment);

    let seed = config.dev_server.seed_contacts;
    let state = if seed > 0 {
        tracing::info!("seeding {} generated contacts", seed);
        DevState::seeded(config, seed, &mut rand::rngs::StdRng::from_entropy())
    } else {
        DevState::from_config(config)
    };

    let bind_addr = format!("0.0.0.0:{}", config.dev_server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("contactbook dev backend listening on http://{}", bind_addr);

    dev_server::serve(listener, state).await?;
    Ok(())
}
