//! In-memory development backend serving the contacts REST surface.
//!
//! Issues HS256 tokens on login, requires a bearer token on every contacts
//! route and validates writes with the same rules as the client form.

pub mod auth;
pub mod contacts;
pub mod error;

use axum::{
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use rand::Rng;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::gateway::MemoryContactGateway;
use crate::validation::sample_contact;

#[derive(Debug, Clone)]
pub struct DevAuth {
    pub password: String,
    pub jwt_secret: String,
    pub expiry_hours: i64,
}

#[derive(Clone)]
pub struct DevState {
    pub contacts: Arc<MemoryContactGateway>,
    pub auth: DevAuth,
    pub page_size: u32,
}

impl DevState {
    pub fn new(contacts: MemoryContactGateway, auth: DevAuth, page_size: u32) -> Self {
        Self {
            contacts: Arc::new(contacts),
            auth,
            page_size,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            MemoryContactGateway::new(),
            DevAuth {
                password: config.dev_server.password.clone(),
                jwt_secret: config.dev_server.jwt_secret.clone(),
                expiry_hours: config.dev_server.jwt_expiry_hours,
            },
            config.view.page_size,
        )
    }

    /// Start with `count` generated contacts
    pub fn seeded<R: Rng + ?Sized>(config: &AppConfig, count: usize, rng: &mut R) -> Self {
        let contacts = MemoryContactGateway::with_contacts((0..count).map(|_| sample_contact(&mut *rng)));
        Self {
            contacts: Arc::new(contacts),
            ..Self::from_config(config)
        }
    }
}

pub fn app(state: DevState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/login", post(auth::login))
        .merge(contact_routes(state.clone()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn contact_routes(state: DevState) -> Router<DevState> {
    Router::new()
        .route("/api/:version/contacts", get(contacts::list).post(contacts::create))
        .route("/api/:version/contacts/paged", get(contacts::list_paged))
        .route("/api/:version/contacts/search", get(contacts::search))
        .route(
            "/api/:version/contacts/:id",
            get(contacts::show).put(contacts::update).delete(contacts::delete),
        )
        .route_layer(middleware::from_fn_with_state(state, auth::require_bearer))
}

/// Serve until the listener fails
pub async fn serve(listener: tokio::net::TcpListener, state: DevState) -> std::io::Result<()> {
    axum::serve(listener, app(state)).await
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
