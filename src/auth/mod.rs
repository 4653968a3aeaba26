pub mod claims;
pub mod storage;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::client::RestClient;
use crate::error::{ClientError, ErrorKind};

pub use claims::{read_claims, session_from_login, TokenClaims};
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionError, SessionStorage};

pub const LOGIN_PATH: &str = "/api/auth/login";

/// Authenticated user's token and claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub role: Option<String>,
    pub expiration: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiration
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn user(&self) -> CurrentUser {
        CurrentUser {
            username: self.username.clone(),
            role: self.role.clone(),
            expiration: self.expiration,
        }
    }
}

/// The part of a session that is safe to display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub username: String,
    pub role: Option<String>,
    pub expiration: DateTime<Utc>,
}

/// Owner of the session. Shared (behind an `Arc`) by the REST client, which
/// reads the token for every request, and the list controller.
pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
    current: RwLock<Option<Session>>,
    default_lifetime: Duration,
}

impl SessionStore {
    pub fn new(storage: impl SessionStorage + 'static, default_lifetime_hours: i64) -> Self {
        Self {
            storage: Box::new(storage),
            current: RwLock::new(None),
            default_lifetime: Duration::hours(default_lifetime_hours),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemorySessionStorage::new(), 24)
    }

    /// Restore a persisted session at startup. Expired sessions are discarded.
    pub async fn load(&self) -> Result<Option<CurrentUser>, SessionError> {
        let restored = self.storage.load()?;
        let mut current = self.current.write().await;

        match restored {
            Some(session) if session.is_expired() => {
                tracing::info!("discarding expired session for {}", session.username);
                self.storage.clear()?;
                *current = None;
            }
            restored => *current = restored,
        }

        Ok(current.as_ref().map(Session::user))
    }

    /// Install a session and persist it. Persistence failures are logged; the
    /// session still applies to this process.
    pub async fn establish(&self, session: Session) {
        if let Err(e) = self.storage.save(&session) {
            tracing::warn!("failed to persist session: {}", e);
        }
        *self.current.write().await = Some(session);
    }

    pub async fn login(&self, client: &RestClient, username: &str, password: &str) -> Result<CurrentUser, ClientError> {
        let body: Value = client
            .post_public(LOGIN_PATH, &json!({ "username": username, "password": password }))
            .await
            .map_err(|e| match e.kind() {
                // A 401 here means bad credentials, not an expired session
                ErrorKind::Auth => ClientError::Auth("Invalid username or password".to_string()),
                _ => e,
            })?;
        let session = session_from_login(&body, username, self.default_lifetime, Utc::now())?;
        let user = session.user();

        tracing::info!("logged in as {}", user.username);
        self.establish(session).await;
        Ok(user)
    }

    pub async fn logout(&self) {
        if let Err(e) = self.storage.clear() {
            tracing::warn!("failed to clear persisted session: {}", e);
        }
        if let Some(session) = self.current.write().await.take() {
            tracing::info!("logged out {}", session.username);
        }
    }

    /// Bearer token for the next request, if the session is still valid
    pub async fn token(&self) -> Option<String> {
        self.valid_session().await.map(|s| s.token)
    }

    pub async fn current_user(&self) -> Option<CurrentUser> {
        self.valid_session().await.map(|s| s.user())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.valid_session().await.is_some()
    }

    /// True when a session exists but its expiration has passed
    pub async fn is_expired(&self) -> bool {
        self.current
            .read()
            .await
            .as_ref()
            .is_some_and(Session::is_expired)
    }

    // Expired sessions are cleared on sight
    async fn valid_session(&self) -> Option<Session> {
        let session = self.current.read().await.clone()?;
        if session.is_expired() {
            tracing::info!("session for {} expired", session.username);
            self.logout().await;
            return None;
        }
        Some(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_in: Duration) -> Session {
        Session {
            token: "abc".to_string(),
            username: "alice".to_string(),
            role: None,
            expiration: Utc::now() + expires_in,
        }
    }

    #[tokio::test]
    async fn established_session_provides_token_and_user() {
        let store = SessionStore::in_memory();
        assert!(!store.is_authenticated().await);

        store.establish(session(Duration::hours(1))).await;
        assert_eq!(store.token().await.as_deref(), Some("abc"));
        assert_eq!(store.current_user().await.unwrap().username, "alice");

        store.logout().await;
        assert!(store.token().await.is_none());
    }

    #[tokio::test]
    async fn expired_session_is_cleared_on_access() {
        let store = SessionStore::in_memory();
        store.establish(session(Duration::seconds(-5))).await;
        assert!(store.is_expired().await);

        assert!(store.token().await.is_none());
        assert!(!store.is_expired().await);
        assert!(store.current_user().await.is_none());
    }

    #[tokio::test]
    async fn load_restores_valid_and_drops_expired() {
        let store = SessionStore::new(MemorySessionStorage::with_session(session(Duration::hours(1))), 24);
        assert_eq!(store.load().await.unwrap().unwrap().username, "alice");
        assert!(store.is_authenticated().await);

        let store = SessionStore::new(MemorySessionStorage::with_session(session(Duration::hours(-1))), 24);
        assert!(store.load().await.unwrap().is_none());
        assert!(!store.is_authenticated().await);
    }
}
