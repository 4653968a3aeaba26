use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

use super::Session;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Session storage unavailable: {0}")]
    Unavailable(String),
}

/// Where a session survives between runs
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<Option<Session>, SessionError>;
    fn save(&self, session: &Session) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// JSON file, e.g. `~/.config/contactbook/session.json`
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let session: Session = serde_json::from_str(&content)?;
        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// Process-local storage, for tests and embedders that persist elsewhere
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    slot: Mutex<Option<Session>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        let slot = self
            .slot
            .lock()
            .map_err(|e| SessionError::Unavailable(e.to_string()))?;
        Ok(slot.clone())
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| SessionError::Unavailable(e.to_string()))?;
        *slot = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| SessionError::Unavailable(e.to_string()))?;
        *slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn session() -> Session {
        Session {
            token: "t0k3n".to_string(),
            username: "alice".to_string(),
            role: Some("admin".to_string()),
            expiration: Utc::now() + Duration::hours(1),
        }
    }

    #[test]
    fn file_storage_round_trips_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path().join("nested").join("session.json"));

        assert!(storage.load().unwrap().is_none());
        let original = session();
        storage.save(&original).unwrap();
        assert_eq!(storage.load().unwrap(), Some(original));

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
        // Clearing twice is fine
        storage.clear().unwrap();
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        let storage = FileSessionStorage::new(path);
        assert!(matches!(storage.load(), Err(SessionError::Format(_))));
    }

    #[test]
    fn memory_storage_holds_one_session() {
        let storage = MemorySessionStorage::new();
        storage.save(&session()).unwrap();
        assert_eq!(storage.load().unwrap().unwrap().username, "alice");
        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
    }
}
