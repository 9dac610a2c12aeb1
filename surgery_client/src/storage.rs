//! Durable session storage: the bearer token and the serialized user record.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;

use crate::error::StorageError;
use crate::models::User;

pub const TOKEN_KEY: &str = "token";
pub const USER_INFO_KEY: &str = "userInfo";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A JSON object on disk, rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

/// Typed view over the `token` / `userInfo` keys, shared by the API client
/// and the auth partition.
#[derive(Clone)]
pub struct SessionStorage {
    inner: Arc<dyn KeyValueStore>,
}

impl SessionStorage {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn token(&self) -> Option<String> {
        self.inner.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn set_token(&self, token: Option<&str>) -> Result<(), StorageError> {
        match token {
            Some(token) => self.inner.set(TOKEN_KEY, token),
            None => self.inner.remove(TOKEN_KEY),
        }
    }

    /// The persisted user, or `None` when absent or unreadable.
    pub fn user(&self) -> Option<User> {
        let raw = self.inner.get(USER_INFO_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable persisted user record");
                None
            }
        }
    }

    pub fn set_user(&self, user: Option<&User>) -> Result<(), StorageError> {
        match user {
            Some(user) => self.inner.set(USER_INFO_KEY, &serde_json::to_string(user)?),
            None => self.inner.remove(USER_INFO_KEY),
        }
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.inner.remove(TOKEN_KEY)?;
        self.inner.remove(USER_INFO_KEY)
    }

    /// Direct access to the underlying key/value store.
    pub fn raw(&self) -> &dyn KeyValueStore {
        self.inner.as_ref()
    }
}

impl std::fmt::Debug for SessionStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStorage")
            .field("has_token", &self.token().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_user;
    use crate::models::Role;

    #[test]
    fn session_round_trips_token_and_user() {
        let session = SessionStorage::in_memory();
        let user = sample_user(3, Role::Nurse);

        session.set_token(Some("abc")).unwrap();
        session.set_user(Some(&user)).unwrap();
        assert_eq!(session.token().as_deref(), Some("abc"));
        assert_eq!(session.user(), Some(user));

        session.clear().unwrap();
        assert_eq!(session.token(), None);
        assert_eq!(session.user(), None);
        assert_eq!(session.raw().get(USER_INFO_KEY), None);
    }

    #[test]
    fn corrupt_user_record_reads_as_absent() {
        let session = SessionStorage::in_memory();
        session.raw().set(USER_INFO_KEY, "{not json").unwrap();
        assert_eq!(session.user(), None);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let session = SessionStorage::new(FileStore::open(&path).unwrap());
        session.set_token(Some("persisted")).unwrap();
        session.set_user(Some(&sample_user(9, Role::Patient))).unwrap();
        drop(session);

        let reopened = SessionStorage::new(FileStore::open(&path).unwrap());
        assert_eq!(reopened.token().as_deref(), Some("persisted"));
        assert_eq!(reopened.user().map(|u| u.id), Some(9));

        reopened.clear().unwrap();
        let after_clear = FileStore::open(&path).unwrap();
        assert_eq!(after_clear.get(TOKEN_KEY), None);
    }
}
