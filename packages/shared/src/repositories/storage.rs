use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

#[cfg(test)]
use mockall::automock;

use crate::repositories::api_client::CredentialSource;
use crate::repositories::errors::storage_errors::StorageError;

pub const AUTH_TOKEN_KEY: &str = "authToken";
pub const THEME_KEY: &str = "theme";

/// Durable key/value storage that survives restarts of the client.
#[cfg_attr(test, automock)]
pub trait ClientStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClientStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

/// Stores all keys as one JSON object in a file, rewritten on every change.
pub struct FileStorage {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let values = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            BTreeMap::new()
        };
        debug!("Opened client storage at {}", path.display());

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl ClientStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}

/// Typed access to the persisted session token.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn ClientStorage>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn ClientStorage>) -> Self {
        Self { storage }
    }

    pub fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .storage
            .get(AUTH_TOKEN_KEY)?
            .filter(|token| !token.trim().is_empty()))
    }

    pub fn save(&self, token: &str) -> Result<(), StorageError> {
        self.storage.set(AUTH_TOKEN_KEY, token)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(AUTH_TOKEN_KEY)
    }
}

impl CredentialSource for TokenStore {
    fn current_token(&self) -> Option<String> {
        match self.load() {
            Ok(token) => token,
            Err(e) => {
                warn!("Failed to read persisted token: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").unwrap(), None);

        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));

        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set(AUTH_TOKEN_KEY, "token-1").unwrap();
        storage.set(THEME_KEY, "dark").unwrap();
        drop(storage);

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(
            reopened.get(AUTH_TOKEN_KEY).unwrap().as_deref(),
            Some("token-1")
        );
        assert_eq!(reopened.get(THEME_KEY).unwrap().as_deref(), Some("dark"));

        reopened.remove(AUTH_TOKEN_KEY).unwrap();
        let again = FileStorage::open(&path).unwrap();
        assert_eq!(again.get(AUTH_TOKEN_KEY).unwrap(), None);
        assert_eq!(again.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_file_storage_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            FileStorage::open(&path),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn test_token_store_ignores_blank_token() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(AUTH_TOKEN_KEY, "   ").unwrap();

        let tokens = TokenStore::new(storage);
        assert_eq!(tokens.current_token(), None);

        tokens.save("abc").unwrap();
        assert_eq!(tokens.current_token().as_deref(), Some("abc"));

        tokens.clear().unwrap();
        assert_eq!(tokens.current_token(), None);
    }

    #[test]
    fn test_token_store_swallows_storage_failures() {
        let mut storage = MockClientStorage::new();
        storage.expect_get().returning(|_| {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "denied",
            )))
        });

        let tokens = TokenStore::new(Arc::new(storage));
        assert_eq!(tokens.current_token(), None);
        assert!(tokens.load().is_err());
    }
}
