//! Durable key-value storage for the bearer token.
//!
//! The session manager only ever touches one key, [`TOKEN_KEY`]. A missing
//! key is a normal state: never logged in, or logged out.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use keyring::credential::{CredentialBuilder, CredentialBuilderApi};
use keyring::Entry;
use tracing::debug;

use super::StoreError;

/// Key under which the bearer token is stored
pub const TOKEN_KEY: &str = "token";

/// Keychain service name for [`KeyringTokenStore`]
const SERVICE_NAME: &str = "gatekeep";

/// Storage file name for [`FileTokenStore`]
const STORAGE_FILE: &str = "storage.json";

pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

// ============================================================================
// File-backed store
// ============================================================================

/// JSON file holding a flat string map, surviving process restarts.
pub struct FileTokenStore {
    path: PathBuf,
    // serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileTokenStore {
    /// Store in `storage.json` under `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STORAGE_FILE))
    }

    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        if entries.is_empty() {
            debug!(path = ?self.path, "Storage empty, removing file");
            std::fs::remove_file(&self.path)?;
            Ok(())
        } else {
            self.save(&entries)
        }
    }
}

// ============================================================================
// OS keychain store
// ============================================================================

/// Stores each key as a separate keychain entry. An entry is opened on first
/// use and reused afterwards.
pub struct KeyringTokenStore {
    builder: Option<Box<CredentialBuilder>>,
    entries: Mutex<HashMap<String, Arc<Entry>>>,
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyringTokenStore {
    /// Store backed by the platform keychain
    pub fn new() -> Self {
        Self {
            builder: None,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Store backed by a specific credential backend
    pub fn with_builder(builder: Box<CredentialBuilder>) -> Self {
        Self {
            builder: Some(builder),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entry(&self, key: &str) -> Result<Arc<Entry>, StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = entries.get(key) {
            return Ok(entry.clone());
        }

        let entry = match &self.builder {
            Some(builder) => Entry::new_with_credential(builder.build(None, SERVICE_NAME, key)?),
            None => Entry::new(SERVICE_NAME, key)?,
        };
        let entry = Arc::new(entry);
        entries.insert(key.to_string(), entry.clone());
        Ok(entry)
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entry(key)?.set_password(value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store; forgets everything on exit
#[derive(Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded store, handy for starting with a persisted token
    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(TOKEN_KEY.to_string(), token.to_string());
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::in_dir(dir.path());
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        // Removing from an empty store is fine
        store.remove(TOKEN_KEY).unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileTokenStore::in_dir(dir.path()).set(TOKEN_KEY, "T1").unwrap();

        let reopened = FileTokenStore::in_dir(dir.path());
        assert_eq!(reopened.get(TOKEN_KEY).unwrap().as_deref(), Some("T1"));
    }

    #[test]
    fn test_file_store_remove_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::in_dir(dir.path().join("nested").as_path());
        store.set(TOKEN_KEY, "T1").unwrap();
        store.set("url", "/dashboard").unwrap();

        store.remove(TOKEN_KEY).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(store.get("url").unwrap().as_deref(), Some("/dashboard"));

        store.remove("url").unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::in_dir(dir.path());
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.get(TOKEN_KEY), Err(StoreError::Serialization(_))));
    }

    #[test]
    fn test_keyring_store_keeps_token_between_calls() {
        let store = KeyringTokenStore::with_builder(keyring::mock::default_credential_builder());
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);

        store.set(TOKEN_KEY, "T1").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("T1"));

        store.set(TOKEN_KEY, "T2").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("T2"));

        store.remove(TOKEN_KEY).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        // Removing again is not an error
        store.remove(TOKEN_KEY).unwrap();
    }

    #[tokio::test]
    async fn test_session_over_keyring_store_remembers_login() {
        use crate::api::{ApiError, AuthApi};
        use crate::auth::SessionManager;
        use crate::models::{AuthResponse, AuthStatus, User};

        struct EchoApi;

        #[async_trait::async_trait]
        impl AuthApi for EchoApi {
            async fn login(&self, email: &str, _password: &str) -> Result<AuthResponse, ApiError> {
                Ok(AuthResponse {
                    user: User {
                        id: "1".to_string(),
                        name: String::new(),
                        email: email.to_string(),
                        extra: Default::default(),
                    },
                    token: "T1".to_string(),
                })
            }
            async fn register(&self, _name: &str, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
                self.login(email, password).await
            }
            async fn check_token(&self, token: &str) -> Result<AuthResponse, ApiError> {
                assert_eq!(token, "T1");
                self.login("a@b.com", "").await
            }
        }

        let store = Arc::new(KeyringTokenStore::with_builder(
            keyring::mock::default_credential_builder(),
        ));
        let session = SessionManager::new(Arc::new(EchoApi), store.clone());

        session.login("a@b.com", "secret").await.unwrap();
        assert!(session.check_status().await);
        assert_eq!(session.status(), AuthStatus::Authenticated);

        session.logout();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::with_token("T0");
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("T0"));
        store.set(TOKEN_KEY, "T1").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("T1"));
        store.remove(TOKEN_KEY).unwrap();
        store.remove(TOKEN_KEY).unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    }
}
