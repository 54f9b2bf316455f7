//! Credential pair and the keyed stores that persist it.

use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Storage key of the access token.
pub const ACCESS_KEY: &str = "access";
/// Storage key of the refresh token.
pub const REFRESH_KEY: &str = "refresh";

/// Errors raised by persistent credential stores.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The backing file is not a JSON object of strings.
    #[error("corrupt credential file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Access and refresh token, always stored and loaded together.
#[derive(Debug, Clone)]
pub struct CredentialPair {
    access: SecretString,
    refresh: SecretString,
}

impl CredentialPair {
    /// Create a pair from raw token strings.
    #[must_use]
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: SecretString::from(access.into()),
            refresh: SecretString::from(refresh.into()),
        }
    }

    /// Bearer token for API requests.
    #[must_use]
    pub const fn access(&self) -> &SecretString {
        &self.access
    }

    /// Token exchanged for a new pair once the access token expires.
    #[must_use]
    pub const fn refresh(&self) -> &SecretString {
        &self.refresh
    }

    /// Write both tokens in a single store operation.
    pub(crate) fn save(&self, store: &dyn CredentialStore) -> Result<(), StorageError> {
        store.set_all(&[
            (ACCESS_KEY, self.access.expose_secret()),
            (REFRESH_KEY, self.refresh.expose_secret()),
        ])
    }

    /// Read the pair back; a missing or empty token means no pair at all.
    pub(crate) fn load(store: &dyn CredentialStore) -> Result<Option<Self>, StorageError> {
        let access = store.get(ACCESS_KEY)?.filter(|token| !token.is_empty());
        let refresh = store.get(REFRESH_KEY)?.filter(|token| !token.is_empty());
        Ok(match (access, refresh) {
            (Some(access), Some(refresh)) => Some(Self::new(access, refresh)),
            _ => None,
        })
    }

    /// Remove both tokens in a single store operation.
    pub(crate) fn erase(store: &dyn CredentialStore) -> Result<(), StorageError> {
        store.remove_all(&[ACCESS_KEY, REFRESH_KEY])
    }
}

/// Keyed string storage for credentials.
///
/// Writes and removals are batched so a store can apply them in one step;
/// readers never observe half of a pair written by [`CredentialPair::save`].
pub trait CredentialStore: Send + Sync {
    /// Read a single value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite every entry at once.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing storage cannot be written.
    fn set_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError>;

    /// Remove every key at once; absent keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing storage cannot be written.
    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError>;
}

// =============================================================================
// MemoryStore
// =============================================================================

/// Process-local store, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut map = self.entries();
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut map = self.entries();
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

// =============================================================================
// FileStore
// =============================================================================

/// JSON file store that survives restarts.
///
/// Every write replaces the file through a temporary sibling and a rename,
/// so a crash mid-write leaves either the old pair or the new one.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Store backed by the file at `path`; the file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if map.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("tmp");
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&tmp)?;
        #[cfg(unix)]
        {
            // A leftover temp file keeps its old mode through `open`.
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(&serde_json::to_vec_pretty(map)?)?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.guard();
        Ok(self.read()?.remove(key))
    }

    fn set_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let _guard = self.guard();
        let mut map = self.read()?;
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        self.write(&map)
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        let _guard = self.guard();
        let mut map = self.read()?;
        let before = map.len();
        for key in keys {
            map.remove(*key);
        }
        if map.len() == before {
            return Ok(());
        }
        self.write(&map)
    }
}

// =============================================================================
// DetachedStore
// =============================================================================

/// Store for contexts without persistent storage: writes vanish, reads
/// find nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedStore;

impl CredentialStore for DetachedStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn set_all(&self, _entries: &[(&str, &str)]) -> Result<(), StorageError> {
        Ok(())
    }

    fn remove_all(&self, _keys: &[&str]) -> Result<(), StorageError> {
        Ok(())
    }
}
