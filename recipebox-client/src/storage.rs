//! Durable storage for the session token.
//!
//! The store holds at most one token. An absent entry means "no session".

#[cfg(not(target_arch = "wasm32"))]
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Key the token lives under in browser local storage.
pub const TOKEN_KEY: &str = "token";

/// Failure of a [`TokenStorage`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File system error.
    #[error("token storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Browser storage rejected the call.
    #[cfg(target_arch = "wasm32")]
    #[error("browser storage failed: {0}")]
    Browser(String),
}

/// Backend that persists the session token across process restarts.
pub trait TokenStorage: Send + Sync {
    /// Read the stored token, if any.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be read.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Replace the stored token.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be written.
    fn store(&self, token: &str) -> Result<(), StorageError>;

    /// Delete the stored token. Deleting an absent token succeeds.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be written.
    fn remove(&self) -> Result<(), StorageError>;
}

fn non_empty(token: &str) -> Option<String> {
    let trimmed = token.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Token kept in a single file, readable only by the owner on unix.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileTokenStorage {
    /// Storage backed by the file at `path`. Nothing is touched until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the token file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(non_empty(&contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn store(&self, token: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token.as_bytes())?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Browser local storage, under [`TOKEN_KEY`], stored as a raw string.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTokenStorage;

#[cfg(target_arch = "wasm32")]
impl TokenStorage for LocalTokenStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        use gloo_storage::{LocalStorage, Storage};
        LocalStorage::raw()
            .get_item(TOKEN_KEY)
            .map(|value| value.as_deref().and_then(non_empty))
            .map_err(|err| StorageError::Browser(format!("{err:?}")))
    }

    fn store(&self, token: &str) -> Result<(), StorageError> {
        use gloo_storage::{LocalStorage, Storage};
        LocalStorage::raw()
            .set_item(TOKEN_KEY, token)
            .map_err(|err| StorageError::Browser(format!("{err:?}")))
    }

    fn remove(&self) -> Result<(), StorageError> {
        use gloo_storage::{LocalStorage, Storage};
        LocalStorage::raw()
            .remove_item(TOKEN_KEY)
            .map_err(|err| StorageError::Browser(format!("{err:?}")))
    }
}

/// In-process token slot.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    /// Empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-filled with `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
        }
    }

    /// Current contents without going through the trait.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.current().as_deref().and_then(non_empty))
    }

    fn store(&self, token: &str) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}
