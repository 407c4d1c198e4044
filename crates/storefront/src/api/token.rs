//! Bearer token persistence.
//!
//! The token is read before every request and evicted on any 401, so the
//! store is consulted synchronously and kept deliberately small.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Errors raised while persisting a token.
#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("failed to write token file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to remove token file {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("token must not be empty")]
    Empty,
}

/// Storage for the authorization token.
pub trait TokenStore: Send + Sync {
    /// Current token, if any.
    fn load(&self) -> Option<SecretString>;

    /// Replace the stored token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is blank or cannot be persisted.
    fn save(&self, token: SecretString) -> Result<(), TokenStoreError>;

    /// Forget the stored token. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if persisted state cannot be removed.
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Process-local token store.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<SecretString>>,
}

impl MemoryTokenStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with `token`.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(SecretString::from(token.into()))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<SecretString> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, token: SecretString) -> Result<(), TokenStoreError> {
        if token.expose_secret().trim().is_empty() {
            return Err(TokenStoreError::Empty);
        }
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token);
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Durable token store backed by a single file.
///
/// A missing or blank file means "no token".
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store persisted at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the token file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<SecretString> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    None
                } else {
                    Some(SecretString::from(token.to_string()))
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read token file");
                None
            }
        }
    }

    fn save(&self, token: SecretString) -> Result<(), TokenStoreError> {
        let value = token.expose_secret().trim();
        if value.is_empty() {
            return Err(TokenStoreError::Empty);
        }
        std::fs::write(&self.path, value).map_err(|source| TokenStoreError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(TokenStoreError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
