//! Durable storage for the access/refresh token pair.

use std::fmt;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use attendify_core::{Credentials, SERVICE_NAME};

use crate::error::CredentialsError;

const CREDENTIALS_FILE: &str = "credentials.json";

/// Where the session keeps its tokens between runs.
///
/// Implementations must be cheap to call: the API client reads the access
/// token on every request.
pub trait CredentialStore: Send + Sync + fmt::Debug {
    /// Returns the stored pair, or `None` when nothing is stored.
    ///
    /// # Errors
    /// Returns `CredentialsError` if the backing storage cannot be read.
    fn load(&self) -> Result<Option<Credentials>, CredentialsError>;

    /// Replaces the stored pair.
    ///
    /// # Errors
    /// Returns `CredentialsError` if the backing storage cannot be written.
    fn save(&self, credentials: &Credentials) -> Result<(), CredentialsError>;

    /// Removes every stored token. Clearing an empty store succeeds.
    ///
    /// # Errors
    /// Returns `CredentialsError` if the backing storage cannot be removed.
    fn clear(&self) -> Result<(), CredentialsError>;
}

/// JSON file store, `{ "accessToken": ..., "refreshToken": ... }`.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store under the platform config directory, e.g.
    /// `~/.config/attendify/credentials.json`.
    ///
    /// # Errors
    /// Returns `CredentialsError::NoConfigDir` when the platform has no
    /// config directory.
    pub fn in_config_dir() -> Result<Self, CredentialsError> {
        Ok(Self::new(default_path()?))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> CredentialsError {
        CredentialsError::Io { path: self.path.clone(), source }
    }
}

/// Default location of the credentials file.
///
/// # Errors
/// Returns `CredentialsError::NoConfigDir` when the platform has no config
/// directory.
pub fn default_path() -> Result<PathBuf, CredentialsError> {
    let base = dirs::config_dir().ok_or(CredentialsError::NoConfigDir)?;
    Ok(base.join(SERVICE_NAME).join(CREDENTIALS_FILE))
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, CredentialsError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| CredentialsError::Corrupt { path: self.path.clone(), source })
    }

    fn save(&self, credentials: &Credentials) -> Result<(), CredentialsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_vec_pretty(credentials).map_err(|source| {
            CredentialsError::Corrupt { path: self.path.clone(), source }
        })?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path).map_err(|e| self.io_error(e))?;
        file.write_all(&json).map_err(|e| self.io_error(e))?;
        tracing::debug!(path = %self.path.display(), "Saved credentials");
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialsError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Removed credentials");
                Ok(())
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Process-local store, used by tests and one-shot sessions.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Option<Credentials>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self { inner: Mutex::new(Some(credentials)) }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, CredentialsError> {
        Ok(self.inner.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, credentials: &Credentials) -> Result<(), CredentialsError> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialsError> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
