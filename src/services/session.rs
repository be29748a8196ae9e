//! The single AuthSession slot: a bearer token persisted across restarts plus the
//! signed-in user, with change notifications for the regions that depend on it.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::models::user::User;
use crate::utils::error::ClientResult;

pub const AUTH_TOKEN_KEY: &str = "authToken";

/// Persistent key/value slot holding the bearer token.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> ClientResult<Option<String>>;
    fn save(&self, token: &str) -> ClientResult<()>;
    fn clear(&self) -> ClientResult<()>;
}

/// JSON key/value file; unrelated keys already in the file are preserved.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSessionStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> ClientResult<BTreeMap<String, String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> ClientResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> ClientResult<Option<String>> {
        Ok(self.read_entries()?.remove(AUTH_TOKEN_KEY))
    }

    fn save(&self, token: &str) -> ClientResult<()> {
        let mut entries = self.read_entries()?;
        entries.insert(AUTH_TOKEN_KEY.to_string(), token.to_string());
        self.write_entries(&entries)
    }

    fn clear(&self) -> ClientResult<()> {
        let mut entries = self.read_entries()?;
        if entries.remove(AUTH_TOKEN_KEY).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn with_token(token: &str) -> Self {
        MemorySessionStore {
            slot: Mutex::new(Some(token.to_string())),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> ClientResult<Option<String>> {
        Ok(self.slot().clone())
    }

    fn save(&self, token: &str) -> ClientResult<()> {
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self.slot() = None;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthStatus {
    LoggedOut,
    LoggedIn(User),
}

impl AuthStatus {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, AuthStatus::LoggedIn(_))
    }
}

/// Owner of the AuthSession slot.
///
/// A token may be present while the status is still `LoggedOut`: that is a token
/// restored from the store that has not been confirmed by a profile fetch yet.
pub struct Session {
    store: Box<dyn SessionStore>,
    token: Mutex<Option<String>>,
    status: watch::Sender<AuthStatus>,
}

impl Session {
    pub fn new(store: Box<dyn SessionStore>) -> Self {
        let token = match store.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored session");
                None
            }
        };
        let (status, _) = watch::channel(AuthStatus::LoggedOut);
        Session {
            store,
            token: Mutex::new(token),
            status,
        }
    }

    fn token_slot(&self) -> MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn token(&self) -> Option<String> {
        self.token_slot().clone()
    }

    pub fn status(&self) -> AuthStatus {
        self.status.borrow().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.status.borrow().is_logged_in()
    }

    /// Receives every login state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.status.subscribe()
    }

    pub fn sign_in(&self, token: &str, user: User) -> ClientResult<()> {
        self.store.save(token)?;
        *self.token_slot() = Some(token.to_string());
        tracing::info!("Signed in");
        self.status.send_replace(AuthStatus::LoggedIn(user));
        Ok(())
    }

    /// Marks a restored token as valid once the profile fetch succeeded.
    pub fn confirm(&self, user: User) {
        self.status.send_replace(AuthStatus::LoggedIn(user));
    }

    pub fn sign_out(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "Failed to clear stored session");
        }
        *self.token_slot() = None;
        if self.status.send_replace(AuthStatus::LoggedOut).is_logged_in() {
            tracing::info!("Signed out");
        }
    }
}
