use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde_json::{Map, Value as JsonValue};

use crate::config::ClientConfig;
use crate::error::Error;
use crate::guard::Route;
use crate::types::AccessToken;

/// Storage key under which the bearer token is persisted.
pub const TOKEN_STORAGE_KEY: &str = "token";

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Holder of the current bearer token.
///
/// At most one token is held; `set` replaces whatever was there. There is no
/// expiry tracking, a stale token is only discovered when the backend
/// answers 401.
pub trait TokenStore: Send + Sync + 'static {
    fn get(&self) -> Option<AccessToken>;

    fn set(&self, token: AccessToken) -> Result<(), StoreError>;

    fn clear(&self) -> Result<(), StoreError>;
}

/// In-process token store. Lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<AccessToken>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: impl Into<AccessToken>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<AccessToken> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: AccessToken) -> Result<(), StoreError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Durable token store backed by a JSON key/value file.
///
/// The file holds a flat object of string entries, the token under
/// [`TOKEN_STORAGE_KEY`]. Other entries are left untouched. A missing file
/// reads as empty.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, JsonValue>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(Map::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Entries to rewrite from. A corrupt file is replaced, dropping its contents.
    fn entries_or_reset(&self) -> Map<String, JsonValue> {
        self.read_entries().unwrap_or_else(|e| {
            tracing::warn!(
                error = %e,
                path = %self.path.display(),
                "Unreadable token store, overwriting"
            );
            Map::new()
        })
    }

    fn write_entries(&self, entries: &Map<String, JsonValue>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<AccessToken> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        match self.read_entries() {
            Ok(entries) => entries
                .get(TOKEN_STORAGE_KEY)
                .and_then(JsonValue::as_str)
                .map(AccessToken::from),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %self.path.display(),
                    "Unreadable token store, treating as empty"
                );
                None
            }
        }
    }

    fn set(&self, token: AccessToken) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.entries_or_reset();
        entries.insert(TOKEN_STORAGE_KEY.to_owned(), JsonValue::String(token.into()));
        self.write_entries(&entries)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.entries_or_reset();
        if entries.remove(TOKEN_STORAGE_KEY).is_none() && !self.path.exists() {
            return Ok(());
        }
        self.write_entries(&entries)
    }
}

/// Store selected by `config`: a [`FileTokenStore`] at
/// [`token_store_path`](ClientConfig::token_store_path) if set, otherwise a
/// [`MemoryTokenStore`].
#[must_use]
pub fn token_store_for(config: &ClientConfig) -> Arc<dyn TokenStore> {
    match config.token_store_path() {
        Some(path) => Arc::new(FileTokenStore::new(path)),
        None => Arc::new(MemoryTokenStore::new()),
    }
}

/// Side effect used to move the user to another view.
pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, path: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn navigate(&self, path: &str) {
        self(path);
    }
}

/// Explicit session context shared by the HTTP client, the route guard and
/// the views.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
}

impl Session {
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    /// Session over the store chosen by [`token_store_for`].
    #[must_use]
    pub fn from_config(config: &ClientConfig, navigator: Arc<dyn Navigator>) -> Self {
        Self::new(token_store_for(config), navigator)
    }

    /// Current token, if any. Blank values count as absent.
    #[must_use]
    pub fn token(&self) -> Option<AccessToken> {
        self.store.get().filter(|t| !t.is_blank())
    }

    /// Presence check only; validity is never verified locally.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Persist a freshly issued token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the store rejects the write.
    pub fn store_token(&self, token: AccessToken) -> Result<(), Error> {
        self.store.set(token).map_err(Error::Store)
    }

    pub fn navigate(&self, path: &str) {
        tracing::debug!(path, "Navigating");
        self.navigator.navigate(path);
    }

    /// Wipe the token and send the user to the login view.
    ///
    /// Called once for every 401 response. A failing store is logged, the
    /// redirect still happens.
    pub fn handle_unauthorized(&self) {
        if let Err(e) = self.store.clear() {
            tracing::error!(error = %e, "Failed to clear token after 401");
        }
        self.navigate(Route::Login.path());
    }

    /// Navbar logout: clear the token, then go to the login view.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the token could not be removed. No
    /// navigation happens in that case.
    pub fn logout(&self) -> Result<(), Error> {
        self.store.clear().map_err(Error::Store)?;
        tracing::info!("Logged out");
        self.navigate(Route::Login.path());
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
