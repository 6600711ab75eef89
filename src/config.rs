use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Covers backend cold starts.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client configuration.
///
/// Use [`from_env()`](ClientConfig::from_env) for convention-based setup,
/// or [`new()`](ClientConfig::new) with `with_*` methods for full control.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ClientConfig {
    pub(crate) base_url: Url,
    pub(crate) timeout: Duration,
    pub(crate) token_store_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(default_base_url())
    }
}

fn default_base_url() -> Url {
    DEFAULT_BASE_URL.parse().expect("valid default URL")
}

impl ClientConfig {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            token_store_path: None,
        }
    }

    /// Create config from environment variables.
    ///
    /// # Optional env vars
    /// - `API_URL`: backend base URL (default `http://localhost:8000`)
    /// - `API_TIMEOUT_SECS`: request timeout in whole seconds (default 30)
    /// - `TOKEN_STORE_PATH`: file used by [`FileTokenStore`](crate::FileTokenStore)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a value is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Self::default();

        if let Some(raw) = lookup("API_URL").filter(|v| !v.trim().is_empty()) {
            let url: Url = raw
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("API_URL: {e}")))?;
            config = config.with_base_url(url);
        }
        if let Some(raw) = lookup("API_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("API_TIMEOUT_SECS: {e}")))?;
            if secs == 0 {
                return Err(Error::Config("API_TIMEOUT_SECS must be positive".into()));
            }
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(path) = lookup("TOKEN_STORE_PATH").filter(|v| !v.trim().is_empty()) {
            config = config.with_token_store_path(path);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_base_url(mut self, url: Url) -> Self {
        self.base_url = url;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_token_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_store_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn token_store_path(&self) -> Option<&std::path::Path> {
        self.token_store_path.as_deref()
    }

    /// Resolve an endpoint path against the base URL, keeping any base path prefix.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|e| Error::Config(format!("endpoint {path}: {e}")))
    }
}
