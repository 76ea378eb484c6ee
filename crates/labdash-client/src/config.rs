//! Client configuration.
//!
//! Loaded from a TOML document; every key is optional:
//!
//! ```toml
//! base_url = "https://labs.example.org/api/v1"
//! timeout_secs = 30
//! token_path = "/home/dana/.local/share/labdash/storage.json"
//! ```
//!
//! The `LABDASH_API_URL` environment variable, when set and non-empty,
//! overrides `base_url` regardless of where the rest came from.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use labdash_contracts::error::{DashError, DashResult};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable that overrides `base_url`.
pub const API_URL_ENV: &str = "LABDASH_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Root of the REST API, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Where the session token is persisted. `None` means the platform
    /// default location.
    pub token_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token_path: None,
        }
    }
}

impl ClientConfig {
    /// Parse and validate a TOML document.
    ///
    /// Returns `DashError::Config` if the TOML is malformed, has unknown
    /// keys, or carries invalid values.
    pub fn from_toml_str(s: &str) -> DashResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| DashError::Config {
            reason: format!("failed to parse client config TOML: {}", e),
        })?;
        config.validated()
    }

    /// Read and parse the file at `path`.
    pub fn from_file(path: &Path) -> DashResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| DashError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Configuration from `path` if given (defaults otherwise), with the
    /// environment override applied.
    pub fn load(path: Option<&Path>) -> DashResult<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config
            .with_base_url_override(std::env::var(API_URL_ENV).ok())
            .validated()
    }

    /// Replace `base_url` with `url` when it is present and non-blank.
    pub fn with_base_url_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            debug!(base_url = %url, "base URL overridden from environment");
            self.base_url = url;
        }
        self
    }

    fn validated(mut self) -> DashResult<Self> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(DashError::Config {
                reason: format!("base_url '{}' must be an http(s) URL", self.base_url),
            });
        }
        if self.timeout_secs == 0 {
            return Err(DashError::Config {
                reason: "timeout_secs must be greater than zero".to_string(),
            });
        }
        let trimmed = self.base_url.trim_end_matches('/').len();
        self.base_url.truncate(trimmed);
        Ok(self)
    }
}
