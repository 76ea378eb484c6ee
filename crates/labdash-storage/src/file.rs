//! JSON-file implementation of `TokenStore`.
//!
//! The file holds one flat JSON object of string keys to string values,
//! e.g. `{"auth_token": "eyJ..."}`. Keys other than the session token are
//! preserved on every write.
//!
//! Writes go to a sibling temporary file that is then renamed over the
//! original, so a crash mid-write leaves the previous contents intact. On
//! unix the file is readable by its owner only.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use labdash_contracts::error::{DashError, DashResult};
use labdash_core::traits::{TokenStore, TOKEN_KEY};

/// Directory under the platform data dir that holds our files.
pub const APP_DIR: &str = "labdash";

/// File name of the key-value store within `APP_DIR`.
pub const STORE_FILE: &str = "storage.json";

fn storage_err(path: &Path, action: &str, e: impl std::fmt::Display) -> DashError {
    DashError::Storage {
        reason: format!("failed to {} '{}': {}", action, path.display(), e),
    }
}

fn owner_only() -> fs::OpenOptions {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
}

/// `mode` only applies on creation; a leftover temp file keeps its own.
#[cfg(unix)]
fn restrict(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}

pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<platform data dir>/labdash/storage.json`.
    pub fn default_path() -> DashResult<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR).join(STORE_FILE))
            .ok_or_else(|| DashError::Storage {
                reason: "no platform data directory available".to_string(),
            })
    }

    /// A store at `default_path()`.
    pub fn at_default_location() -> DashResult<Self> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole map. A missing file is an empty map.
    fn read_entries(&self) -> DashResult<BTreeMap<String, String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(storage_err(&self.path, "read", e)),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| storage_err(&self.path, "parse", e))
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> DashResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| storage_err(parent, "create", e))?;
        }
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| storage_err(&self.path, "serialize", e))?;

        let tmp = self.path.with_extension("json.tmp");
        let mut file = owner_only()
            .open(&tmp)
            .map_err(|e| storage_err(&tmp, "create", e))?;
        restrict(&file).map_err(|e| storage_err(&tmp, "restrict", e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| storage_err(&tmp, "write", e))?;
        drop(file);
        fs::rename(&tmp, &self.path).map_err(|e| storage_err(&self.path, "replace", e))
    }

    pub fn get(&self, key: &str) -> DashResult<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    pub fn set(&self, key: &str, value: &str) -> DashResult<()> {
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    /// Remove `key`. Does not touch the file when the key is absent.
    pub fn remove(&self, key: &str) -> DashResult<()> {
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> DashResult<Option<String>> {
        let token = self.get(TOKEN_KEY)?;
        debug!(path = %self.path.display(), found = token.is_some(), "loaded session token");
        Ok(token)
    }

    fn save(&self, token: &str) -> DashResult<()> {
        self.set(TOKEN_KEY, token)?;
        info!(path = %self.path.display(), "session token persisted");
        Ok(())
    }

    fn clear(&self) -> DashResult<()> {
        self.remove(TOKEN_KEY)?;
        info!(path = %self.path.display(), "session token cleared");
        Ok(())
    }
}
