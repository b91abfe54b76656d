//! Persisted settings: the GitHub personal access token.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{DirCloneError, Result};

const APP_DIR: &str = "gitdirclone";
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the settings directory.
pub const CONFIG_DIR_ENV: &str = "GITDIRCLONE_CONFIG_DIR";

/// The stored settings record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// GitHub personal access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// A settings record on disk.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Open the store at its default location.
    ///
    /// `$GITDIRCLONE_CONFIG_DIR/config.json` when set, otherwise
    /// `<config dir>/gitdirclone/config.json`.
    pub fn new() -> Result<Self> {
        Self::locate()
            .ok_or_else(|| DirCloneError::InvalidConfig("Cannot determine config directory".into()))
    }

    /// Like [`SettingsStore::new`], but `None` when the platform has no
    /// config directory and no override is set.
    pub fn locate() -> Option<Self> {
        let dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::config_dir()?.join(APP_DIR),
        };
        Some(Self::at(dir.join(CONFIG_FILE)))
    }

    /// Open the store backed by a specific file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the settings file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the settings, or defaults if nothing has been saved yet.
    pub fn load(&self) -> Result<Settings> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the settings, creating parent directories as needed.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(settings)?)?;

        // The file holds a credential
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        debug!(path = %self.path.display(), "saved settings");
        Ok(())
    }

    /// Store a token, replacing any previous one.
    pub fn set_token(&self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DirCloneError::InvalidConfig("token must not be empty".into()));
        }
        let mut settings = self.load()?;
        settings.token = Some(token.to_string());
        self.save(&settings)
    }

    /// Remove the stored token. Returns whether one was present.
    pub fn remove_token(&self) -> Result<bool> {
        let mut settings = self.load()?;
        let removed = settings.token.take().is_some();
        if removed {
            self.save(&settings)?;
        }
        Ok(removed)
    }

    /// The stored token, if any.
    pub fn token(&self) -> Result<Option<String>> {
        Ok(self.load()?.token)
    }

    /// Whether a token is stored.
    pub fn has_token(&self) -> Result<bool> {
        Ok(self.token()?.is_some())
    }
}

/// Pick the token to authenticate with: the stored one, then `env_token`
/// (normally `$GITHUB_TOKEN`). Blank values count as unset.
pub fn resolve_token(
    store: Option<&SettingsStore>,
    env_token: Option<String>,
) -> Result<Option<String>> {
    let stored = match store {
        Some(store) => store.token()?,
        None => None,
    };
    let present = |token: &String| !token.trim().is_empty();
    Ok(stored.filter(present).or(env_token.filter(present)))
}
