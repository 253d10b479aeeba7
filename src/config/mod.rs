//! Configuration management.
//!
//! The contacts file path always comes from the operator (`--file` or
//! `CB_FILE`). Sync settings are resolved per key with priority:
//!
//! 1. Environment variable (`CB_CLIENT_ID`, `CB_CLIENT_SECRET`,
//!    `CB_REMOTE_PATH`, `CB_STAGING_PATH`, `CB_API_URL`, `CB_OAUTH_URL`)
//! 2. `~/.contactbook/config.json`
//! 3. Built-in default

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_REMOTE_PATH: &str = "app:/contacts.txt";
pub const DEFAULT_API_URL: &str = "https://cloud-api.yandex.net/v1/disk";
pub const DEFAULT_OAUTH_URL: &str = "https://oauth.yandex.ru";
const STAGING_FILE_NAME: &str = "contacts.txt";

/// Get the global contact book directory (`~/.contactbook/`).
#[must_use]
pub fn global_contactbook_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".contactbook"))
}

/// Resolve the contacts file path.
///
/// # Errors
///
/// Returns `Error::NoContactsFile` if no path was given.
pub fn resolve_contacts_path(explicit_path: Option<&Path>) -> Result<PathBuf> {
    explicit_path
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .ok_or(Error::NoContactsFile)
}

// ── Config file ──────────────────────────────────────────────

/// Sync settings as stored in `config.json`; every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_url: Option<String>,
}

impl SyncSettings {
    /// Overlay `update` onto `self`: keys set in `update` win.
    #[must_use]
    pub fn merged(self, update: Self) -> Self {
        Self {
            client_id: update.client_id.or(self.client_id),
            client_secret: update.client_secret.or(self.client_secret),
            remote_path: update.remote_path.or(self.remote_path),
            staging_path: update.staging_path.or(self.staging_path),
            api_url: update.api_url.or(self.api_url),
            oauth_url: update.oauth_url.or(self.oauth_url),
        }
    }
}

/// Contents of `~/.contactbook/config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub sync: Option<SyncSettings>,
}

/// Get the config file path.
///
/// # Errors
///
/// Returns `Error::Config` if the home directory cannot be determined.
pub fn config_path() -> Result<PathBuf> {
    global_contactbook_dir()
        .map(|dir| dir.join("config.json"))
        .ok_or_else(|| Error::Config("Could not determine home directory".into()))
}

/// Load the configuration file, or defaults if it does not exist.
///
/// # Errors
///
/// Returns `Error::Config` if the file exists but cannot be read or parsed.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse config file: {e}")))
}

/// Save the configuration file, creating its directory if needed.
///
/// # Errors
///
/// Returns `Error::Config` if the file cannot be written.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
    }

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;

    fs::write(path, content).map_err(|e| Error::Config(format!("Failed to write config file: {e}")))
}

/// Merge `update` into the stored sync settings and save.
///
/// # Errors
///
/// Returns `Error::Config` if the config cannot be read or written.
pub fn save_sync_settings(update: SyncSettings) -> Result<SyncSettings> {
    let path = config_path()?;
    let mut config = load_config_from(&path)?;
    let merged = config.sync.take().unwrap_or_default().merged(update);
    config.sync = Some(merged.clone());
    save_config_to(&path, &config)?;
    Ok(merged)
}

// ── Resolved sync config ─────────────────────────────────────

/// Fully resolved sync configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// OAuth application id; only needed for the code exchange
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub remote_path: String,
    pub staging_path: PathBuf,
    pub api_url: String,
    pub oauth_url: String,
}

impl SyncConfig {
    /// Resolve from the config file and process environment.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the config file is unreadable or no
    /// staging location can be determined.
    pub fn load() -> Result<Self> {
        let settings = load_config_from(&config_path()?)?.sync.unwrap_or_default();
        Self::resolve(settings, |key| std::env::var(key).ok())
    }

    /// Resolve `settings` with `env` lookups taking priority.
    ///
    /// Empty environment values are ignored.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if no staging path is configured and the home
    /// directory is unknown.
    pub fn resolve(settings: SyncSettings, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let staging_path = match var("CB_STAGING_PATH")
            .map(PathBuf::from)
            .or(settings.staging_path)
        {
            Some(path) => path,
            None => global_contactbook_dir()
                .map(|dir| dir.join("sync").join(STAGING_FILE_NAME))
                .ok_or_else(|| Error::Config("Could not determine staging directory".into()))?,
        };

        Ok(Self {
            client_id: var("CB_CLIENT_ID").or(settings.client_id),
            client_secret: var("CB_CLIENT_SECRET").or(settings.client_secret),
            remote_path: var("CB_REMOTE_PATH")
                .or(settings.remote_path)
                .unwrap_or_else(|| DEFAULT_REMOTE_PATH.to_string()),
            staging_path,
            api_url: var("CB_API_URL")
                .or(settings.api_url)
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            oauth_url: var("CB_OAUTH_URL")
                .or(settings.oauth_url)
                .unwrap_or_else(|| DEFAULT_OAUTH_URL.to_string()),
        })
    }
}
