//! Application settings loaded from `config.toml`.
//!
//! Every field has a default, so a missing file simply yields the defaults. The
//! values end up in exported snapshots (`user_id`, `app_settings`) and configure
//! where the ledger is stored and where notifications are sent.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "site-ledger/store";

/// Whole `config.toml`
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Owner id written into snapshots
    pub user_id: String,
    /// Key the entity store is persisted under
    pub storage_key: String,
    /// Presentation settings carried in snapshots
    pub app: AppSection,
    /// SMS destination and provider endpoint
    pub notifications: NotificationSection,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_id: "local".to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            app: AppSection::default(),
            notifications: NotificationSection::default(),
        }
    }
}

/// `[app]` table
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppSection {
    /// Dark theme flag
    pub dark_mode: bool,
    /// Locale tag
    pub language: String,
    /// Version string of the application producing exports
    pub app_version: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            dark_mode: false,
            language: "en".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// `[notifications]` table
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NotificationSection {
    /// Fixed number every notification goes to
    pub destination: String,
    /// Provider REST base URL
    pub api_base: String,
}

impl Default for NotificationSection {
    fn default() -> Self {
        Self {
            destination: String::new(),
            api_base: "https://api.twilio.com".to_string(),
        }
    }
}

/// Parses settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse settings: {e}"),
    })
}

/// Loads settings from `path`; a missing file yields [`Settings::default`].
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No settings file at {}; using defaults", path.display());
        return Ok(Settings::default());
    }

    debug!("Loading settings from {}", path.display());
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read settings file {}: {e}", path.display()),
    })?;
    parse_settings(&contents)
}

/// Loads settings from the default location (./config.toml)
pub fn load_default_settings() -> Result<Settings> {
    load_settings("config.toml")
}
