//! Settings model and providers
//!
//! Settings are stored as camelCase JSON, by default in
//! `<config_dir>/shotpipe/settings.json`:
//!
//! ```json
//! {
//!   "shortcuts": { "screenshotWithSelection": "CommandOrControl+Shift+1" },
//!   "localSavePath": "/home/me/Screenshots",
//!   "ftp": {
//!     "enabled": true, "host": "ftp.example.com", "port": 21,
//!     "username": "me", "password": "secret", "remotePath": "shots",
//!     "baseUrl": "https://cdn.example.com", "secure": false
//!   },
//!   "ui": { "startMinimized": true, "showNotifications": true }
//! }
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use std::{
    collections::BTreeMap,
    fmt,
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{SettingsError, SettingsResult},
    model::CaptureAction,
};

/// Environment variable overriding the settings file location
pub const SETTINGS_ENV: &str = "SHOTPIPE_SETTINGS";

/// Default FTP control port
pub const DEFAULT_FTP_PORT: u16 = 21;

/// Complete user settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Accelerator string per trigger action
    pub shortcuts:       BTreeMap<CaptureAction, String>,
    /// Folder captures are saved to; empty disables local saving
    pub local_save_path: String,
    /// FTP upload settings
    pub ftp:             FtpSettings,
    /// UI toggles
    pub ui:              UiSettings,
}

impl Default for Settings {
    fn default() -> Self {
        let shortcuts = CaptureAction::ALL
            .iter()
            .enumerate()
            .map(|(i, action)| (*action, format!("CommandOrControl+Shift+{}", i + 1)))
            .collect();

        let local_save_path = dirs::home_dir()
            .map(|home| home.join("Screenshots").display().to_string())
            .unwrap_or_default();

        Self {
            shortcuts,
            local_save_path,
            ftp: FtpSettings::default(),
            ui: UiSettings::default(),
        }
    }
}

impl Settings {
    /// Returns the trimmed local save path, or `None` when saving locally is
    /// turned off
    pub fn local_save_dir(&self) -> Option<&str> {
        let path = self.local_save_path.trim();
        (!path.is_empty()).then_some(path)
    }

    /// Returns every accelerator bound to more than one action
    ///
    /// Comparison ignores case and surrounding whitespace. Empty accelerators
    /// are unbound and never conflict.
    pub fn shortcut_conflicts(&self) -> Vec<(String, Vec<CaptureAction>)> {
        let mut by_accelerator: BTreeMap<String, Vec<CaptureAction>> = BTreeMap::new();
        for (action, accelerator) in &self.shortcuts {
            let key = accelerator.trim().to_lowercase();
            if !key.is_empty() {
                by_accelerator.entry(key).or_default().push(*action);
            }
        }

        by_accelerator
            .into_iter()
            .filter(|(_, actions)| actions.len() > 1)
            .collect()
    }
}

/// FTP upload settings
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct FtpSettings {
    /// Whether captures are uploaded
    pub enabled:     bool,
    /// Server host name
    pub host:        String,
    /// Control port
    pub port:        u16,
    /// Login user
    pub username:    String,
    /// Login password
    pub password:    String,
    /// Directory on the server; created when missing
    pub remote_path: String,
    /// Public URL prefix for uploaded files
    pub base_url:    String,
    /// Use explicit FTPS
    pub secure:      bool,
}

impl Default for FtpSettings {
    fn default() -> Self {
        Self {
            enabled:     false,
            host:        String::new(),
            port:        DEFAULT_FTP_PORT,
            username:    String::new(),
            password:    String::new(),
            remote_path: String::new(),
            base_url:    String::new(),
            secure:      false,
        }
    }
}

impl FtpSettings {
    /// Returns true if uploads are enabled and a host is set
    pub fn is_configured(&self) -> bool {
        self.enabled && !self.host.trim().is_empty()
    }

    /// `host:port` address for the control connection
    pub fn address(&self) -> String {
        format!("{}:{}", self.host.trim(), self.port)
    }
}

impl fmt::Debug for FtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FtpSettings")
            .field("enabled", &self.enabled)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &if self.password.is_empty() { "" } else { "<redacted>" })
            .field("remote_path", &self.remote_path)
            .field("base_url", &self.base_url)
            .field("secure", &self.secure)
            .finish()
    }
}

/// UI toggles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UiSettings {
    /// Start without showing the settings window
    pub start_minimized:    bool,
    /// Show a notification after each delivery
    pub show_notifications: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            start_minimized:    true,
            show_notifications: true,
        }
    }
}

/// Source of the current settings
///
/// Read once at the start of each delivery cycle.
pub trait SettingsProvider: Send + Sync {
    /// Returns a snapshot of the current settings
    fn settings(&self) -> Settings;
}

/// Fixed settings, for tests and one-shot runs
#[derive(Debug, Clone, Default)]
pub struct StaticSettings(pub Settings);

impl SettingsProvider for StaticSettings {
    fn settings(&self) -> Settings {
        self.0.clone()
    }
}

/// Settings backed by a JSON file
///
/// The file is read on [`load`](Self::load) and [`reload`](Self::reload);
/// [`SettingsProvider::settings`] serves the cached copy.
#[derive(Debug)]
pub struct JsonSettingsStore {
    path:    PathBuf,
    current: RwLock<Settings>,
}

impl JsonSettingsStore {
    /// Default settings file location, honouring `SHOTPIPE_SETTINGS`
    pub fn default_path() -> PathBuf {
        if let Some(path) = std::env::var_os(SETTINGS_ENV).filter(|p| !p.is_empty()) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shotpipe")
            .join("settings.json")
    }

    /// Loads settings from a file; a missing file yields defaults
    ///
    /// # Errors
    ///
    /// - [`SettingsError::Read`] - The file exists but cannot be read
    /// - [`SettingsError::Parse`] - The file is not valid settings JSON
    pub fn load(path: impl Into<PathBuf>) -> SettingsResult<Self> {
        let path = path.into();
        let current = Self::read(&path)?;
        Ok(Self {
            path,
            current: RwLock::new(current),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-reads the file, keeping the cached settings on failure
    pub fn reload(&self) -> SettingsResult<Settings> {
        let fresh = Self::read(&self.path)?;
        match self.current.write() {
            Ok(mut current) => *current = fresh.clone(),
            Err(poisoned) => *poisoned.into_inner() = fresh.clone(),
        }
        tracing::debug!(path = %self.path.display(), "Reloaded settings");
        Ok(fresh)
    }

    /// Writes settings to the file and caches them
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// - [`SettingsError::Write`] - The directory or file cannot be written
    pub fn save(&self, settings: &Settings) -> SettingsResult<()> {
        let write_err = |source| SettingsError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_vec_pretty(settings).map_err(|e| write_err(std::io::Error::other(e)))?;
        fs::write(&self.path, json).map_err(write_err)?;

        match self.current.write() {
            Ok(mut current) => *current = settings.clone(),
            Err(poisoned) => *poisoned.into_inner() = settings.clone(),
        }
        tracing::info!(path = %self.path.display(), "Saved settings");
        Ok(())
    }

    fn read(path: &Path) -> SettingsResult<Settings> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                return Ok(Settings::default());
            }
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl SettingsProvider for JsonSettingsStore {
    fn settings(&self) -> Settings {
        match self.current.read() {
            Ok(current) => current.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
