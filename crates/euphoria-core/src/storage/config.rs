//! TOML-based persistence for the user's Euphoria settings.
//!
//! Reads and writes [`Settings`] to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\Euphoria\settings.toml`
//! - Linux:    `~/.config/euphoria/settings.toml`
//! - macOS:    `~/Library/Application Support/Euphoria/settings.toml`
//!
//! Example document:
//!
//! ```toml
//! log_level = "info"
//!
//! [connection]
//! host = "localhost"
//! port = 12345
//!
//! [trigger_words]
//! mode = "list"
//! words = ["good girl"]
//!
//! [backend]
//! api_base_url = "http://localhost:4000/api/"
//!
//! [oauth]
//! client_id = "947195490322235482"
//! redirect_uri = "https://localhost:2069/"
//! scope = "identify"
//! ```
//!
//! # Serde default values
//!
//! Every section and field has a default, so the app works on first run
//! (before a settings file exists) and with files written by older versions
//! that lack newer fields.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::connection::{ConnectionError, ConnectionSettings};
use crate::domain::endpoints::{BackendSettings, OAuthSettings};
use crate::domain::trigger::{TriggerError, TriggerWords};

/// File name of the settings document inside the config directory.
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Error type for settings file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The settings could not be serialized to TOML.
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The connection section holds values the setters would have rejected.
    #[error("invalid connection settings: {0}")]
    InvalidConnection(#[from] ConnectionError),

    /// The trigger-word rule does not compile.
    #[error("invalid trigger words: {0}")]
    InvalidTrigger(#[from] TriggerError),
}

// ── Settings document ─────────────────────────────────────────────────────────

/// Everything the user can configure, in one document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// `tracing` level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub connection: ConnectionSettings,
    #[serde(default)]
    pub trigger_words: TriggerWords,
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub oauth: OAuthSettings,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            connection: ConnectionSettings::default(),
            trigger_words: TriggerWords::default(),
            backend: BackendSettings::default(),
            oauth: OAuthSettings::default(),
        }
    }
}

impl Settings {
    /// Rejects values that would only fail later, at connect or match time.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidConnection`] or [`ConfigError::InvalidTrigger`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.connection.validate()?;
        self.trigger_words.compile()?;
        Ok(())
    }
}

// ── Settings repository ───────────────────────────────────────────────────────

/// Resolves the full path to the settings file in the platform config dir.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the base directory cannot
/// be determined from the environment.
pub fn default_settings_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join(SETTINGS_FILE_NAME))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Reads [`Settings`] from `path` without checking the values, returning
/// defaults if the file does not yet exist.
///
/// Commands that repair or override stored values use this, so a bad port in
/// the file does not lock the user out of `settings set-port`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found"
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn read_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let settings: Settings = toml::from_str(&content)?;
            debug!("read settings from {}", path.display());
            Ok(settings)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("no settings at {}; using defaults", path.display());
            Ok(Settings::default())
        }
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Loads [`Settings`] from `path` like [`read_settings_from`], then rejects
/// values that are unusable.
///
/// # Errors
///
/// Everything [`read_settings_from`] returns, plus
/// [`ConfigError::InvalidConnection`] / [`ConfigError::InvalidTrigger`].
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    let settings = read_settings_from(path)?;
    settings.validate()?;
    Ok(settings)
}

/// Persists `settings` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(settings)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("saved settings to {}", path.display());
    Ok(())
}

/// Resolves the platform config base directory including the `Euphoria` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Euphoria"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("euphoria"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("Euphoria")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
