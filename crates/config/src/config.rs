//! The main configuration struct and its loading logic.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::persistence::{find_config_file, read_config_file, write_config_file};

/// Default quiet period before local changes are auto-saved, in
/// milliseconds.
pub const DEFAULT_AUTOSAVE_MS: u64 = 500;

/// Longest accepted auto-save debounce. Anything slower widens the
/// data-loss window on crash past what the board promises.
const MAX_AUTOSAVE_MS: u64 = 60_000;

/// Settings for the remote task API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the task service, e.g. `https://tasks.example.com/api`.
    pub base_url: String,
    /// Account name shown for the signed-in session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// API token. The `HEBDO_API_TOKEN` environment variable takes
    /// precedence over this value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Application configuration.
///
/// # Examples
///
/// ```
/// use hebdo_config::Config;
///
/// let config = Config::default();
/// assert!(config.api.is_none());
/// assert_eq!(config.autosave_ms, 500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the local board file. Defaults to the platform
    /// data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Remote task API settings. Absent for purely local use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<ApiConfig>,

    /// Quiet period before local changes are auto-saved, in milliseconds.
    #[serde(default = "default_autosave_ms")]
    pub autosave_ms: u64,
}

fn default_autosave_ms() -> u64 {
    DEFAULT_AUTOSAVE_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            api: None,
            autosave_ms: DEFAULT_AUTOSAVE_MS,
        }
    }
}

impl Config {
    /// Loads configuration from the default file locations.
    ///
    /// Returns the default configuration when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error when a file is found but cannot be read, parsed,
    /// or validated.
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }

    /// Loads configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read, parsed, or
    /// validated.
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let config: Config = read_config_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written.
    pub fn save_to(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        write_config_file(path, self)
    }

    /// Checks that all configured values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] or
    /// [`ConfigError::InvalidAutosave`] when a value is out of range.
    pub fn validate(&self) -> Result<()> {
        if let Some(api) = &self.api {
            let url = api.base_url.trim();
            if url.is_empty() {
                return Err(ConfigError::InvalidBaseUrl(
                    "base_url must not be empty".to_string(),
                ));
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidBaseUrl(api.base_url.clone()));
            }
        }
        if self.autosave_ms > MAX_AUTOSAVE_MS {
            return Err(ConfigError::InvalidAutosave {
                reason: format!("{}ms exceeds the {MAX_AUTOSAVE_MS}ms maximum", self.autosave_ms),
            });
        }
        Ok(())
    }

    /// The path of the local board file.
    ///
    /// Uses `data_dir` when configured, otherwise the platform data
    /// directory (for example `~/.local/share/hebdo` on Linux).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHomeDirectory`] when no data directory can
    /// be determined.
    pub fn data_file(&self) -> Result<PathBuf> {
        let dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .ok_or(ConfigError::NoHomeDirectory)?
                .join("hebdo"),
        };
        Ok(dir.join("board.json"))
    }
}
