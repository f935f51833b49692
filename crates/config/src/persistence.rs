//! Config file discovery, reading, and writing.
//!
//! Configuration lives in JSON5 (preferred, allows comments) or plain
//! JSON. Files are searched in the working directory first and the user
//! config directory second, so a project-local `hebdo.json5` can shadow
//! the global one.

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// File names tried in the working directory, in priority order.
const LOCAL_FILE_NAMES: &[&str] = &["hebdo.json5", "hebdo.json"];

/// Directory under the platform config dir.
const USER_CONFIG_DIR: &str = "hebdo";

/// File names tried in the user config directory, in priority order.
const USER_FILE_NAMES: &[&str] = &["config.json5", "config.json"];

/// Finds the configuration file to load, if any exists.
///
/// Candidates are checked in order: `./hebdo.json5`, `./hebdo.json`, then
/// `config.json5` and `config.json` under `~/.config/hebdo/` (or the
/// platform equivalent).
#[must_use]
pub fn find_config_file() -> Option<PathBuf> {
    let local = LOCAL_FILE_NAMES.iter().map(PathBuf::from);
    let user = dirs::config_dir().into_iter().flat_map(|dir| {
        let base = dir.join(USER_CONFIG_DIR);
        USER_FILE_NAMES.iter().map(move |name| base.join(name))
    });
    local.chain(user).find(|path| path.exists())
}

/// The per-user configuration directory, typically `~/.config/hebdo`.
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDirectory`] when the platform config
/// directory cannot be determined.
pub fn user_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(USER_CONFIG_DIR))
        .ok_or(ConfigError::NoHomeDirectory)
}

/// Reads and parses a configuration file (JSON5 or JSON).
///
/// # Errors
///
/// Returns an error when the file cannot be read or does not parse.
pub fn read_config_file<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    // The JSON5 parser accepts plain JSON as well.
    serde_json5::from_str(&content).map_err(ConfigError::from)
}

/// Writes a configuration value as pretty-printed JSON, creating parent
/// directories as needed.
///
/// # Errors
///
/// Returns an error when serialization or the write fails.
pub fn write_config_file<T: serde::Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.exists()) {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::WriteFile {
            path: path.to_path_buf(),
            source,
        })?;
    }
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content).map_err(|source| ConfigError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}
