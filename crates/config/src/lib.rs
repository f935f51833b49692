//! Configuration management for the hebdo application.
//!
//! This crate handles loading, validating, and persisting configuration:
//!
//! - [`config`]: the [`Config`] struct, validation, and file locations
//! - [`persistence`]: JSON5/JSON file discovery, reading, and writing
//! - [`error`]: configuration error types
//!
//! # Configuration sources
//!
//! Files are searched in priority order:
//!
//! 1. Local: `./hebdo.json5` or `./hebdo.json`
//! 2. User: `~/.config/hebdo/config.json5` or `~/.config/hebdo/config.json`
//!
//! With no file present, built-in defaults apply: no remote API, the
//! platform data directory for the board file, and a 500ms auto-save
//! debounce.
//!
//! # Examples
//!
//! A minimal configuration enabling remote sync:
//!
//! ```json5
//! {
//!   // Remote task service; omit the whole block for local-only use.
//!   api: {
//!     base_url: "https://tasks.example.com/api",
//!     user: "sam",
//!   },
//! }
//! ```
//!
//! Loading it:
//!
//! ```no_run
//! use hebdo_config::Config;
//!
//! # fn example() -> hebdo_config::Result<()> {
//! let config = Config::load()?;
//! println!("board file: {}", config.data_file()?.display());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod persistence;

// Re-export primary types at crate root for convenience
pub use config::{ApiConfig, Config, DEFAULT_AUTOSAVE_MS};
pub use error::{ConfigError, Result};
pub use persistence::{find_config_file, read_config_file, user_config_dir, write_config_file};
