mod config;
pub mod store;

pub use config::{
    CatalogConfig, ClockConfig, Config, NotificationsConfig, SchedulerConfig, MAX_INTERVAL_SECS,
};
pub use store::{MemoryPreferenceStore, PreferenceStore, SqlitePreferenceStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/starwatch[-dev]/` based on STARWATCH_ENV.
///
/// Set STARWATCH_ENV=dev to use the development data directory, or
/// STARWATCH_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("STARWATCH_DATA_DIR") {
        Some(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("STARWATCH_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("starwatch-dev")
            } else {
                base_dir.join("starwatch")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
