pub mod settings;

pub use settings::{QuietWindow, ReminderConfig, Settings, SettingsStore};

use std::path::PathBuf;

use crate::error::SettingsError;

/// Returns `~/.config/thikr[-dev]/` based on THIKR_ENV.
///
/// Set THIKR_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, SettingsError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("THIKR_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("thikr-dev")
    } else {
        base_dir.join("thikr")
    };

    std::fs::create_dir_all(&dir).map_err(|e| SettingsError::DataDir(e.to_string()))?;
    Ok(dir)
}
