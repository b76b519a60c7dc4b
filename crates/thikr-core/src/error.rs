//! Core error types for thikr-core.
//!
//! Scheduling-internal failures are recovered locally by the scheduler loop;
//! only terminal conditions (watchdog exhaustion, lock contention) surface
//! to the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for thikr-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Settings store errors
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Single-instance lock errors
    #[error("Lock error: {0}")]
    Lock(#[from] LockError),

    /// The emission channel was closed by the receiver.
    #[error("Emission channel closed")]
    ChannelClosed,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings-store-specific errors.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to load the settings file
    #[error("Failed to load settings from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save the settings file
    #[error("Failed to save settings to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dotted-path key
    #[error("Unknown settings key: {0}")]
    UnknownKey(String),

    /// A value could not be coerced to the existing field's type
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// The per-user data directory could not be determined or created
    #[error("Cannot resolve data directory: {0}")]
    DataDir(String),
}

/// Single-instance lock errors.
#[derive(Error, Debug)]
pub enum LockError {
    /// Another live instance holds the lock.
    #[error("Another instance is already running (pid {pid})")]
    AlreadyRunning { pid: u32 },

    /// Acquisition failed twice (once after stale-lock removal).
    #[error("Failed to acquire instance lock at {path}: {message}")]
    AcquireFailed { path: PathBuf, message: String },

    /// IO error while reading or removing the lock file
    #[error("Lock file IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
