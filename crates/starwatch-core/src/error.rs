//! Core error types for starwatch-core.
//!
//! This module defines the error hierarchy using thiserror for
//! load-time failures, projection guards and preference storage.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for starwatch-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog loading and validation errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Schedule projection errors
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// Preference store errors
    #[error("Preference store error: {0}")]
    Store(#[from] StoreError),

    /// Clock errors
    #[error("Clock error: {0}")]
    Clock(#[from] ClockError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Catalog load errors. Every variant is raised at load time, never per tick.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to read catalog from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed time '{value}' in {context}")]
    MalformedTime { value: String, context: String },

    #[error("Event '{event}' must have exactly one schedule mode, found {found}")]
    ScheduleMode { event: String, found: usize },

    #[error("Event '{event}' needs both an initial time and a frequency")]
    IncompleteSchedule { event: String },

    #[error("Event '{event}' references unknown {kind} '{reference}'")]
    UnknownReference {
        event: String,
        kind: &'static str,
        reference: String,
    },

    #[error("Duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("Festival '{name}' must start before it ends ({start} >= {end})")]
    FestivalWindow {
        name: String,
        start: chrono::NaiveDateTime,
        end: chrono::NaiveDateTime,
    },
}

/// Projection errors for a single event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Frequency of zero or one that does not divide a day evenly
    #[error("Event '{event}' has frequency {frequency_hours}h which does not divide 24 hours")]
    FrequencyDoesNotDivideDay { event: String, frequency_hours: u32 },

    /// The wrap-around loop hit the iteration guard
    #[error("Projection for event '{event}' did not return to its initial time after {iterations} iterations")]
    ProjectionDidNotTerminate { event: String, iterations: usize },

    /// Rotating event whose slot is missing from the current rotation order
    #[error("Slot '{slot}' is not part of the rotation")]
    SlotNotInRotation { slot: String },
}

/// Preference store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open preference store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Preference store is locked")]
    Locked,

    /// Stored value could not be interpreted
    #[error("Stored value for '{key}' is not a valid {expected}: {value}")]
    InvalidValue {
        key: String,
        expected: &'static str,
        value: String,
    },

    /// Shared state mutex was poisoned
    #[error("Shared state lock poisoned")]
    Poisoned,
}

/// Clock read failures. Fatal for the current tick only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("System clock is unavailable: {0}")]
    Unavailable(String),
}

/// Notifier delivery failures. Logged and never propagated past the tick.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Identifier unknown to the notify tree
    #[error("Unknown notify identifier: {0}")]
    UnknownIdentifier(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StoreError::Poisoned
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
