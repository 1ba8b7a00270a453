//! Core error types for habitstack-core.
//!
//! Transitions over state never fail: unknown ids and missing ledger entries
//! resolve to no-ops. Errors only surface at the edges, when parsing input,
//! building stacks from drafts, loading configuration or touching persistence.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for habitstack-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Persistence errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

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
    /// Data directory could not be resolved or created
    #[error("Failed to prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Date string is not a zero-padded `YYYY-MM-DD` calendar date
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Day-of-week outside 0 (Sunday) ..= 6 (Saturday)
    #[error("Invalid weekday {0}: expected 0 (Sunday) to 6 (Saturday)")]
    InvalidWeekday(u8),

    /// Unknown cadence name
    #[error("Unknown cadence '{0}'")]
    UnknownCadence(String),

    /// A stack needs at least one habit
    #[error("A habit stack needs at least one habit")]
    EmptyStack,

    /// Too many habits chained in one stack
    #[error("A habit stack holds at most {max} habits (got {len})")]
    StackTooLarge { len: usize, max: usize },

    /// Habit behaviour left blank
    #[error("Habit {index} has an empty behaviour")]
    EmptyBehaviour { index: usize },

    /// Cadence without any selected day
    #[error("Cadence must select at least one day")]
    EmptyCadenceDays,
}

/// Persistence errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Key contains characters that cannot be mapped onto the backend
    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    /// Reading a key failed
    #[error("Failed to read '{key}': {source}")]
    ReadFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing a key failed
    #[error("Failed to write '{key}': {source}")]
    WriteFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Removing a key failed
    #[error("Failed to remove '{key}': {source}")]
    RemoveFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Backend refused the operation
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
