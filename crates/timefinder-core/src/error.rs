//! Core error types for timefinder-core.
//!
//! This module defines the error hierarchy using thiserror so callers
//! can match on the failure domain (calendar, storage, config, validation).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for timefinder-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Calendar provider errors
    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors from the calendar provider.
#[derive(Error, Debug)]
pub enum CalendarError {
    /// Transport-level failure (connection, TLS, decode)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status from the provider
    #[error("Calendar API returned status {status}")]
    Status { status: u16 },

    /// Error object embedded in an otherwise-200 response body
    #[error("Calendar API error: {0}")]
    Api(String),

    /// Expected field absent from a provider response
    #[error("Missing field in calendar response: {0}")]
    MissingField(&'static str),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid time range
    #[error("Invalid time range: end ({end}) must be greater than start ({start})")]
    InvalidTimeRange { start: String, end: String },

    /// A wall-clock time that does not exist in the target timezone
    /// (e.g. inside a DST spring-forward gap)
    #[error("Local time {time} does not exist in timezone {timezone}")]
    NonexistentLocalTime { time: String, timezone: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        DatabaseError::QueryFailed(err.to_string())
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(DatabaseError::from(err))
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
