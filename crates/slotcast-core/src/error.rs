//! Core error types for slotcast-core.
//!
//! The domain kinds (`MissingParameter`, `MalformedInput`, `UnknownTag`,
//! `PersistenceUnavailable`, `ResetFailed`) are what callers match on;
//! the wrapped storage/config errors carry the underlying cause.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for slotcast-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A required request parameter was absent
    #[error("Missing `{0}` parameter")]
    MissingParameter(String),

    /// A timestamp or number failed to parse, or a value is out of range
    #[error("Malformed value for '{field}': {value}")]
    MalformedInput { field: String, value: String },

    /// Tag is not part of the configured tag set
    #[error("Unknown tag: {0}")]
    UnknownTag(String),

    /// Storage collaborator could not be reached (transient)
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    /// An explicit reset removed nothing
    #[error("Failed to reset user state: nothing to remove")]
    ResetFailed,

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    pub fn malformed(field: impl Into<String>, value: impl ToString) -> Self {
        CoreError::MalformedInput {
            field: field.into(),
            value: value.to_string(),
        }
    }

    /// Whether retrying the same storage call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CoreError::PersistenceUnavailable(_) | CoreError::Database(DatabaseError::Locked)
        )
    }
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

    /// Database is locked
    #[error("Database is locked")]
    Locked,
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
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked
                    || err.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        match DatabaseError::from(err) {
            DatabaseError::Locked => {
                CoreError::PersistenceUnavailable("database is locked".to_string())
            }
            other => CoreError::Database(other),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameter_names_the_parameter() {
        let err = CoreError::MissingParameter("action".to_string());
        assert_eq!(err.to_string(), "Missing `action` parameter");
    }

    #[test]
    fn malformed_input_carries_offending_value() {
        let err = CoreError::malformed("start_date", "yesterday");
        assert!(err.to_string().contains("yesterday"));
        assert!(err.to_string().contains("start_date"));
    }

    #[test]
    fn locked_database_is_transient() {
        let sqlite = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        let err = CoreError::from(sqlite);
        assert!(err.is_transient());
        assert!(matches!(err, CoreError::PersistenceUnavailable(_)));
    }

    #[test]
    fn logical_errors_are_not_transient() {
        assert!(!CoreError::UnknownTag("chores".into()).is_transient());
        assert!(!CoreError::MissingParameter("tag".into()).is_transient());
        assert!(!CoreError::ResetFailed.is_transient());
    }
}
