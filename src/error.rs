//! Error types for tempo
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown task, invalid config)
//! - 3: Service error (feed unreadable, backend unavailable)
//! - 4: Operation failed (io, lock timeout, corrupt data)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the tempo CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const SERVICE_ERROR: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for tempo operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Data directory not initialized: {0}")]
    NotInitialized(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Space not found: {0}")]
    SpaceNotFound(String),

    #[error("Feed not found: {0}")]
    FeedNotFound(String),

    // Service errors (exit code 3)
    #[error("Feed '{name}' unavailable: {message}")]
    FeedUnavailable { name: String, message: String },

    #[error("Service error: {0}")]
    Service(String),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::NotInitialized(_)
            | Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::TaskNotFound(_)
            | Error::SpaceNotFound(_)
            | Error::FeedNotFound(_) => exit_codes::USER_ERROR,

            // Service errors
            Error::FeedUnavailable { .. } | Error::Service(_) => exit_codes::SERVICE_ERROR,

            // Operation failures
            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured payload for JSON error envelopes, where one exists
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::LockFailed(path) => Some(serde_json::json!({
                "path": path.display().to_string(),
            })),
            Error::FeedUnavailable { name, .. } => Some(serde_json::json!({
                "feed": name,
            })),
            _ => None,
        }
    }
}

/// Result type alias for tempo operations
pub type Result<T> = std::result::Result<T, Error>;
