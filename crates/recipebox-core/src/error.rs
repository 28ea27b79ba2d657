//! Error types for recipebox-core
//!
//! `CoreError` covers every failure the repository can surface. `FetchError`
//! describes why a single locator could not be turned into a record.

use std::path::PathBuf;
use thiserror::Error;

/// Why fetching one locator failed
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed")]
    Transport(#[source] reqwest::Error),

    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    #[error("response body is not valid JSON")]
    Parse(#[source] serde_json::Error),

    /// Used by non-HTTP fetchers (fixtures, tests)
    #[error("{0}")]
    Other(String),
}

/// Core error type for recipebox operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // Fetch Errors
    // ===================
    #[error("Failed to fetch {locator}")]
    FetchFailure {
        locator: String,
        #[source]
        source: FetchError,
    },

    #[error("Fetch task for {locator} did not complete: {message}")]
    TaskFailed { locator: String, message: String },

    // ===================
    // Cache Errors
    // ===================
    #[error("Cached value under '{key}' is not a valid record list")]
    CacheReadFailure {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize records for cache key '{key}'")]
    CacheWriteFailure {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    // ===================
    // Storage Errors
    // ===================
    #[error("Failed to read storage file: {path}")]
    StorageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write storage file: {path}")]
    StorageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove storage file: {path}")]
    StorageRemove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid storage key '{key}': only ASCII letters, digits, '-' and '_' are allowed")]
    InvalidKey { key: String },

    // ===================
    // Source Errors
    // ===================
    #[error("Invalid source locator '{locator}': {reason}")]
    InvalidSource { locator: String, reason: String },

    #[error("Source locator listed twice: {locator}")]
    DuplicateSource { locator: String },

    // ===================
    // Config Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl CoreError {
    /// Locator responsible for the failure, if the error is fetch-related
    pub fn locator(&self) -> Option<&str> {
        match self {
            CoreError::FetchFailure { locator, .. } | CoreError::TaskFailed { locator, .. } => {
                Some(locator)
            }
            _ => None,
        }
    }

    /// True when the error came from the network side of the pipeline
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            CoreError::FetchFailure { .. } | CoreError::TaskFailed { .. }
        )
    }
}
