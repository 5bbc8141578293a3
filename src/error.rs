//! Error types for formguard.
//!
//! Field-level validation failures are never errors: they are returned as
//! [`RuleResult`](crate::rules::RuleResult) values so call sites stay total.
//! The `Error` type below covers the ambient concerns only, with a bracketed
//! code per variant for programmatic handling.
//!
//! # Error Code Ranges
//!
//! | Range | Category |
//! |-------|----------|
//! | E001-E009 | Configuration errors |
//! | E010-E019 | Storage errors |
//! | E020-E029 | Serialization errors |

use thiserror::Error;

/// The main error type for formguard.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration value is invalid.
    #[error("[E001] Invalid configuration value for '{key}': {details}")]
    ConfigInvalidValue { key: String, details: String },

    /// General configuration error.
    #[error("[E002] Configuration error: {0}")]
    Config(String),

    /// Failed to read a storage file.
    #[error("[E010] Failed to read storage file: {path}")]
    StorageRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a storage file.
    #[error("[E011] Failed to write storage file: {path}")]
    StorageWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Storage file exists but does not contain a valid key/value map.
    #[error("[E012] Storage file corrupted: {path}: {details}")]
    StorageCorrupt { path: String, details: String },

    /// JSON serialization or deserialization failed.
    #[error("[E020] Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Get the bracketed error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigInvalidValue { .. } => "E001",
            Self::Config(_) => "E002",
            Self::StorageRead { .. } => "E010",
            Self::StorageWrite { .. } => "E011",
            Self::StorageCorrupt { .. } => "E012",
            Self::Serialization(_) => "E020",
        }
    }
}

/// Convenience result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
