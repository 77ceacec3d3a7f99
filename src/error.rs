//! Error types and handling for the Cloud Storage CLI
//!
//! Provides structured error types for all CLI operations with proper context.
//! HTTP failures for completed exchanges always surface as [`ApiError`];
//! everything that happens before a request leaves the process is reported
//! through the construction and validation variants.

use crate::client::ApiError;
use crate::validation::ValidationError;
use reqwest::Method;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Cloud Storage CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Comprehensive error types for Cloud Storage CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    // ═══════════════════════════════════════════════════════════════
    // Network & HTTP Errors
    // ═══════════════════════════════════════════════════════════════
    /// The request could not be completed (DNS, refused connection, TLS...)
    #[error("request failed [{method} {url}]: {reason}")]
    Transport {
        method: String,
        url: String,
        reason: String,
    },

    /// The request did not complete within the configured timeout
    #[error("request timed out [{method} {url}]: {reason}")]
    Timeout {
        method: String,
        url: String,
        reason: String,
    },

    /// The server answered with a failure status
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Failed to read a successful response body
    #[error("failed to read response body: {0}")]
    ResponseRead(String),

    /// Failed to decode a successful response body
    #[error("failed to unmarshal response: {0}")]
    DeserializationError(String),

    // ═══════════════════════════════════════════════════════════════
    // Request Construction
    // ═══════════════════════════════════════════════════════════════
    /// The resolved request URL is malformed
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Failed to serialize a request body
    #[error("failed to marshal request body: {0}")]
    SerializationError(String),

    /// Failed to build the underlying HTTP client
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(String),

    /// The request was rejected before sending, e.g. a malformed header value
    #[error("failed to build request [{method} {url}]: {reason}")]
    RequestBuild {
        method: String,
        url: String,
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════
    // I/O Errors
    // ═══════════════════════════════════════════════════════════════
    /// File operation failed
    #[error("File operation failed: {path}: {reason}")]
    FileError { path: PathBuf, reason: String },

    /// Directory operation failed
    #[error("Directory operation failed: {path}: {reason}")]
    DirError { path: PathBuf, reason: String },

    // ═══════════════════════════════════════════════════════════════
    // Configuration
    // ═══════════════════════════════════════════════════════════════
    /// Failed to read configuration file
    #[error("Failed to read config from {path}: {reason}")]
    ConfigRead { path: PathBuf, reason: String },

    /// Failed to write configuration file
    #[error("Failed to write config to {path}: {reason}")]
    ConfigWrite { path: PathBuf, reason: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No usable configuration directory
    #[error("Could not determine config directory: XDG_CONFIG_HOME not set and no home directory found")]
    NoConfigDir,

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownConfigKey(String),

    // ═══════════════════════════════════════════════════════════════
    // Authentication
    // ═══════════════════════════════════════════════════════════════
    /// A command needs stored tokens that are not present
    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    // ═══════════════════════════════════════════════════════════════
    // Validation & Input Errors
    // ═══════════════════════════════════════════════════════════════
    /// An identifier, path or pagination value was rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Invalid input argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing required argument
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    // ═══════════════════════════════════════════════════════════════
    // Other Errors
    // ═══════════════════════════════════════════════════════════════
    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Cancelled by user
    #[error("Operation cancelled")]
    Cancelled,
}

impl CliError {
    /// Classify a failed `reqwest` call that never produced a response.
    pub(crate) fn from_transport(method: &Method, url: &str, err: &reqwest::Error) -> Self {
        let reason = error_chain(err);
        if err.is_builder() {
            Self::RequestBuild {
                method: method.to_string(),
                url: url.to_string(),
                reason,
            }
        } else if err.is_timeout() {
            Self::Timeout {
                method: method.to_string(),
                url: url.to_string(),
                reason,
            }
        } else {
            Self::Transport {
                method: method.to_string(),
                url: url.to_string(),
                reason,
            }
        }
    }

    /// HTTP status of an API error, if this is one
    #[must_use]
    pub const fn api_status(&self) -> Option<u16> {
        match self {
            Self::Api(err) => Some(err.status_code),
            _ => None,
        }
    }

    /// Get the exit code for this error
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) | Self::InvalidArgument(_) | Self::MissingArgument(_) => 2,
            Self::NotAuthenticated(_) => 3,
            Self::Transport { .. } => 4,
            Self::Api(err) if err.status_code == 401 || err.status_code == 403 => 3,
            Self::Api(_) => 5,
            Self::FileError { .. } | Self::DirError { .. } => 7,
            Self::Timeout { .. } => 124,
            Self::Cancelled => 130,
            _ => 1,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::DeserializationError(err.to_string())
    }
}

/// Flatten an error and its sources into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
