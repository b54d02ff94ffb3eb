//! Error types for `talukscope`
//!
//! This module defines all error types used throughout the application,
//! providing clear error messages and proper error propagation.
//!
//! Error variants use `#[source]` to preserve error chains so the developer
//! log shows the full cause of a failed request.

use thiserror::Error;

/// Simple error type for wrapping string messages while implementing `std::error::Error`
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StringError(pub String);

impl StringError {
    /// Create a new `StringError` from a string message
    pub fn new(msg: impl Into<String>) -> Box<Self> {
        Box::new(Self(msg.into()))
    }
}

/// Coarse classification of an [`AnalyzerError`]
///
/// The controller decides which notice to show based on this, never on the
/// concrete variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Upload was submitted without a file
    NoFileSelected,
    /// Analysis was submitted without a selected region
    NoRegionSelected,
    /// Connection failure or non-2xx response
    NetworkOrServerError,
    /// 2xx response whose body could not be decoded
    MalformedResponse,
    /// Local failure (configuration, file system, serialization)
    Local,
}

/// Main error type for `talukscope`
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Upload submitted without a file
    #[error("No file selected for upload")]
    NoFileSelected,

    /// Analysis submitted without a selected Taluk
    #[error("No Taluk selected for analysis")]
    NoRegionSelected,

    /// The request never produced an HTTP response
    /// Preserves the underlying error source for full error chain transparency
    #[error("Request to {endpoint} failed: {source}")]
    Network {
        /// Endpoint path, e.g. `/upload`
        endpoint: &'static str,
        /// Transport error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The server answered with a non-2xx status
    #[error("Server returned HTTP {status} for {endpoint}")]
    ServerStatus {
        /// Endpoint path, e.g. `/upload`
        endpoint: &'static str,
        /// HTTP status code
        status: u16,
        /// Raw response body, kept for the developer log
        body: String,
    },

    /// The server answered 2xx but the body is not the expected JSON object
    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedResponse {
        /// Endpoint path, e.g. `/analyze`
        endpoint: &'static str,
        /// What was wrong with the body
        reason: String,
        /// Raw response body, kept for the developer log
        body: String,
    },

    /// Configuration error
    /// Preserves the underlying error source for full error chain transparency
    #[error("Configuration error: {0}")]
    ConfigError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl AnalyzerError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoFileSelected => ErrorKind::NoFileSelected,
            Self::NoRegionSelected => ErrorKind::NoRegionSelected,
            Self::Network { .. } | Self::ServerStatus { .. } => ErrorKind::NetworkOrServerError,
            Self::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            Self::ConfigError(_) | Self::IoError(_) | Self::JsonError(_) => ErrorKind::Local,
        }
    }

    /// Raw response body carried by this error, if the server sent one
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            Self::ServerStatus { body, .. } | Self::MalformedResponse { body, .. } => {
                Some(body.as_str())
            }
            _ => None,
        }
    }
}

/// Result type alias for `talukscope` operations
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Convert an error to a user-friendly message
///
/// Used by the console host when startup fails. Request failures never reach
/// this function; the controller maps them to fixed notices instead.
pub fn get_user_friendly_error(error: &AnalyzerError) -> String {
    match error {
        AnalyzerError::NoFileSelected => "Please select a file to upload.".to_string(),
        AnalyzerError::NoRegionSelected => "Please select a Taluk to analyze.".to_string(),
        AnalyzerError::Network { endpoint, .. } => {
            format!(
                "Could not reach the analysis server ({endpoint}).\n\n\
                 Please ensure:\n\
                 - The analysis server is running\n\
                 - `base_url` in config.json points at it"
            )
        }
        AnalyzerError::ServerStatus { status, .. } => {
            format!(
                "The analysis server reported an error (HTTP {status}).\n\n\
                 Check the server log for details."
            )
        }
        AnalyzerError::MalformedResponse { .. } => "The analysis server sent an unexpected reply.\n\n\
             The server and this client may be out of date with each other."
            .to_string(),
        AnalyzerError::ConfigError(_) => "Failed to load or save configuration.\n\n\
             Your settings may not persist.\n\
             Check that you have write permissions to:\n\
             %APPDATA%\\talukscope"
            .to_string(),
        AnalyzerError::IoError(e) => {
            format!(
                "A file system error occurred:\n\n{e}\n\n\
                 Please check file permissions and disk space."
            )
        }
        AnalyzerError::JsonError(e) => {
            format!(
                "Configuration file is corrupted:\n\n{e}\n\n\
                 The application will use default settings."
            )
        }
    }
}
