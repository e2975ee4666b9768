//! Error types for the admin API client
//!
//! Local failures (configuration, storage, request construction) keep their
//! own variants and are propagated as-is. Everything that went wrong on the
//! wire is reshaped into an [`ApiError`] before it reaches a caller.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Message used when neither the response body nor the transport error
/// carries anything usable
pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred";

/// Normalized error surfaced to every caller of the pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiError {
    /// Human-readable message
    pub message: String,
    /// HTTP status code, if a response was received
    pub status: Option<u16>,
    /// Raw response body, if one was received
    pub data: Option<Value>,
}

impl ApiError {
    /// Build a normalized error from the pieces of a failed exchange.
    ///
    /// The body's `message` field wins over the transport message, which in
    /// turn wins over [`FALLBACK_MESSAGE`].
    pub fn normalize(
        status: Option<u16>,
        data: Option<Value>,
        transport_message: Option<String>,
    ) -> Self {
        let message = data
            .as_ref()
            .and_then(|body| body.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(String::from)
            .or(transport_message.filter(|m| !m.is_empty()))
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());

        Self {
            message,
            status,
            data,
        }
    }

    /// Normalize a transport-level failure (no response received)
    pub fn from_transport(err: &reqwest::Error) -> Self {
        Self::normalize(None, None, Some(err.to_string()))
    }

    /// Whether this error came from a `401 Unauthorized` response
    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (status {status})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ApiError {}

/// The main error type for the admin API client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Request Construction Errors
    // ============================================================================
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to build request: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Invalid header '{name}': {message}")]
    InvalidHeader { name: String, message: String },

    // ============================================================================
    // Pipeline Errors
    // ============================================================================
    #[error("{0}")]
    Api(ApiError),

    #[error("Session expired, signed out: {0}")]
    SessionExpired(ApiError),

    // ============================================================================
    // Storage Errors
    // ============================================================================
    #[error("Credential storage error: {message}")]
    Storage { message: String },
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create an invalid header error
    pub fn invalid_header(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            message: message.into(),
        }
    }

    /// The normalized error, for failures that went through the pipeline
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(e) | Error::SessionExpired(e) => Some(e),
            _ => None,
        }
    }

    /// HTTP status of the failure, if a response was received
    pub fn status(&self) -> Option<u16> {
        self.api_error().and_then(|e| e.status)
    }

    /// Whether the credentials were cleared and a sign-in was requested
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Error::SessionExpired(_))
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Error::Api(err)
    }
}

/// Result type alias for the admin API client
pub type Result<T> = std::result::Result<T, Error>;
