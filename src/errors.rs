use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur in the Feelien library
#[derive(Error, Debug)]
pub enum FeelienError {
    /// A personality or environment field is missing, non-finite or out of range
    #[error("Invalid parameter: {field} = {value} ({reason})")]
    InvalidParameter {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// A trait or area name that does not exist
    #[error("Unknown parameter name: {0}")]
    UnknownParameter(Arc<String>),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(Arc<String>),

    /// Network error for HTTP requests
    #[error("Network error: {0}")]
    NetworkError(Arc<String>),

    /// Backend answered with a non-success status
    #[error("Backend error ({status}): {message}")]
    ApiError { status: u16, message: Arc<String> },

    /// Parse error for backend responses
    #[error("Parse error: {0}")]
    ParseError(Arc<String>),

    /// Backend communication has been switched off
    #[error("Backend communication is disabled")]
    BackendDisabled,

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FeelienError {
    pub fn configuration(message: impl Into<String>) -> Self {
        FeelienError::ConfigurationError(Arc::new(message.into()))
    }

    pub fn network(message: impl Into<String>) -> Self {
        FeelienError::NetworkError(Arc::new(message.into()))
    }

    pub fn parse(message: impl Into<String>) -> Self {
        FeelienError::ParseError(Arc::new(message.into()))
    }

    pub fn unknown_parameter(name: impl Into<String>) -> Self {
        FeelienError::UnknownParameter(Arc::new(name.into()))
    }
}

/// Type alias for Result with FeelienError
pub type Result<T> = std::result::Result<T, FeelienError>;

impl From<serde_json::Error> for FeelienError {
    fn from(error: serde_json::Error) -> Self {
        FeelienError::parse(error.to_string())
    }
}

impl From<reqwest::Error> for FeelienError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            FeelienError::parse(error.to_string())
        } else {
            FeelienError::network(error.to_string())
        }
    }
}
