//! Error types for tracelens-core

use thiserror::Error;

/// Main error type for the tracelens-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level HTTP failure (connect, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success response from the backend API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for tracelens-core
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = Error::Api {
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "API error (503): Service Unavailable");
    }

    #[test]
    fn test_config_error_display() {
        let err = Error::Config("api.base_url is required".to_string());
        assert!(err.to_string().starts_with("configuration error"));
    }
}
