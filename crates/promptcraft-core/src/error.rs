//! Error types for promptcraft.

use thiserror::Error;

/// Result type alias using promptcraft's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for promptcraft operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Upstream signalled HTTP 429 (the only retryable condition)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Upstream returned a non-success status other than 429
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP/network request failed before a status was received
    #[error("Request error: {0}")]
    Request(String),

    /// Anonymous sign-in with the identity provider failed
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True when the error carries the upstream rate-limit signal.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited(_) | Error::Api { status: 429, .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_rate_limited() {
        let err = Error::RateLimited("quota exhausted".to_string());
        assert_eq!(err.to_string(), "Rate limited: quota exhausted");
    }

    #[test]
    fn test_error_display_api() {
        let err = Error::Api {
            status: 503,
            message: "backend unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "API error (503): backend unavailable");
    }

    #[test]
    fn test_error_display_authentication() {
        let err = Error::Authentication("ADMIN_ONLY_OPERATION".to_string());
        assert_eq!(err.to_string(), "Authentication failed: ADMIN_ONLY_OPERATION");
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("missing API key".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing API key");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("empty image".to_string());
        assert_eq!(err.to_string(), "Invalid input: empty image");
    }

    #[test]
    fn test_rate_limited_signal() {
        assert!(Error::RateLimited("slow down".to_string()).is_rate_limited());
        assert!(Error::Api {
            status: 429,
            message: "Too Many Requests".to_string()
        }
        .is_rate_limited());
    }

    #[test]
    fn test_other_errors_are_not_rate_limited() {
        assert!(!Error::Api {
            status: 500,
            message: "boom".to_string()
        }
        .is_rate_limited());
        assert!(!Error::Request("connection reset".to_string()).is_rate_limited());
        assert!(!Error::Authentication("denied".to_string()).is_rate_limited());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
