//! Gemini-specific error handling.

use promptcraft_core::Error;

/// Gemini error categories derived from the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeminiErrorCode {
    /// Malformed request or unsupported image.
    InvalidArgument,
    /// Invalid or unauthorized API key.
    PermissionDenied,
    /// Model not found or not available.
    ModelNotFound,
    /// Rate limit or quota exceeded (HTTP 429).
    RateLimitExceeded,
    /// Server error.
    ServerError,
    /// Unknown error.
    Unknown,
}

impl GeminiErrorCode {
    /// Determine error code from HTTP status and the `error.status` string.
    pub fn from_response(status: u16, error_status: &str) -> Self {
        match (status, error_status) {
            (429, _) => Self::RateLimitExceeded,
            (401 | 403, _) | (_, "PERMISSION_DENIED" | "UNAUTHENTICATED") => {
                Self::PermissionDenied
            }
            (404, _) | (_, "NOT_FOUND") => Self::ModelNotFound,
            (400, _) | (_, "INVALID_ARGUMENT" | "FAILED_PRECONDITION") => Self::InvalidArgument,
            (500..=599, _) => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Only rate limiting is retried; every other failure surfaces immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimitExceeded)
    }
}

/// Convert a Gemini error response to a promptcraft Error.
pub fn to_core_error(code: GeminiErrorCode, status: u16, message: &str) -> Error {
    match code {
        GeminiErrorCode::RateLimitExceeded => {
            Error::RateLimited(format!("Gemini rate limit exceeded: {}", message))
        }
        GeminiErrorCode::PermissionDenied => Error::Api {
            status,
            message: format!("Permission denied: {}", message),
        },
        GeminiErrorCode::ModelNotFound => Error::Api {
            status,
            message: format!("Model not found: {}", message),
        },
        GeminiErrorCode::InvalidArgument => Error::Api {
            status,
            message: format!("Invalid request: {}", message),
        },
        GeminiErrorCode::ServerError => Error::Api {
            status,
            message: format!("Server error: {}", message),
        },
        GeminiErrorCode::Unknown => Error::Api {
            status,
            message: message.to_string(),
        },
    }
}
