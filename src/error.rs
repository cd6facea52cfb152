//! Error types for API calls

use reqwest::StatusCode;

/// Errors raised while talking to the i-Recommend backend
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend rejected the session token (HTTP 401)
    #[error("Authentication failed. Please login again.")]
    Unauthorized,

    /// Any other non-success status
    #[error("Server error {status}: {detail}")]
    Status {
        /// HTTP status code
        status: StatusCode,
        /// `detail` from the error body, or the raw body
        detail: String,
    },

    /// The request never produced a usable response
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request was rejected before it was sent
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    /// Whether this error means the session is no longer valid
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Build a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Convenience alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ApiError::Status {
            status: StatusCode::NOT_FOUND,
            detail: "Room not found or not owned by user".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Server error 404 Not Found: Room not found or not owned by user"
        );
        assert!(!err.is_unauthorized());
        assert!(ApiError::Unauthorized.is_unauthorized());
        assert_eq!(ApiError::validation("Please enter a title").to_string(), "Please enter a title");
    }
}
