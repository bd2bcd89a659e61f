use thiserror::Error;

/// Unified error type for API and I/O operations
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Failed to parse JSON response
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Server rejected the request with a message body
    #[error("{status}: {message}")]
    ApiResponse {
        status: reqwest::StatusCode,
        message: String,
    },
    /// HTTP error status code
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),
    /// No bearer token stored
    #[error("Not authenticated")]
    NotAuthenticated,
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Input rejected before it was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ApiError {
    /// True for failures worth offering a retry for
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::HttpStatus(status) | ApiError::ApiResponse { status, .. } => {
                status.is_server_error()
            }
            _ => false,
        }
    }

    /// Message shown to the user, with a retry hint for transient failures
    pub fn user_message(&self) -> String {
        if self.is_retryable() {
            format!("{self}. Please check your connection and try again.")
        } else {
            self.to_string()
        }
    }
}

/// Form and upload checks that run before anything reaches the server
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required")]
    MissingName,
    #[error("Address is required")]
    MissingAddress,
    #[error("Please rate both coffee quality and ambient")]
    MissingRating,
    #[error("Ratings must be between 1 and 5")]
    RatingOutOfRange,
    #[error("Only JPEG and PNG images are allowed")]
    UnsupportedImageType(String),
    #[error("Photo file size must be less than 2MB")]
    PhotoTooLarge(usize),
    #[error("Thumbnail file size must be less than 500KB")]
    ThumbnailTooLarge(usize),
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn server_errors_get_retry_hint() {
        let err = ApiError::HttpStatus(StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.is_retryable());
        assert_eq!(
            err.user_message(),
            "HTTP error: 503 Service Unavailable. Please check your connection and try again."
        );
    }

    #[test]
    fn client_errors_have_no_retry_hint() {
        let err = ApiError::ApiResponse {
            status: StatusCode::FORBIDDEN,
            message: "Not your place".to_string(),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.user_message(), "403 Forbidden: Not your place");

        let err = ApiError::from(ValidationError::MissingRating);
        assert_eq!(
            err.user_message(),
            "Please rate both coffee quality and ambient"
        );
        assert_eq!(ApiError::NotAuthenticated.user_message(), "Not authenticated");
    }
}
