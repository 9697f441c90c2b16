//! Error types for the region directory client

use thiserror::Error;

/// Errors that can occur when talking to a region directory
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The configured base URL cannot be used to build request URLs
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The request did not complete within the client timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Connection or transport failure
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The directory answered with a non-success status
    #[error("Directory returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The response body was not the expected JSON list
    #[error("Response decoding failed: {0}")]
    Decode(String),
}

impl DirectoryError {
    /// Whether retrying the same request may succeed
    ///
    /// Timeouts, transport failures, throttling and server errors are
    /// retryable; client errors and undecodable bodies are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::RequestFailed(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidBaseUrl(_) | Self::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for DirectoryError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}
