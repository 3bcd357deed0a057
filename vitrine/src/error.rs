//! Search error types

/// Errors that can occur while fetching search results.
///
/// None of them is fatal: the session records the error and keeps its previous results.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Network error during the request.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response.
    #[error("HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, if it could be read.
        body: Option<String>,
    },

    /// The body did not match `[{ id, title, price }]`.
    #[error("Malformed response: {message}")]
    Malformed {
        /// Description of the decode error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },

    /// The configured endpoint is not a valid URL.
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

impl SearchError {
    pub fn status(status: u16) -> Self {
        Self::Status { status, body: None }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
            body: None,
        }
    }

    pub fn malformed_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Returns the HTTP status code if this is a status error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if resubmitting the same query may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::Network(_) => true,
            _ => false,
        }
    }
}
