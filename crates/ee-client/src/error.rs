//! Error types for Earth Engine calls.

use thiserror::Error;

/// Result type alias using GatewayError.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors raised while talking to Earth Engine.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Earth Engine request timed out")]
    Timeout,

    #[error("Earth Engine credentials unavailable: {0}")]
    Auth(String),

    #[error("Earth Engine request failed: {0}")]
    Transport(String),

    #[error("Earth Engine returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected Earth Engine response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Whether repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Timeout | GatewayError::Transport(_) => true,
            GatewayError::Api { status, .. } => *status == 429 || *status >= 500,
            GatewayError::Auth(_) | GatewayError::Decode(_) => false,
        }
    }

    /// HTTP status to return when this error ends a request.
    pub fn http_status_code(&self) -> u16 {
        match self {
            GatewayError::Timeout => 504,
            _ => 500,
        }
    }

    /// Message safe to show to end users. Details stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            GatewayError::Timeout => {
                "The request to Google Earth Engine timed out. Please try again."
            }
            _ => "An unexpected error has occurred. Please try again.",
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::Timeout
        } else if e.is_decode() {
            GatewayError::Decode(e.to_string())
        } else {
            GatewayError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::Decode(e.to_string())
    }
}
