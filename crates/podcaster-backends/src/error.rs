//! Internal error types for backend operations.
//!
//! These errors are internal to `podcaster-backends` and are mapped to core
//! port errors at the boundary.

use podcaster_core::{GenerationError, SpeechError};
use thiserror::Error;

/// Result type alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors from talking to an OpenAI-compatible server.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The server answered with a non-success status.
    #[error("API request failed with status {status}: {url}: {message}")]
    ApiRequestFailed {
        /// HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
        /// Response body, truncated
        message: String,
    },

    /// The server answered, but not with what we asked for.
    #[error("Invalid response from API: {message}")]
    InvalidResponse {
        /// Description of what was invalid
        message: String,
    },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl BackendError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// 4xx other than 408/429: retrying or waiting will not help.
    const fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiRequestFailed { status, .. }
            if *status >= 400 && *status < 500 && *status != 408 && *status != 429)
    }
}

impl From<BackendError> for GenerationError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::InvalidResponse { .. } | BackendError::JsonParse(_) => {
                Self::InvalidResponse(err.to_string())
            }
            BackendError::ApiRequestFailed { .. } | BackendError::Network(_) => {
                Self::Unavailable(err.to_string())
            }
        }
    }
}

impl From<BackendError> for SpeechError {
    fn from(err: BackendError) -> Self {
        if err.is_client_error() {
            return Self::InvalidInput(err.to_string());
        }
        match err {
            BackendError::InvalidResponse { .. } | BackendError::JsonParse(_) => {
                Self::InvalidResponse(err.to_string())
            }
            BackendError::ApiRequestFailed { .. } | BackendError::Network(_) => {
                Self::Unavailable(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(status: u16) -> BackendError {
        BackendError::ApiRequestFailed {
            status,
            url: "http://localhost/v1/audio/speech".to_string(),
            message: "nope".to_string(),
        }
    }

    #[test]
    fn test_api_request_failed_error_message() {
        let msg = failed(503).to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("audio/speech"));
    }

    #[test]
    fn test_speech_mapping_distinguishes_client_errors() {
        assert!(matches!(SpeechError::from(failed(400)), SpeechError::InvalidInput(_)));
        assert!(matches!(SpeechError::from(failed(429)), SpeechError::Unavailable(_)));
        assert!(matches!(SpeechError::from(failed(502)), SpeechError::Unavailable(_)));
        assert!(matches!(
            SpeechError::from(BackendError::invalid("empty audio")),
            SpeechError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_generation_mapping() {
        assert!(matches!(
            GenerationError::from(failed(500)),
            GenerationError::Unavailable(_)
        ));
        assert!(matches!(
            GenerationError::from(BackendError::invalid("no choices")),
            GenerationError::InvalidResponse(_)
        ));
    }
}
